//! 实验：对同一个覆盖矩阵，依次用每种优化方法重复搜索若干次，并统计每次所得排列的 APLC
//!
//! 整次实验共用一个随机数生成器，固定种子即可完全复现结果。

use crate::config::{Algorithm, Settings};
use crate::data::{CoverageMatrix, CoverageSource, Ordering};
use crate::interfaces::{Interface, Message};
use crate::objectives::aplc::{aplc, Aplc};
use crate::objectives::metric::Summary;
use crate::objectives::Direction;
use crate::optimizers::{RandomSearch, RandomWalk, SearchAlgorithm, SimulatedAnnealing};
use crate::problems::{OrderingProblem, TestCaseOrdering};
use crate::Error;
use rand::RngCore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use web_time::Instant;

/// 一次搜索的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepetitionResult {
    pub ordering: Ordering,
    /// 最大化形式的 APLC
    pub aplc: f64,
    pub seconds: f64,
}

/// 一种优化方法所有重复的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmResults {
    pub algorithm: Algorithm,
    pub repetitions: Vec<RepetitionResult>,
}

impl AlgorithmResults {
    pub fn aplc_values(&self) -> Vec<f64> {
        self.repetitions.iter().map(|r| r.aplc).collect()
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::of(&self.aplc_values())
    }

    /// APLC 最高的一次；相同时取较早的一次
    pub fn best(&self) -> Option<&RepetitionResult> {
        self.repetitions
            .iter()
            .reduce(|best, r| if r.aplc > best.aplc { r } else { best })
    }
}

/// 计算手动给出的排列的 APLC（最大化形式），不进行搜索
pub fn evaluate_ordering(matrix: &CoverageMatrix, ordering: &Ordering) -> Result<f64, Error> {
    aplc(matrix, ordering, Direction::Maximizing)
}

pub struct Experiment {
    matrix: Arc<CoverageMatrix>,
    test_cases: Vec<String>,
    settings: Settings,
}

impl Experiment {
    /// 测试用例名称须与矩阵的行一一对应，且矩阵至少有一列被覆盖过
    pub fn new(
        matrix: CoverageMatrix,
        test_cases: Vec<String>,
        settings: Settings,
    ) -> Result<Self, Error> {
        if test_cases.len() != matrix.rows() {
            return Err(Error::invalid(format!(
                "有 {} 个测试用例名称，而覆盖矩阵有 {} 行",
                test_cases.len(),
                matrix.rows()
            )));
        }
        let aplc = Aplc::new(Arc::new(matrix))?;
        Ok(Self {
            matrix: Arc::clone(aplc.matrix()),
            test_cases,
            settings,
        })
    }

    pub fn from_source(source: &impl CoverageSource, settings: Settings) -> Result<Self, Error> {
        Self::new(source.coverage_matrix()?, source.test_cases()?, settings)
    }

    pub fn matrix(&self) -> &CoverageMatrix {
        &self.matrix
    }

    pub fn test_cases(&self) -> &[String] {
        &self.test_cases
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// 按配置中的顺序运行每种优化方法
    pub fn run(&self, interface: &dyn Interface) -> Result<Vec<AlgorithmResults>, Error> {
        let mut rng = self.settings.rng();
        self.settings
            .algorithms
            .iter()
            .map(|&algorithm| self.run_algorithm(algorithm, &mut rng, interface))
            .collect()
    }

    /// 用一种优化方法依次重复搜索
    pub fn run_algorithm(
        &self,
        algorithm: Algorithm,
        rng: &mut dyn RngCore,
        interface: &dyn Interface,
    ) -> Result<AlgorithmResults, Error> {
        let problem = OrderingProblem::new(Arc::clone(&self.matrix), algorithm)?;
        let mut search = self.search_algorithm(self.settings.problem(problem))?;
        let repetitions = self.settings.repetitions;
        info!("开始运行{}，共重复 {repetitions} 次", algorithm.name());
        interface.post(Message::AlgorithmStarted {
            algorithm,
            repetitions,
            stopping_condition: search.stopping_condition().to_string(),
        });
        let mut results = Vec::with_capacity(repetitions);
        for index in 1..=repetitions {
            let start = Instant::now();
            let solution = search.find_solution(rng);
            let seconds = start.elapsed().as_secs_f64();
            let ordering = solution.into_ordering();
            let aplc = evaluate_ordering(&self.matrix, &ordering)?;
            debug!("{} 第 {index} 次：APLC = {aplc}，用时 {seconds:.3} 秒", algorithm);
            interface.post(Message::Repetition {
                algorithm,
                index,
                ordering: self.names(&ordering),
                aplc,
                seconds,
            });
            results.push(RepetitionResult {
                ordering,
                aplc,
                seconds,
            });
        }
        let results = AlgorithmResults {
            algorithm,
            repetitions: results,
        };
        if let Some(summary) = results.summary() {
            interface.post(Message::Summary { algorithm, summary });
        }
        Ok(results)
    }

    fn names(&self, ordering: &Ordering) -> Vec<String> {
        ordering
            .names(&self.test_cases)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// 同一个问题对象依次扮演生成器、目标函数、初等变换和停止条件
    fn search_algorithm(
        &self,
        problem: OrderingProblem,
    ) -> Result<Box<dyn SearchAlgorithm<TestCaseOrdering>>, Error> {
        let stopping_condition = self.settings.stopping_condition(&problem);
        let search: Box<dyn SearchAlgorithm<TestCaseOrdering>> = match problem.algorithm() {
            Algorithm::RandomSearch => Box::new(RandomSearch::new(
                problem.clone(),
                problem,
                stopping_condition,
            )),
            Algorithm::RandomWalk => Box::new(RandomWalk::with_transformation(
                problem.clone(),
                problem.clone(),
                stopping_condition,
                problem,
            )),
            Algorithm::SimulatedAnnealing => Box::new(SimulatedAnnealing::with_transformation(
                problem.clone(),
                problem.clone(),
                stopping_condition,
                problem,
                self.settings.annealing,
            )?),
        };
        Ok(search)
    }
}
