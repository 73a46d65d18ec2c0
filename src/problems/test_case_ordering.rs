//! 测试用例排序问题
//!
//! 解是测试用例序号的一个排列，目标函数是 APLC。优化方向由使用它的优化方法决定：
//! 退火算法取最小化形式，随机游走和随机搜索取最大化形式。
//!
//! 初等变换直接重新均匀地抽取一个排列（“瞬移”），因此任意排列都能一步到达，
//! 随机游走的邻居也就不是小幅扰动。

use crate::config::Algorithm;
use crate::data::{CoverageMatrix, Ordering};
use crate::objectives::aplc::Aplc;
use crate::objectives::{Direction, FitnessFunction};
use crate::operators::ElementaryTransformation;
use crate::optimizers::{Configuration, ConfigurationGenerator};
use crate::stopping::{MaxFitnessEvaluations, StoppingCondition};
use crate::Error;
use rand::seq::SliceRandom;
use rand::RngCore;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 默认的目标函数计算次数上限
pub const DEFAULT_MAX_EVALUATIONS: u64 = 1000;

/// 测试用例排序问题的解
///
/// 相等性和哈希只看排列本身
#[derive(Debug, Clone)]
pub struct TestCaseOrdering {
    ordering: Ordering,
    matrix: Arc<CoverageMatrix>,
    algorithm: Algorithm,
}

impl TestCaseOrdering {
    pub fn new(
        ordering: Ordering,
        matrix: Arc<CoverageMatrix>,
        algorithm: Algorithm,
    ) -> Result<Self, Error> {
        if ordering.len() != matrix.rows() {
            return Err(Error::invalid(format!(
                "排列长度为 {}，而覆盖矩阵有 {} 个测试用例",
                ordering.len(),
                matrix.rows()
            )));
        }
        Ok(Self {
            ordering,
            matrix,
            algorithm,
        })
    }

    pub fn ordering(&self) -> &Ordering {
        &self.ordering
    }

    pub fn into_ordering(self) -> Ordering {
        self.ordering
    }

    pub fn matrix(&self) -> &CoverageMatrix {
        &self.matrix
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 用同一个矩阵和优化方法包装另一个排列
    fn with_ordering(&self, ordering: Ordering) -> Self {
        Self {
            ordering,
            matrix: Arc::clone(&self.matrix),
            algorithm: self.algorithm,
        }
    }
}

impl PartialEq for TestCaseOrdering {
    fn eq(&self, other: &Self) -> bool {
        self.ordering == other.ordering
    }
}

impl Eq for TestCaseOrdering {}

impl Hash for TestCaseOrdering {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ordering.hash(state);
    }
}

impl Display for TestCaseOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ordering)
    }
}

impl Configuration for TestCaseOrdering {
    type Transformation = Teleport;

    fn elementary_transformation(&self) -> &Teleport {
        &Teleport
    }

    fn degrees_of_freedom(&self) -> usize {
        // 最后一个位置由前面的位置唯一确定
        self.ordering.len().saturating_sub(1)
    }
}

fn shuffled(n: usize, rng: &mut dyn RngCore) -> Ordering {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    Ordering::from_permutation(indices)
}

/// 瞬移：重新均匀地抽取一个与输入不同的排列
///
/// 长度小于 2 时只有一个排列，只能原样返回
#[derive(Debug, Clone, Copy, Default)]
pub struct Teleport;

impl ElementaryTransformation<TestCaseOrdering> for Teleport {
    fn transform(
        &self,
        configuration: &TestCaseOrdering,
        rng: &mut dyn RngCore,
    ) -> TestCaseOrdering {
        let n = configuration.ordering.len();
        if n < 2 {
            return configuration.clone();
        }
        loop {
            let ordering = shuffled(n, rng);
            if ordering != configuration.ordering {
                return configuration.with_ordering(ordering);
            }
        }
    }
}

/// 测试用例排序问题本身，同时扮演生成器、初等变换、目标函数和停止条件四个角色
///
/// 克隆的代价很低，可以为每个角色各传一份
#[derive(Debug, Clone)]
pub struct OrderingProblem {
    matrix: Arc<CoverageMatrix>,
    algorithm: Algorithm,
    aplc: Aplc,
    budget: MaxFitnessEvaluations,
}

impl OrderingProblem {
    /// 覆盖矩阵没有可用的列时报错
    pub fn new(matrix: Arc<CoverageMatrix>, algorithm: Algorithm) -> Result<Self, Error> {
        let aplc = Aplc::new(Arc::clone(&matrix))?;
        Ok(Self {
            matrix,
            algorithm,
            aplc,
            budget: MaxFitnessEvaluations::new(DEFAULT_MAX_EVALUATIONS),
        })
    }

    pub fn with_max_evaluations(mut self, max_evaluations: u64) -> Self {
        self.budget = MaxFitnessEvaluations::new(max_evaluations);
        self
    }

    pub fn matrix(&self) -> &Arc<CoverageMatrix> {
        &self.matrix
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn max_evaluations(&self) -> u64 {
        self.budget.max_evaluations()
    }

    pub fn evaluations(&self) -> u64 {
        self.budget.evaluations()
    }

    /// 包装一个给定的排列
    pub fn configuration(&self, ordering: Ordering) -> Result<TestCaseOrdering, Error> {
        TestCaseOrdering::new(ordering, Arc::clone(&self.matrix), self.algorithm)
    }
}

impl ConfigurationGenerator<TestCaseOrdering> for OrderingProblem {
    fn generate(&self, rng: &mut dyn RngCore) -> TestCaseOrdering {
        TestCaseOrdering {
            ordering: shuffled(self.matrix.rows(), rng),
            matrix: Arc::clone(&self.matrix),
            algorithm: self.algorithm,
        }
    }
}

impl ElementaryTransformation<TestCaseOrdering> for OrderingProblem {
    fn transform(
        &self,
        configuration: &TestCaseOrdering,
        rng: &mut dyn RngCore,
    ) -> TestCaseOrdering {
        Teleport.transform(configuration, rng)
    }
}

impl FitnessFunction<TestCaseOrdering> for OrderingProblem {
    fn fitness(&self, candidate: &TestCaseOrdering) -> f64 {
        let ordering = candidate.ordering.as_slice();
        self.aplc.score(ordering, self.direction())
    }

    fn direction(&self) -> Direction {
        self.algorithm.fitness_direction()
    }
}

impl StoppingCondition for OrderingProblem {
    fn notify_search_started(&mut self) {
        self.budget.notify_search_started();
    }

    fn notify_fitness_evaluation(&mut self) {
        self.budget.notify_fitness_evaluation();
    }

    fn notify_fitness_evaluations(&mut self, evaluations: i64) -> Result<(), Error> {
        self.budget.notify_fitness_evaluations(evaluations)
    }

    fn search_must_stop(&self) -> bool {
        self.budget.search_must_stop()
    }

    fn progress(&self) -> f64 {
        self.budget.progress()
    }
}

impl Display for OrderingProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TestCaseOrdering[{}]({})", self.algorithm, self.budget)
    }
}
