use super::{percent, StoppingCondition};
use crate::Error;
use std::fmt::Display;

/// 目标函数计算次数的上限
#[derive(Debug, Clone)]
pub struct MaxFitnessEvaluations {
    max_evaluations: u64,
    evaluations: u64,
}

impl MaxFitnessEvaluations {
    pub fn new(max_evaluations: u64) -> Self {
        Self {
            max_evaluations,
            evaluations: 0,
        }
    }

    /// 从有符号的预算构造，预算为负时报错
    pub fn checked(max_evaluations: i64) -> Result<Self, Error> {
        u64::try_from(max_evaluations)
            .map(Self::new)
            .map_err(|_| Error::invalid(format!("目标函数计算次数为负：{max_evaluations}")))
    }

    pub fn max_evaluations(&self) -> u64 {
        self.max_evaluations
    }

    /// 自搜索开始以来计算目标函数的次数
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}

impl StoppingCondition for MaxFitnessEvaluations {
    fn notify_search_started(&mut self) {
        self.evaluations = 0;
    }

    fn notify_fitness_evaluation(&mut self) {
        self.evaluations += 1;
    }

    fn notify_fitness_evaluations(&mut self, evaluations: i64) -> Result<(), Error> {
        let evaluations = u64::try_from(evaluations)
            .map_err(|_| Error::invalid(format!("目标函数计算次数为负：{evaluations}")))?;
        self.evaluations += evaluations;
        Ok(())
    }

    fn search_must_stop(&self) -> bool {
        self.evaluations > self.max_evaluations
    }

    fn progress(&self) -> f64 {
        if self.max_evaluations == 0 {
            return 1.0;
        }
        (self.evaluations as f64 / self.max_evaluations as f64).min(1.0)
    }
}

impl Display for MaxFitnessEvaluations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MaxFitnessEvaluations({})", percent(self.progress()))
    }
}
