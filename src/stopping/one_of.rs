use super::StoppingCondition;
use crate::Error;
use itertools::Itertools;
use std::fmt::Display;

/// 停止条件的逻辑或：只要有一个子条件要求停止，搜索就必须停止
///
/// 子条件本身也可以是 OneOf，这里不做展平
pub struct OneOf {
    conditions: Vec<Box<dyn StoppingCondition>>,
}

impl OneOf {
    pub fn new(first: Box<dyn StoppingCondition>, second: Box<dyn StoppingCondition>) -> Self {
        Self {
            conditions: vec![first, second],
        }
    }

    /// 至少需要两个子条件
    pub fn with_conditions(conditions: Vec<Box<dyn StoppingCondition>>) -> Result<Self, Error> {
        if conditions.len() < 2 {
            return Err(Error::invalid(format!(
                "OneOf 至少需要两个停止条件，实际只有 {} 个",
                conditions.len()
            )));
        }
        Ok(Self { conditions })
    }

    /// 追加一个子条件
    pub fn or(mut self, condition: Box<dyn StoppingCondition>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl StoppingCondition for OneOf {
    fn notify_search_started(&mut self) {
        self.conditions
            .iter_mut()
            .for_each(|c| c.notify_search_started());
    }

    fn notify_fitness_evaluation(&mut self) {
        self.conditions
            .iter_mut()
            .for_each(|c| c.notify_fitness_evaluation());
    }

    fn notify_fitness_evaluations(&mut self, evaluations: i64) -> Result<(), Error> {
        for condition in &mut self.conditions {
            condition.notify_fitness_evaluations(evaluations)?;
        }
        Ok(())
    }

    fn search_must_stop(&self) -> bool {
        self.conditions.iter().any(|c| c.search_must_stop())
    }

    fn progress(&self) -> f64 {
        self.conditions
            .iter()
            .map(|c| c.progress())
            .fold(0.0, f64::max)
    }
}

impl Display for OneOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OneOf({})", self.conditions.iter().join(", "))
    }
}
