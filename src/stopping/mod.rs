//! 停止条件：记录搜索已消耗的预算，并告诉搜索算法何时必须停止
//!
//! 搜索算法在开始时调用 `notify_search_started`，每计算一次目标函数调用一次
//! `notify_fitness_evaluation`，并在每一步之前查询 `search_must_stop`。

use crate::Error;
use std::fmt::Display;

pub mod max_evaluations;
pub mod max_time;
pub mod one_of;

pub use max_evaluations::MaxFitnessEvaluations;
pub use max_time::MaxTime;
pub use one_of::OneOf;

/// 停止条件显示为 `名称(进度)` 的形式
pub trait StoppingCondition: Display {
    /// 重置预算，开始计量
    fn notify_search_started(&mut self);

    fn notify_fitness_evaluation(&mut self);

    /// 一次性通知多次目标函数计算；次数不能为负
    fn notify_fitness_evaluations(&mut self, evaluations: i64) -> Result<(), Error> {
        if evaluations < 0 {
            return Err(Error::invalid(format!("目标函数计算次数为负：{evaluations}")));
        }
        for _ in 0..evaluations {
            self.notify_fitness_evaluation();
        }
        Ok(())
    }

    fn search_must_stop(&self) -> bool;

    fn search_can_continue(&self) -> bool {
        !self.search_must_stop()
    }

    /// 已消耗的预算比例，位于 [0, 1] 之间
    ///
    /// 算法可能会在下一次检查之前多用一点预算，但进度不会超过 1
    fn progress(&self) -> f64;
}

impl<S: StoppingCondition + ?Sized> StoppingCondition for Box<S> {
    fn notify_search_started(&mut self) {
        (**self).notify_search_started()
    }

    fn notify_fitness_evaluation(&mut self) {
        (**self).notify_fitness_evaluation()
    }

    fn notify_fitness_evaluations(&mut self, evaluations: i64) -> Result<(), Error> {
        (**self).notify_fitness_evaluations(evaluations)
    }

    fn search_must_stop(&self) -> bool {
        (**self).search_must_stop()
    }

    fn progress(&self) -> f64 {
        (**self).progress()
    }
}

/// 把进度格式化为百分数，用于各个停止条件的 Display
pub(crate) fn percent(progress: f64) -> String {
    format!("{:.0}%", progress * 100.0)
}
