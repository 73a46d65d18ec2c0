//! 目标函数接口，以及 APLC 指标的实现
//!

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod aplc;
pub mod metric;

/// 优化方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Minimizing,
    Maximizing,
}

impl Direction {
    /// 按照优化方向比较两个目标值，`Greater` 表示 `a` 更好
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ordering = a.total_cmp(&b);
        match self {
            Direction::Maximizing => ordering,
            Direction::Minimizing => ordering.reverse(),
        }
    }

    /// `candidate` 是否严格优于 `incumbent`
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        self.compare(candidate, incumbent) == Ordering::Greater
    }

    /// `candidate` 比 `incumbent` 差多少；若更好则为负数
    pub fn worsening(self, incumbent: f64, candidate: f64) -> f64 {
        match self {
            Direction::Maximizing => incumbent - candidate,
            Direction::Minimizing => candidate - incumbent,
        }
    }
}

/// 目标函数
///
/// 返回值必须非负且不为 NaN。相等的解应当得到相同的目标值
pub trait FitnessFunction<C> {
    fn fitness(&self, candidate: &C) -> f64;

    fn direction(&self) -> Direction;

    fn is_minimizing(&self) -> bool {
        self.direction() == Direction::Minimizing
    }

    fn is_maximizing(&self) -> bool {
        !self.is_minimizing()
    }

    /// 按目标值比较两个解，更好的解排在后面
    fn compare(&self, a: &C, b: &C) -> Ordering {
        self.direction().compare(self.fitness(a), self.fitness(b))
    }

    /// 两个解中更好的一个；相同时取 `a`
    fn best<'a>(&self, a: &'a C, b: &'a C) -> &'a C {
        if self.compare(b, a) == Ordering::Greater {
            b
        } else {
            a
        }
    }
}

impl<C, F: FitnessFunction<C> + ?Sized> FitnessFunction<C> for &F {
    fn fitness(&self, candidate: &C) -> f64 {
        (**self).fitness(candidate)
    }

    fn direction(&self) -> Direction {
        (**self).direction()
    }
}
