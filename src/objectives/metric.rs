// 多次重复搜索所得 APLC 的统计量，以及它们输出到命令行的方式

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl Summary {
    /// 没有任何取值时返回 None
    pub fn of(values: &[f64]) -> Option<Self> {
        let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(x) => (x, x),
            MinMaxResult::MinMax(min, max) => (min, max),
        };
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { min, avg, max })
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "   > 最小值：{}", self.min)?;
        writeln!(f, "   > 平均值：{}", self.avg)?;
        writeln!(f, "   > 最大值：{}", self.max)
    }
}
