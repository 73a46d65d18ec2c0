//! 搜索配置：优化方法、预算、重复次数和随机数种子
//!
//! 配置可以写在 YAML 文件中，也可以在命令行中给出，命令行中的值优先。

use crate::objectives::Direction;
use crate::optimizers::AnnealingParameters;
use crate::problems::{OrderingProblem, DEFAULT_MAX_EVALUATIONS};
use crate::stopping::{MaxTime, OneOf, StoppingCondition};
use crate::Error;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Display;
use std::fs::read_to_string;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 默认的重复次数
pub const DEFAULT_REPETITIONS: usize = 30;

/// 优化方法，用缩写表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "RS")]
    RandomSearch,
    #[serde(rename = "RW")]
    RandomWalk,
    #[serde(rename = "SA")]
    SimulatedAnnealing,
}

/// 不指定优化方法时依次运行退火算法和随机搜索
pub const DEFAULT_ALGORITHMS: [Algorithm; 2] =
    [Algorithm::SimulatedAnnealing, Algorithm::RandomSearch];

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [
        Algorithm::RandomSearch,
        Algorithm::RandomWalk,
        Algorithm::SimulatedAnnealing,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Algorithm::RandomSearch => "RS",
            Algorithm::RandomWalk => "RW",
            Algorithm::SimulatedAnnealing => "SA",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::RandomSearch => "随机搜索",
            Algorithm::RandomWalk => "随机游走",
            Algorithm::SimulatedAnnealing => "退火算法",
        }
    }

    /// 退火算法最小化 APLC 的最小化形式，其余两种方法最大化 APLC
    pub fn fitness_direction(self) -> Direction {
        match self {
            Algorithm::SimulatedAnnealing => Direction::Minimizing,
            Algorithm::RandomSearch | Algorithm::RandomWalk => Direction::Maximizing,
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let abbreviation = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|a| a.abbreviation() == abbreviation)
            .ok_or_else(|| Error::invalid(format!("未知的优化方法 \"{s}\"，可选的有 RS、RW、SA")))
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// 解析形如 `SA:RS` 的优化方法列表
pub fn parse_algorithms(s: &str) -> Result<Vec<Algorithm>, Error> {
    if s.trim().is_empty() {
        return Err(Error::invalid("优化方法列表为空"));
    }
    s.split(crate::data::SEPARATOR).map(Algorithm::from_str).collect()
}

/// 解析目标函数计算次数的上限，不能为负
pub fn parse_fitness_evaluations(s: &str) -> Result<u64, Error> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| Error::invalid(format!("无法解析目标函数计算次数 \"{s}\"")))?;
    u64::try_from(value).map_err(|_| Error::invalid(format!("目标函数计算次数为负：{value}")))
}

/// 解析时间预算，可以是秒数，也可以是 HH:MM:SS
pub fn parse_time(s: &str) -> Result<MaxTime, Error> {
    let pattern = Regex::new(r"^(?:(\d+)|(\d+):(\d{1,2}):(\d{1,2}))$")
        .map_err(|e| Error::invalid(e.to_string()))?;
    let malformed = || Error::invalid(format!("无法解析时间 \"{s}\"，应为秒数或 HH:MM:SS"));
    let captures = pattern.captures(s.trim()).ok_or_else(malformed)?;
    let number = |index: usize| -> Result<u64, Error> {
        captures
            .get(index)
            .map_or(Ok(0), |m| m.as_str().parse().map_err(|_| malformed()))
    };
    if captures.get(1).is_some() {
        return Ok(MaxTime::seconds(number(1)?));
    }
    MaxTime::hms(number(2)?, number(3)?, number(4)?)
}

/// 搜索预算
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub fitness_evaluations: Option<u64>,
    /// 秒数或 HH:MM:SS
    pub time: Option<String>,
}

/// 搜索配置文件的内容，所有字段都可以省略
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub algorithms: Option<Vec<Algorithm>>,
    pub budget: Option<BudgetConfig>,
    pub repetitions: Option<usize>,
    pub seed: Option<u64>,
    pub annealing: Option<AnnealingParameters>,
}

impl SearchConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// 用 `overrides` 中给出的值覆盖当前的值
    pub fn merge(self, overrides: SearchConfig) -> SearchConfig {
        let budget = match (self.budget, overrides.budget) {
            (Some(base), Some(top)) => Some(BudgetConfig {
                fitness_evaluations: top.fitness_evaluations.or(base.fitness_evaluations),
                time: top.time.or(base.time),
            }),
            (base, top) => top.or(base),
        };
        SearchConfig {
            algorithms: overrides.algorithms.or(self.algorithms),
            budget,
            repetitions: overrides.repetitions.or(self.repetitions),
            seed: overrides.seed.or(self.seed),
            annealing: overrides.annealing.or(self.annealing),
        }
    }

    /// 补全默认值并校验
    pub fn resolve(self) -> Result<Settings, Error> {
        let algorithms = self.algorithms.unwrap_or_else(|| DEFAULT_ALGORITHMS.to_vec());
        if algorithms.is_empty() {
            return Err(Error::invalid("至少需要一种优化方法"));
        }
        let budget = self.budget.unwrap_or_default();
        let max_time = budget
            .time
            .as_deref()
            .map(parse_time)
            .transpose()?
            .map(|t| t.max_time());
        let repetitions = self.repetitions.unwrap_or(DEFAULT_REPETITIONS);
        if repetitions == 0 {
            return Err(Error::invalid("重复次数必须为正数"));
        }
        let annealing = self.annealing.unwrap_or_default();
        annealing.validate()?;
        Ok(Settings {
            algorithms,
            max_evaluations: budget.fitness_evaluations,
            max_time,
            repetitions,
            seed: self.seed,
            annealing,
        })
    }
}

/// 补全了默认值的搜索配置
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub algorithms: Vec<Algorithm>,
    pub max_evaluations: Option<u64>,
    pub max_time: Option<Duration>,
    pub repetitions: usize,
    pub seed: Option<u64>,
    pub annealing: AnnealingParameters,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            algorithms: DEFAULT_ALGORITHMS.to_vec(),
            max_evaluations: None,
            max_time: None,
            repetitions: DEFAULT_REPETITIONS,
            seed: None,
            annealing: AnnealingParameters::default(),
        }
    }
}

impl Settings {
    /// 为给定的问题设置计算次数的上限；未指定任何预算时使用默认上限
    pub fn problem(&self, problem: OrderingProblem) -> OrderingProblem {
        let max_evaluations = self.max_evaluations.unwrap_or(DEFAULT_MAX_EVALUATIONS);
        problem.with_max_evaluations(max_evaluations)
    }

    /// 按预算组合停止条件：只给出时间时只限制时间，两者都给出时取其一即停止
    pub fn stopping_condition(&self, problem: &OrderingProblem) -> Box<dyn StoppingCondition> {
        match (self.max_evaluations, self.max_time) {
            (Some(_), Some(max_time)) => Box::new(OneOf::new(
                Box::new(problem.clone()),
                Box::new(MaxTime::new(max_time)),
            )),
            (None, Some(max_time)) => Box::new(MaxTime::new(max_time)),
            (_, None) => Box::new(problem.clone()),
        }
    }

    /// 整次运行共用的随机数生成器；未指定种子时从系统熵源取种子
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }
}
