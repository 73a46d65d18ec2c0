use super::{percent, StoppingCondition};
use crate::Error;
use std::fmt::Display;
use std::time::Duration;
use web_time::Instant;

/// 时钟：返回自某个固定时刻以来经过的时间
pub type Clock = Box<dyn Fn() -> Duration>;

fn monotonic_clock() -> Clock {
    let origin = Instant::now();
    Box::new(move || origin.elapsed())
}

/// 搜索时间的上限
pub struct MaxTime {
    max_time: Duration,
    clock: Clock,
    // 尚未开始搜索时为 None
    start: Option<Duration>,
}

impl std::fmt::Debug for MaxTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaxTime")
            .field("max_time", &self.max_time)
            .field("start", &self.start)
            .finish_non_exhaustive()
    }
}

impl MaxTime {
    pub fn new(max_time: Duration) -> Self {
        Self::with_clock(max_time, monotonic_clock())
    }

    /// 使用给定的时钟计时，主要用于测试
    pub fn with_clock(max_time: Duration, clock: Clock) -> Self {
        Self {
            max_time,
            clock,
            start: None,
        }
    }

    pub fn seconds(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// 换算成秒数时溢出则报错
    pub fn minutes(minutes: u64) -> Result<Self, Error> {
        minutes
            .checked_mul(60)
            .map(Self::seconds)
            .ok_or_else(|| too_long(format!("{minutes} 分钟")))
    }

    pub fn hours(hours: u64) -> Result<Self, Error> {
        let minutes = hours
            .checked_mul(60)
            .ok_or_else(|| too_long(format!("{hours} 小时")))?;
        Self::minutes(minutes)
    }

    /// 形如 HH:MM:SS 的时长，分和秒必须在 [0, 60) 之内
    pub fn hms(hours: u64, minutes: u64, seconds: u64) -> Result<Self, Error> {
        if minutes >= 60 || seconds >= 60 {
            return Err(Error::invalid(format!(
                "非法的时间 {hours}:{minutes}:{seconds}"
            )));
        }
        Self::hours(hours)?
            .plus(Self::minutes(minutes)?)?
            .plus(Self::seconds(seconds))
    }

    /// 两个时间预算之和，沿用当前的时钟
    pub fn plus(self, other: MaxTime) -> Result<Self, Error> {
        let max_time = self
            .max_time
            .checked_add(other.max_time)
            .ok_or_else(|| too_long(format!("{:?} + {:?}", self.max_time, other.max_time)))?;
        Ok(Self::with_clock(max_time, self.clock))
    }

    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    fn elapsed(&self) -> Duration {
        match self.start {
            Some(start) => (self.clock)().saturating_sub(start),
            None => Duration::ZERO,
        }
    }
}

fn too_long(what: String) -> Error {
    Error::invalid(format!("时间预算 {what} 超出可表示的范围"))
}

impl StoppingCondition for MaxTime {
    fn notify_search_started(&mut self) {
        self.start = Some((self.clock)());
    }

    fn notify_fitness_evaluation(&mut self) {}

    fn search_must_stop(&self) -> bool {
        self.start.is_some() && self.elapsed() > self.max_time
    }

    fn progress(&self) -> f64 {
        if self.max_time.is_zero() {
            return if self.start.is_some() { 1.0 } else { 0.0 };
        }
        (self.elapsed().as_secs_f64() / self.max_time.as_secs_f64()).min(1.0)
    }
}

impl Display for MaxTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MaxTime({})", percent(self.progress()))
    }
}
