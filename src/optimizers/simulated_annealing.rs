//! 退火算法
//!
//! 线性降温：第 `step` 步的温度为 `1 - step / max_step`，并限制在 [0.01, 1] 之间。
//! 每一步从当前解出发取一个邻居，若接受概率大于阈值 `p0` 则移动到邻居上。
//! 停止条件允许继续并且步数未达到上限时，搜索才会继续。

use super::{Bookkeeper, Configuration, ConfigurationGenerator, Evaluated, SearchAlgorithm};
use crate::objectives::{Direction, FitnessFunction};
use crate::operators::{ElementaryTransformation, Intrinsic};
use crate::stopping::StoppingCondition;
use crate::Error;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, trace};

/// 最低温度，避免除以零
pub const MIN_TEMPERATURE: f64 = 0.01;

/// 退火算法的参数，包括降温的总步数和接受阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingParameters {
    pub max_step: usize,
    /// 接受概率必须严格大于这个阈值，邻居才会被接受
    pub acceptance_threshold: f64,
}

impl Default for AnnealingParameters {
    fn default() -> Self {
        Self {
            max_step: 500,
            acceptance_threshold: 0.2,
        }
    }
}

impl AnnealingParameters {
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_step == 0 {
            return Err(Error::invalid("退火步数必须为正数"));
        }
        let p0 = self.acceptance_threshold;
        if !p0.is_finite() || !(0.0..1.0).contains(&p0) {
            return Err(Error::invalid(format!("接受阈值 {p0} 不在 [0, 1) 之内")));
        }
        Ok(())
    }
}

/// 第 `step` 步的温度
pub fn temperature(step: usize, max_step: usize) -> f64 {
    let fraction = step as f64 / max_step as f64;
    (1.0 - fraction).clamp(MIN_TEMPERATURE, 1.0)
}

/// 从目标值为 `current` 的解移动到目标值为 `neighbor` 的解的接受概率
///
/// 严格更好时为 1，否则为 `exp(-Δ / T)`，其中 Δ 为按优化方向计算的变差量
pub fn acceptance_probability(
    direction: Direction,
    current: f64,
    neighbor: f64,
    temperature: f64,
) -> f64 {
    if direction.is_better(neighbor, current) {
        return 1.0;
    }
    (-direction.worsening(current, neighbor) / temperature).exp()
}

pub struct SimulatedAnnealing<C, G, F, S, T = Intrinsic> {
    generator: G,
    stepper: T,
    parameters: AnnealingParameters,
    bookkeeper: Bookkeeper<F, S>,
    _configuration: PhantomData<fn() -> C>,
}

impl<C, G, F, S> SimulatedAnnealing<C, G, F, S, Intrinsic>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
{
    /// 使用默认参数和解自带的初等变换
    pub fn new(generator: G, fitness_function: F, stopping_condition: S) -> Self {
        Self {
            generator,
            stepper: Intrinsic,
            parameters: AnnealingParameters::default(),
            bookkeeper: Bookkeeper::new(fitness_function, stopping_condition),
            _configuration: PhantomData,
        }
    }

    pub fn with_parameters(
        generator: G,
        fitness_function: F,
        stopping_condition: S,
        parameters: AnnealingParameters,
    ) -> Result<Self, Error> {
        Self::with_transformation(
            generator,
            fitness_function,
            stopping_condition,
            Intrinsic,
            parameters,
        )
    }
}

impl<C, G, F, S, T> SimulatedAnnealing<C, G, F, S, T>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
    T: ElementaryTransformation<C>,
{
    pub fn with_transformation(
        generator: G,
        fitness_function: F,
        stopping_condition: S,
        stepper: T,
        parameters: AnnealingParameters,
    ) -> Result<Self, Error> {
        parameters.validate()?;
        Ok(Self {
            generator,
            stepper,
            parameters,
            bookkeeper: Bookkeeper::new(fitness_function, stopping_condition),
            _configuration: PhantomData,
        })
    }

    pub fn parameters(&self) -> &AnnealingParameters {
        &self.parameters
    }

    fn accepts(&self, current: &Evaluated<C>, neighbor: &Evaluated<C>, temperature: f64) -> bool {
        let direction = self.bookkeeper.fitness_function.direction();
        let probability =
            acceptance_probability(direction, current.fitness, neighbor.fitness, temperature);
        probability > self.parameters.acceptance_threshold
    }
}

impl<C, G, F, S, T> SearchAlgorithm<C> for SimulatedAnnealing<C, G, F, S, T>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
    T: ElementaryTransformation<C>,
{
    fn find_solution(&mut self, rng: &mut dyn RngCore) -> C {
        let AnnealingParameters { max_step, .. } = self.parameters;
        self.bookkeeper.start();
        let first = self.generator.generate(rng);
        let mut current = self.bookkeeper.evaluate(first);
        let mut best = current.clone();
        let mut step = 1;
        while self.bookkeeper.can_continue() && step < max_step {
            let temperature = temperature(step, max_step);
            let neighbor = self.stepper.transform(&current.configuration, rng);
            let neighbor = self.bookkeeper.evaluate(neighbor);
            step += 1;
            if !self.accepts(&current, &neighbor, temperature) {
                continue;
            }
            trace!("第 {step} 步，温度 {temperature:.2}，接受目标值 {}", neighbor.fitness);
            current = neighbor;
            if self.bookkeeper.is_better(&current, &best) {
                debug!("退火算法找到了目标值为 {} 的解", current.fitness);
                best = current.clone();
            }
        }
        self.bookkeeper.finish("退火算法", &best);
        best.configuration
    }

    fn stopping_condition(&self) -> &dyn StoppingCondition {
        &self.bookkeeper.stopping_condition
    }
}
