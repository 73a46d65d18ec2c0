//! 随机游走
//!
//! 从一个随机解出发，反复用初等变换走到一个随机邻居，直到预算耗尽，返回途中遇到的最优解。

use super::{Bookkeeper, Configuration, ConfigurationGenerator, Evaluated, SearchAlgorithm};
use crate::objectives::FitnessFunction;
use crate::operators::{ElementaryTransformation, Intrinsic};
use crate::stopping::StoppingCondition;
use rand::RngCore;
use std::marker::PhantomData;
use tracing::debug;

pub struct RandomWalk<C, G, F, S, T = Intrinsic> {
    generator: G,
    stepper: T,
    bookkeeper: Bookkeeper<F, S>,
    _configuration: PhantomData<fn() -> C>,
}

impl<C, G, F, S> RandomWalk<C, G, F, S, Intrinsic>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
{
    /// 使用解自带的初等变换
    pub fn new(generator: G, fitness_function: F, stopping_condition: S) -> Self {
        Self::with_transformation(generator, fitness_function, stopping_condition, Intrinsic)
    }
}

impl<C, G, F, S, T> RandomWalk<C, G, F, S, T>
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
    ) -> Self {
        Self {
            generator,
            stepper,
            bookkeeper: Bookkeeper::new(fitness_function, stopping_condition),
            _configuration: PhantomData,
        }
    }

    /// 进行一次随机游走，用 `init` 处理起点，再用 `step` 依次处理之后经过的每个解
    fn walk<A>(
        &mut self,
        rng: &mut dyn RngCore,
        init: impl FnOnce(&Evaluated<C>) -> A,
        mut step: impl FnMut(&mut A, &Evaluated<C>),
    ) -> A {
        self.bookkeeper.start();
        let start = self.generator.generate(rng);
        let mut current = self.bookkeeper.evaluate(start);
        let mut accumulator = init(&current);
        while self.bookkeeper.can_continue() {
            let neighbor = self.stepper.transform(&current.configuration, rng);
            current = self.bookkeeper.evaluate(neighbor);
            step(&mut accumulator, &current);
        }
        accumulator
    }

    /// 进行一次随机游走，返回途中每一步的目标值，可用于分析适应度地形
    pub fn fitness_values(&mut self, rng: &mut dyn RngCore) -> Vec<f64> {
        self.walk(
            rng,
            |start| vec![start.fitness],
            |values, current| values.push(current.fitness),
        )
    }
}

impl<C, G, F, S, T> SearchAlgorithm<C> for RandomWalk<C, G, F, S, T>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
    T: ElementaryTransformation<C>,
{
    fn find_solution(&mut self, rng: &mut dyn RngCore) -> C {
        let direction = self.bookkeeper.fitness_function.direction();
        let best = self.walk(
            rng,
            |start| start.clone(),
            |best, current| {
                // 目标值相同时取最近的解
                if !direction.is_better(best.fitness, current.fitness) {
                    if direction.is_better(current.fitness, best.fitness) {
                        debug!("随机游走找到了目标值为 {} 的解", current.fitness);
                    }
                    *best = current.clone();
                }
            },
        );
        self.bookkeeper.finish("随机游走", &best);
        best.configuration
    }

    fn stopping_condition(&self) -> &dyn StoppingCondition {
        &self.bookkeeper.stopping_condition
    }
}
