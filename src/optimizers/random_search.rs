//! 随机搜索
//!
//! 每一步都独立地生成一个新的随机解，不依赖上一步的解，返回预算耗尽前遇到的最优解。

use super::{Bookkeeper, Configuration, ConfigurationGenerator, SearchAlgorithm};
use crate::objectives::FitnessFunction;
use crate::stopping::StoppingCondition;
use rand::RngCore;
use std::marker::PhantomData;
use tracing::debug;

pub struct RandomSearch<C, G, F, S> {
    generator: G,
    bookkeeper: Bookkeeper<F, S>,
    _configuration: PhantomData<fn() -> C>,
}

impl<C, G, F, S> RandomSearch<C, G, F, S>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
{
    pub fn new(generator: G, fitness_function: F, stopping_condition: S) -> Self {
        Self {
            generator,
            bookkeeper: Bookkeeper::new(fitness_function, stopping_condition),
            _configuration: PhantomData,
        }
    }
}

impl<C, G, F, S> SearchAlgorithm<C> for RandomSearch<C, G, F, S>
where
    C: Configuration,
    G: ConfigurationGenerator<C>,
    F: FitnessFunction<C>,
    S: StoppingCondition,
{
    fn find_solution(&mut self, rng: &mut dyn RngCore) -> C {
        self.bookkeeper.start();
        let first = self.generator.generate(rng);
        let mut best = self.bookkeeper.evaluate(first);
        while self.bookkeeper.can_continue() {
            let candidate = self.generator.generate(rng);
            let candidate = self.bookkeeper.evaluate(candidate);
            // 目标值相同时保留原来的解
            if self.bookkeeper.is_better(&candidate, &best) {
                debug!("随机搜索找到了目标值为 {} 的解", candidate.fitness);
                best = candidate;
            }
        }
        self.bookkeeper.finish("随机搜索", &best);
        best.configuration
    }

    fn stopping_condition(&self) -> &dyn StoppingCondition {
        &self.bookkeeper.stopping_condition
    }
}
