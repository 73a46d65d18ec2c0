//! 优化方法接口，以及随机游走、随机搜索、模拟退火三种优化方法的实现
//!
//! 解、初等变换、目标函数、停止条件是四个相互独立的角色，三种优化方法都只依赖这些角色的接口。

use crate::objectives::FitnessFunction;
use crate::operators::ElementaryTransformation;
use crate::stopping::StoppingCondition;
use rand::RngCore;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

pub mod random_search;
pub mod random_walk;
pub mod simulated_annealing;

pub use random_search::RandomSearch;
pub use random_walk::RandomWalk;
pub use simulated_annealing::{AnnealingParameters, SimulatedAnnealing};

/// 解的编码
///
/// 解只能变换为同一类型的解。解一经产生就不再修改，每次变换都得到一个新的解。
/// 相等性与哈希必须按解的内容定义。
pub trait Configuration: Clone + Eq + Hash + Debug {
    type Transformation: ElementaryTransformation<Self>;

    fn elementary_transformation(&self) -> &Self::Transformation;

    /// 用解自带的初等变换得到一个邻居
    fn transform(&self, rng: &mut dyn RngCore) -> Self {
        self.elementary_transformation().transform(self, rng)
    }

    /// 解的自由度，即编码中可以自由改变的变量个数
    fn degrees_of_freedom(&self) -> usize;

    fn fitness_by<F: FitnessFunction<Self>>(&self, fitness_function: &F) -> f64 {
        fitness_function.fitness(self)
    }
}

/// 随机生成合法的解
pub trait ConfigurationGenerator<C: Configuration> {
    fn generate(&self, rng: &mut dyn RngCore) -> C;
}

impl<C: Configuration, G: ConfigurationGenerator<C> + ?Sized> ConfigurationGenerator<C> for &G {
    fn generate(&self, rng: &mut dyn RngCore) -> C {
        (**self).generate(rng)
    }
}

/// 搜索算法
pub trait SearchAlgorithm<C: Configuration> {
    /// 进行一次完整、独立的搜索，返回找到的最优解
    ///
    /// 可以连续调用多次，每次调用都重新开始计量预算，各次之间互不影响
    fn find_solution(&mut self, rng: &mut dyn RngCore) -> C;

    fn stopping_condition(&self) -> &dyn StoppingCondition;

    fn search_can_continue(&self) -> bool {
        self.stopping_condition().search_can_continue()
    }

    fn search_must_stop(&self) -> bool {
        self.stopping_condition().search_must_stop()
    }

    fn progress(&self) -> f64 {
        self.stopping_condition().progress()
    }
}

/// 解与它的目标值
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated<C> {
    pub configuration: C,
    pub fitness: f64,
}

/// 三种优化方法共用的计分与记账逻辑
pub(crate) struct Bookkeeper<F, S> {
    pub fitness_function: F,
    pub stopping_condition: S,
}

impl<F, S: StoppingCondition> Bookkeeper<F, S> {
    pub fn new(fitness_function: F, stopping_condition: S) -> Self {
        Self {
            fitness_function,
            stopping_condition,
        }
    }

    pub fn start(&mut self) {
        self.stopping_condition.notify_search_started();
    }

    pub fn can_continue(&self) -> bool {
        self.stopping_condition.search_can_continue()
    }

    /// 计算目标值，并通知停止条件恰好一次
    pub fn evaluate<C: Configuration>(&mut self, configuration: C) -> Evaluated<C>
    where
        F: FitnessFunction<C>,
    {
        self.stopping_condition.notify_fitness_evaluation();
        let fitness = configuration.fitness_by(&self.fitness_function);
        Evaluated {
            configuration,
            fitness,
        }
    }

    /// `candidate` 是否严格优于 `incumbent`
    pub fn is_better<C>(&self, candidate: &Evaluated<C>, incumbent: &Evaluated<C>) -> bool
    where
        F: FitnessFunction<C>,
    {
        self.fitness_function
            .direction()
            .is_better(candidate.fitness, incumbent.fitness)
    }

    pub fn finish<C>(&self, algorithm: &str, best: &Evaluated<C>) {
        debug!(
            "{algorithm} 搜索结束：最优目标值 {}，{}",
            best.fitness, self.stopping_condition
        );
    }
}
