use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::RefCell;
use testorder::objectives::{Direction, FitnessFunction};
use testorder::operators::{ElementaryTransformation, FnTransformation};
use testorder::optimizers::simulated_annealing::{acceptance_probability, temperature};
use testorder::optimizers::{
    AnnealingParameters, Configuration, ConfigurationGenerator, RandomSearch, RandomWalk,
    SearchAlgorithm, SimulatedAnnealing,
};
use testorder::stopping::{MaxFitnessEvaluations, StoppingCondition};
use testorder::Error;

const SIZE: u32 = 100;
const PEAK: i64 = 37;

/// 环上的一个点，邻居是左右相邻的两个点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Point(u32);

struct Step;

impl ElementaryTransformation<Point> for Step {
    fn transform(&self, configuration: &Point, rng: &mut dyn RngCore) -> Point {
        let offset = if rng.next_u32() % 2 == 0 { 1 } else { SIZE - 1 };
        Point((configuration.0 + offset) % SIZE)
    }
}

impl Configuration for Point {
    type Transformation = Step;

    fn elementary_transformation(&self) -> &Step {
        &Step
    }

    fn degrees_of_freedom(&self) -> usize {
        1
    }
}

struct Uniform;

impl ConfigurationGenerator<Point> for Uniform {
    fn generate(&self, rng: &mut dyn RngCore) -> Point {
        Point(rng.next_u32() % SIZE)
    }
}

fn distance(point: &Point) -> f64 {
    ((point.0 as i64 - PEAK) * (point.0 as i64 - PEAK)) as f64
}

/// 记录每次计算的目标函数
struct Recorder {
    direction: Direction,
    constant: bool,
    history: RefCell<Vec<(Point, f64)>>,
}

impl Recorder {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            constant: false,
            history: RefCell::new(vec![]),
        }
    }

    fn constant() -> Self {
        Self {
            constant: true,
            ..Self::new(Direction::Maximizing)
        }
    }

    fn score(&self, point: &Point) -> f64 {
        match (self.constant, self.direction) {
            (true, _) => 1.0,
            (false, Direction::Maximizing) => 10000.0 - distance(point),
            (false, Direction::Minimizing) => distance(point),
        }
    }

    fn evaluations(&self) -> usize {
        self.history.borrow().len()
    }

    fn values(&self) -> Vec<f64> {
        self.history.borrow().iter().map(|(_, f)| *f).collect()
    }

    fn clear(&self) {
        self.history.borrow_mut().clear();
    }
}

impl FitnessFunction<Point> for Recorder {
    fn fitness(&self, candidate: &Point) -> f64 {
        let value = self.score(candidate);
        self.history.borrow_mut().push((*candidate, value));
        value
    }

    fn direction(&self) -> Direction {
        self.direction
    }
}

#[test]
fn 随机搜索不超过预算且返回最优解() {
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut search = RandomSearch::new(Uniform, &recorder, MaxFitnessEvaluations::new(50));
    let best = search.find_solution(&mut rng);
    assert!(recorder.evaluations() <= 51);
    let best_value = recorder.score(&best);
    assert!(recorder.values().iter().all(|&v| best_value >= v));
    assert!(search.search_must_stop());
    assert_eq!(search.progress(), 1.0);
}

#[test]
fn 随机游走不超过预算且返回最优解() {
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut search = RandomWalk::new(Uniform, &recorder, MaxFitnessEvaluations::new(80));
    let best = search.find_solution(&mut rng);
    assert!(recorder.evaluations() <= 81);
    let best_value = recorder.score(&best);
    assert!(recorder.values().iter().all(|&v| best_value >= v));
}

#[test]
fn 随机游走每一步都走到邻居() {
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut search = RandomWalk::new(Uniform, &recorder, MaxFitnessEvaluations::new(20));
    let _: Point = search.find_solution(&mut rng);
    let history = recorder.history.borrow();
    for pair in history.windows(2) {
        let (a, b) = (pair[0].0 .0, pair[1].0 .0);
        assert!((a + 1) % SIZE == b || (b + 1) % SIZE == a);
    }
}

#[test]
fn 目标值相同时的取舍() {
    // 随机游走取最近的解
    let recorder = Recorder::constant();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let mut walk = RandomWalk::new(Uniform, &recorder, MaxFitnessEvaluations::new(10));
    let best = walk.find_solution(&mut rng);
    assert_eq!(Some(best), recorder.history.borrow().last().map(|(p, _)| *p));

    // 随机搜索保留原来的解
    recorder.clear();
    let mut search = RandomSearch::new(Uniform, &recorder, MaxFitnessEvaluations::new(10));
    let best = search.find_solution(&mut rng);
    assert_eq!(Some(best), recorder.history.borrow().first().map(|(p, _)| *p));
}

#[test]
fn 多次搜索互不影响() {
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut search = RandomSearch::new(Uniform, &recorder, MaxFitnessEvaluations::new(30));
    for _ in 0..3 {
        recorder.clear();
        let _: Point = search.find_solution(&mut rng);
        assert_eq!(recorder.evaluations(), 31);
    }
}

#[test]
fn 退火算法的最优解不差于初始解() {
    for seed in 0..20 {
        let recorder = Recorder::new(Direction::Minimizing);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut search =
            SimulatedAnnealing::new(Uniform, &recorder, MaxFitnessEvaluations::new(200));
        let best = search.find_solution(&mut rng);
        let first = recorder.values()[0];
        assert!(recorder.score(&best) <= first);
        assert!(recorder.evaluations() <= 201);
    }
}

#[test]
fn 退火步数上限() {
    let recorder = Recorder::new(Direction::Minimizing);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let parameters = AnnealingParameters {
        max_step: 50,
        acceptance_threshold: 0.2,
    };
    let mut search = SimulatedAnnealing::with_parameters(
        Uniform,
        &recorder,
        MaxFitnessEvaluations::new(10_000),
        parameters,
    )
    .unwrap();
    let _: Point = search.find_solution(&mut rng);
    // 初始解一次，第 1 步到第 49 步各一次
    assert_eq!(recorder.evaluations(), 50);
    assert!(search.search_can_continue());
}

#[test]
fn 退火参数必须合法() {
    let invalid = [
        AnnealingParameters {
            max_step: 0,
            acceptance_threshold: 0.2,
        },
        AnnealingParameters {
            max_step: 10,
            acceptance_threshold: 1.0,
        },
        AnnealingParameters {
            max_step: 10,
            acceptance_threshold: f64::NAN,
        },
        AnnealingParameters {
            max_step: 10,
            acceptance_threshold: -0.1,
        },
    ];
    for parameters in invalid {
        let recorder = Recorder::new(Direction::Minimizing);
        let result: Result<SimulatedAnnealing<Point, _, _, _>, _> =
            SimulatedAnnealing::with_parameters(
                Uniform,
                &recorder,
                MaxFitnessEvaluations::new(10),
                parameters,
            );
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
    assert_eq!(AnnealingParameters::default().max_step, 500);
    assert_eq!(AnnealingParameters::default().acceptance_threshold, 0.2);
}

#[test]
fn 降温时间表() {
    assert_eq!(temperature(0, 500), 1.0);
    assert_eq!(temperature(250, 500), 0.5);
    assert_eq!(temperature(499, 500), 0.01);
    assert_eq!(temperature(500, 500), 0.01);
}

#[test]
fn 接受概率() {
    let minimizing = Direction::Minimizing;
    assert_eq!(acceptance_probability(minimizing, 1.0, 0.5, 0.3), 1.0);
    let p = acceptance_probability(minimizing, 0.5, 0.7, 0.5);
    assert!((p - (-0.4f64).exp()).abs() < 1e-12);
    // 相同时不算更好
    assert_eq!(acceptance_probability(minimizing, 0.5, 0.5, 0.5), 1.0);
    let maximizing = Direction::Maximizing;
    assert_eq!(acceptance_probability(maximizing, 0.5, 0.7, 0.1), 1.0);
    let p = acceptance_probability(maximizing, 0.7, 0.5, 0.5);
    assert!((p - (-0.4f64).exp()).abs() < 1e-12);
}

#[test]
fn 固定种子可以复现() {
    let run = |seed: u64| {
        let recorder = Recorder::new(Direction::Minimizing);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut search =
            SimulatedAnnealing::new(Uniform, &recorder, MaxFitnessEvaluations::new(100));
        let best = search.find_solution(&mut rng);
        let history = recorder.history.borrow().clone();
        (best, history)
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn 可以替换初等变换() {
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let jump = FnTransformation(|point: &Point, _: &mut dyn RngCore| Point((point.0 + 2) % SIZE));
    let mut search = RandomWalk::with_transformation(
        Uniform,
        &recorder,
        MaxFitnessEvaluations::new(10),
        jump,
    );
    let _: Point = search.find_solution(&mut rng);
    let history = recorder.history.borrow();
    assert_eq!(history.len(), 11);
    for pair in history.windows(2) {
        assert_eq!((pair[0].0 .0 + 2) % SIZE, pair[1].0 .0);
    }
}

#[test]
fn 目标函数的比较() {
    let recorder = Recorder::new(Direction::Minimizing);
    let near = Point(36);
    let far = Point(90);
    assert!(recorder.is_minimizing());
    assert_eq!(recorder.best(&near, &far), &near);
    assert_eq!(recorder.best(&far, &near), &near);
    let tie = Point(38);
    assert_eq!(recorder.best(&near, &tie), &near);
    assert_eq!(near.transform(&mut ChaCha8Rng::seed_from_u64(0)).0 % 2, 1);
}

#[test]
fn 组合停止条件也可以用于搜索() {
    use testorder::stopping::{MaxTime, OneOf};
    let recorder = Recorder::new(Direction::Maximizing);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let stopping = OneOf::new(
        Box::new(MaxFitnessEvaluations::new(25)),
        Box::new(MaxTime::seconds(3600)),
    );
    let mut search = RandomSearch::new(Uniform, &recorder, stopping);
    let _: Point = search.find_solution(&mut rng);
    assert_eq!(recorder.evaluations(), 26);
    assert!(search.stopping_condition().search_must_stop());
}
