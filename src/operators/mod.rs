//! 算子接口（初等变换），以及两个通用的实现
//!

use crate::optimizers::Configuration;
use rand::RngCore;

/// 初等变换：基于现有的一个解产生它的一个邻居
///
/// 实现需满足：
/// - 若输入是合法解，输出也是合法解；
/// - 没有不动点，即输出与输入不同；
/// - 从任意解出发，有限次变换后可以到达任意合法解；
/// - 每次调用都在所有可行的邻居中重新均匀随机地选取一个。
///
/// 变换不应修改输入。初等变换与目标函数一起决定了适应度地形。
pub trait ElementaryTransformation<C> {
    fn transform(&self, configuration: &C, rng: &mut dyn RngCore) -> C;
}

impl<C, T: ElementaryTransformation<C> + ?Sized> ElementaryTransformation<C> for &T {
    fn transform(&self, configuration: &C, rng: &mut dyn RngCore) -> C {
        (**self).transform(configuration, rng)
    }
}

/// 使用解自带的初等变换
#[derive(Debug, Clone, Copy, Default)]
pub struct Intrinsic;

impl<C: Configuration> ElementaryTransformation<C> for Intrinsic {
    fn transform(&self, configuration: &C, rng: &mut dyn RngCore) -> C {
        configuration.transform(rng)
    }
}

/// 由闭包定义的初等变换
pub struct FnTransformation<F>(pub F);

impl<C, F: Fn(&C, &mut dyn RngCore) -> C> ElementaryTransformation<C> for FnTransformation<F> {
    fn transform(&self, configuration: &C, rng: &mut dyn RngCore) -> C {
        (self.0)(configuration, rng)
    }
}
