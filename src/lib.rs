//! libtestorder 是使用 Rust 实现的回归测试用例排序工具。给定测试用例对代码单元的覆盖矩阵，它用元启发式搜索寻找一个尽早覆盖代码的执行顺序，并用 APLC 指标衡量排列的好坏。
//!
//! 搜索框架是通用的：解、初等变换、目标函数、停止条件四个角色相互独立，随机游走、随机搜索和退火算法三种优化方法只依赖这些角色的接口。
//!
//! testorder 是使用 libtestorder 实现的命令行程序，可以计算给定排列的 APLC，也可以用多种优化方法重复搜索并导出结果。

pub mod config;
pub mod data;
pub mod error;
pub mod experiment;
pub mod interfaces;
pub mod objectives;
pub mod operators;
pub mod optimizers;
pub mod problems;
pub mod stopping;

pub use error::Error;
pub use interfaces::command_line::{Command, CommandLine, CommandLineArgs, OptimizeArgs};
pub use interfaces::{Interface, Message};
