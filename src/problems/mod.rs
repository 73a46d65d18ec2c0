//! 优化问题的具体定义
//!
//! 目前只有测试用例排序问题：把通用的优化框架绑定到测试用例序号的排列上。

pub mod test_case_ordering;

pub use test_case_ordering::{OrderingProblem, Teleport, TestCaseOrdering, DEFAULT_MAX_EVALUATIONS};
