//! APLC（Average Percentage of Lines Covered）指标
//!
//! 按排列顺序依次执行测试用例，第 i 个用例（从 1 开始计）新覆盖的代码单元数乘以 i 后累加得到加权和 S。
//! 设 n 为测试用例数，m 为代码单元数，u 为从未被覆盖的代码单元数，则
//!
//! - 最大化形式：1 − S / (n·(m − u)) + 1 / (2n)
//! - 最小化形式：S / (n·(m − u)) + 1 / (2n)
//!
//! 从未被覆盖的列既不计入分母，也不贡献 S，因此不影响任何排列的指标。

use super::Direction;
use crate::data::{CoverageMatrix, Ordering};
use crate::Error;
use std::sync::Arc;

/// 绑定一个覆盖矩阵并预先校验过的 APLC 计算器
#[derive(Debug, Clone)]
pub struct Aplc {
    matrix: Arc<CoverageMatrix>,
    usable_columns: usize,
}

impl Aplc {
    pub fn new(matrix: Arc<CoverageMatrix>) -> Result<Self, Error> {
        let usable_columns = check_usable(&matrix)?;
        Ok(Self {
            matrix,
            usable_columns,
        })
    }

    pub fn matrix(&self) -> &Arc<CoverageMatrix> {
        &self.matrix
    }

    /// 计算排列的 APLC；排列长度必须等于测试用例数
    pub fn evaluate(&self, ordering: &Ordering, direction: Direction) -> Result<f64, Error> {
        check_length(&self.matrix, ordering)?;
        Ok(self.score(ordering.as_slice(), direction))
    }

    /// 调用者需保证排列长度与矩阵行数一致
    pub(crate) fn score(&self, ordering: &[usize], direction: Direction) -> f64 {
        let sum = weighted_sum(&self.matrix, ordering);
        normalize(sum, self.matrix.rows(), self.usable_columns, direction)
    }
}

fn check_usable(matrix: &CoverageMatrix) -> Result<usize, Error> {
    match matrix.usable_columns() {
        0 => Err(Error::DegenerateInput),
        usable_columns => Ok(usable_columns),
    }
}

fn check_length(matrix: &CoverageMatrix, ordering: &Ordering) -> Result<(), Error> {
    if ordering.len() != matrix.rows() {
        return Err(Error::invalid(format!(
            "排列长度为 {}，而覆盖矩阵有 {} 个测试用例",
            ordering.len(),
            matrix.rows()
        )));
    }
    Ok(())
}

fn normalize(sum: u64, rows: usize, usable_columns: usize, direction: Direction) -> f64 {
    let n = rows as f64;
    let ratio = sum as f64 / (n * usable_columns as f64);
    let offset = 1.0 / (2.0 * n);
    match direction {
        Direction::Maximizing => 1.0 - ratio + offset,
        Direction::Minimizing => ratio + offset,
    }
}

/// 加权和 S：每个代码单元首次被覆盖时所在的位置（从 1 开始）之和
pub fn weighted_sum(matrix: &CoverageMatrix, ordering: &[usize]) -> u64 {
    let mut resolved = vec![false; matrix.columns()];
    let mut sum = 0;
    for (position, &test) in ordering.iter().enumerate() {
        let mut count = 0;
        for (unit, &covered) in matrix.row(test).iter().enumerate() {
            if covered && !resolved[unit] {
                resolved[unit] = true;
                count += 1;
            }
        }
        sum += count * (position as u64 + 1);
    }
    sum
}

/// 一次性计算排列的 APLC
pub fn aplc(
    matrix: &CoverageMatrix,
    ordering: &Ordering,
    direction: Direction,
) -> Result<f64, Error> {
    let usable_columns = check_usable(matrix)?;
    check_length(matrix, ordering)?;
    let sum = weighted_sum(matrix, ordering.as_slice());
    Ok(normalize(sum, matrix.rows(), usable_columns, direction))
}
