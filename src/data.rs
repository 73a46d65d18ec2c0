//! 覆盖矩阵与测试用例排列的基本数据结构，以及读取预先录制的覆盖矩阵的办法。
//!

use crate::Error;
use csv::ReaderBuilder;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 手动指定排列时各个序号之间的分隔符
pub const SEPARATOR: char = ':';

/// 覆盖矩阵：行为测试用例，列为被覆盖的代码单元（语句、行）
///
/// 构造之后不再修改；搜索过程中通过 `Arc` 共享
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMatrix {
    cells: Vec<Vec<bool>>,
    columns: usize,
}

impl CoverageMatrix {
    pub fn new(cells: Vec<Vec<bool>>) -> Result<Self, Error> {
        let columns = cells.first().map_or(0, Vec::len);
        if let Some((index, row)) = cells.iter().find_position(|row| row.len() != columns) {
            return Err(Error::invalid(format!(
                "覆盖矩阵第 {} 行有 {} 列，而第 1 行有 {columns} 列",
                index + 1,
                row.len()
            )));
        }
        Ok(Self { cells, columns })
    }

    /// 测试用例数 n
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    /// 代码单元数 m
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row(&self, test: usize) -> &[bool] {
        &self.cells[test]
    }

    pub fn covers(&self, test: usize, unit: usize) -> bool {
        self.cells[test][unit]
    }

    /// 没有被任何测试用例覆盖的列数 u
    pub fn dead_columns(&self) -> usize {
        (0..self.columns)
            .filter(|&unit| self.cells.iter().all(|row| !row[unit]))
            .count()
    }

    pub fn usable_columns(&self) -> usize {
        self.columns - self.dead_columns()
    }
}

/// 测试用例的一个排列：`[0, n)` 中每个序号恰好出现一次
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Ordering(Vec<usize>);

impl Ordering {
    pub fn new(indices: Vec<usize>) -> Result<Self, Error> {
        let n = indices.len();
        let mut seen = FxHashSet::default();
        for &index in &indices {
            if index >= n {
                return Err(Error::invalid(format!(
                    "排列中的序号 {index} 超出了范围 [0, {n})"
                )));
            }
            if !seen.insert(index) {
                return Err(Error::invalid(format!("排列中的序号 {index} 重复出现")));
            }
        }
        Ok(Self(indices))
    }

    /// 恒等排列 0, 1, …, n - 1
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    /// 调用者需保证 `indices` 是一个排列
    pub(crate) fn from_permutation(indices: Vec<usize>) -> Self {
        debug_assert!(Self::new(indices.clone()).is_ok());
        Self(indices)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// 按排列顺序给出测试用例的名称
    pub fn names<'a>(&self, test_cases: &'a [String]) -> Vec<&'a str> {
        self.0.iter().map(|&i| test_cases[i].as_str()).collect()
    }
}

impl TryFrom<Vec<usize>> for Ordering {
    type Error = Error;

    fn try_from(value: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Ordering> for Vec<usize> {
    fn from(value: Ordering) -> Self {
        value.0
    }
}

impl FromStr for Ordering {
    type Err = Error;

    /// 解析形如 `1:2:0` 的排列
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let indices = s
            .split(SEPARATOR)
            .map(|token| {
                token
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::invalid(format!("无法解析排列中的序号 \"{token}\"")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(indices)
    }
}

impl Display for Ordering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.iter().join(&SEPARATOR.to_string()))
    }
}

/// 覆盖信息的来源
///
/// 可以是对被测类进行插桩并执行得到的，也可以是预先录制好的
pub trait CoverageSource {
    fn coverage_matrix(&self) -> Result<CoverageMatrix, Error>;

    /// 与覆盖矩阵各行一一对应的测试用例名称
    fn test_cases(&self) -> Result<Vec<String>, Error>;
}

/// 预先录制在文件中的覆盖矩阵
///
/// 文件以制表符分隔，每行为一个测试用例：第一列为名称，其余各列为该用例是否覆盖对应的代码单元，
/// 可以写作 `1`/`0`、`X`/`_` 或者 `true`/`false`
#[derive(Debug, Clone)]
pub struct MatrixFile {
    pub path: PathBuf,
}

type RawRow = (String, Vec<String>);

impl MatrixFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// 文件名（不含扩展名），用于在报告中标识分析对象
    pub fn subject(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "matrix".to_string())
    }

    fn read(&self) -> Result<Vec<RawRow>, Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_path(&self.path)?;
        let mut rows = vec![];
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let name = fields.next().unwrap_or_default().trim().to_string();
            rows.push((name, fields.map(str::to_string).collect()));
        }
        Ok(rows)
    }

    fn parse_cell(cell: &str) -> Result<bool, Error> {
        match cell.trim() {
            "1" | "X" | "x" | "true" => Ok(true),
            "0" | "_" | "-" | "false" | "" => Ok(false),
            other => Err(Error::invalid(format!("无法解析覆盖信息 \"{other}\""))),
        }
    }
}

impl CoverageSource for MatrixFile {
    fn coverage_matrix(&self) -> Result<CoverageMatrix, Error> {
        let cells = self
            .read()?
            .into_iter()
            .map(|(_, cells)| {
                cells
                    .iter()
                    .map(|c| Self::parse_cell(c))
                    .collect::<Result<Vec<bool>, _>>()
            })
            .collect::<Result<Vec<Vec<bool>>, _>>()?;
        CoverageMatrix::new(cells)
    }

    fn test_cases(&self) -> Result<Vec<String>, Error> {
        Ok(self.read()?.into_iter().map(|(name, _)| name).collect())
    }
}
