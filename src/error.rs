//! 错误类型

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// 参数不合法：矩阵与排列长度不符、预算为负、手动排列格式错误、未知算法等
    #[error("参数不合法：{0}")]
    InvalidArgument(String),
    /// 覆盖矩阵中没有任何一列被覆盖，APLC 无定义
    #[error("覆盖矩阵中没有可用的列，无法计算 APLC")]
    DegenerateInput,
    #[error("读写文件失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("CSV 格式错误：{0}")]
    Csv(#[from] csv::Error),
    #[error("YAML 格式错误：{0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON 序列化失败：{0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::InvalidArgument(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::InvalidArgument(value.to_string())
    }
}
