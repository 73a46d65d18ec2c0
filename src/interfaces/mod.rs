use crate::config::Algorithm;
use crate::objectives::metric::Summary;
use serde::Serialize;
use serde_with::skip_serializing_none;

pub mod command_line;

/// 向用户反馈的消息类型
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    AlgorithmStarted {
        algorithm: Algorithm,
        repetitions: usize,
        stopping_condition: String,
    },
    Repetition {
        algorithm: Algorithm,
        /// 从 1 开始计
        index: usize,
        ordering: Vec<String>,
        aplc: f64,
        seconds: f64,
    },
    Summary {
        algorithm: Algorithm,
        summary: Summary,
    },
    /// 手动给出的排列的 APLC
    Aplc {
        ordering: Vec<String>,
        aplc: f64,
        subject: Option<String>,
    },
}

/// 定义了向用户报告消息的接口
///
/// 不同的界面只需要各自实现 post 方法，就可向用户报告搜索过程和结果
pub trait Interface {
    fn post(&self, message: Message);
}

/// 丢弃所有消息的界面，用于测试和基准测试
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Interface for Silent {
    fn post(&self, _message: Message) {}
}
