//! 错误类型定义

use crate::types::{Capacity, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("无效的容量: 边 {from} -> {to} 的容量为 {capacity}，容量不能为负")]
    InvalidCapacity {
        from: NodeId,
        to: NodeId,
        capacity: Capacity,
    },

    #[error("节点越界: {node}（节点数 {node_count}）")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("源点与汇点相同: {0}")]
    InvalidTerminals(NodeId),

    #[error("无效的种子点: {0}")]
    InvalidSeed(String),

    #[error("无效的图像: {0}")]
    InvalidImage(String),

    #[error("流不变量被破坏: {0}")]
    FlowInvariant(String),

    #[error("导入错误: {0}")]
    ImportError(String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::ImportError(e.to_string())
    }
}
