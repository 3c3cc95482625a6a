//! flowcut - 最大流 / 最小割引擎
//!
//! 面向图割图像分割的流网络引擎，提供：
//! - 残量网络数据模型（成对的正向 / 反向边）
//! - 两种可互换的求解器：Edmonds-Karp 与 Boykov-Kolmogorov
//! - 基于残量可达性的最小割提取与校验
//! - 由灰度图像和种子点构造网络的分割适配器

pub mod algorithm;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod metrics;
pub mod network;
pub mod segmentation;
pub mod types;

// 重导出常用类型
pub use algorithm::{
    BoykovKolmogorovSolver, EdmondsKarpSolver, FlowResult, MaxFlowSolver, SolverOptions,
    SolverState, Termination,
};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use network::{Edge, EdgeId, FlowNetwork, VisitMarker};
pub use segmentation::{GrayImage, PixelSeed, Segmentation, SegmentationConfig, Segmenter};
pub use types::{Capacity, NodeId, SolverKind, INFINITE_CAPACITY};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
