//! 流网络核心模块
//!
//! 定义边、流网络和访问标记

mod edge;
mod flow_network;
mod visit;

pub use edge::{Edge, EdgeId};
pub use flow_network::FlowNetwork;
pub use visit::VisitMarker;
