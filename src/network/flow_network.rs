//! 流网络数据结构
//!
//! 所有边存放在一个连续数组中，残量边之间以下标互相引用

use super::edge::{Edge, EdgeId};
use crate::error::{Error, Result};
use crate::types::{Capacity, NodeId};
use serde::{Deserialize, Serialize};

/// 有向容量网络
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNetwork {
    /// 节点数
    node_count: usize,
    /// 源点
    source: NodeId,
    /// 汇点
    sink: NodeId,
    /// 边数组（正向边与残量边交替存放）
    edges: Vec<Edge>,
    /// 每个节点的出边列表，按插入顺序
    adjacency: Vec<Vec<EdgeId>>,
}

impl FlowNetwork {
    /// 创建包含 `node_count` 个节点的空网络
    pub fn new(node_count: usize, source: NodeId, sink: NodeId) -> Result<Self> {
        for node in [source, sink] {
            if node >= node_count {
                return Err(Error::NodeOutOfRange { node, node_count });
            }
        }
        if source == sink {
            return Err(Error::InvalidTerminals(source));
        }

        Ok(Self {
            node_count,
            source,
            sink,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        })
    }

    /// 预留边容量
    pub fn with_edge_capacity(mut self, logical_edges: usize) -> Self {
        self.edges.reserve(logical_edges * 2);
        self
    }

    /// 添加逻辑边 `from -> to`，返回正向边 ID
    ///
    /// 同时创建容量为 0 的残量边。重复添加同一节点对会得到相互独立的平行边。
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> Result<EdgeId> {
        if capacity < 0 {
            return Err(Error::InvalidCapacity { from, to, capacity });
        }
        for node in [from, to] {
            if node >= self.node_count {
                return Err(Error::NodeOutOfRange {
                    node,
                    node_count: self.node_count,
                });
            }
        }

        let forward = EdgeId::new(self.edges.len());
        let backward = EdgeId::new(forward.index() + 1);

        self.edges.push(Edge::new(from, to, capacity, backward));
        self.edges.push(Edge::new(to, from, 0, forward));

        self.adjacency[from].push(forward);
        self.adjacency[to].push(backward);

        Ok(forward)
    }

    /// 节点数
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// 逻辑边数
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// 源点
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// 汇点
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// 获取边
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// 全部边记录（含残量边）
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// 通过 `add_edge` 添加的正向边
    pub fn forward_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .step_by(2)
            .map(|(i, e)| (EdgeId::new(i), e))
    }

    /// 节点的出边（含残量边）
    #[inline]
    pub fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node]
    }

    /// 配对的残量边
    #[inline]
    pub fn residual(&self, id: EdgeId) -> EdgeId {
        self.edges[id.index()].residual()
    }

    /// 剩余容量
    #[inline]
    pub fn remaining_capacity(&self, id: EdgeId) -> Capacity {
        self.edges[id.index()].remaining_capacity()
    }

    /// 沿边增广：`flow(e) += amount`，`flow(residual(e)) -= amount`
    ///
    /// 调用方保证 `0 <= amount <= remaining_capacity(e)`。
    pub fn augment(&mut self, id: EdgeId, amount: Capacity) {
        debug_assert!(amount >= 0 && amount <= self.remaining_capacity(id));
        let residual = self.residual(id);
        self.edges[id.index()].add_flow(amount);
        self.edges[residual.index()].add_flow(-amount);
    }

    /// 节点的净流出量（流出 - 流入）
    pub fn net_outflow(&self, node: NodeId) -> Capacity {
        // 残量边上的负流量即对应的流入
        self.adjacency[node]
            .iter()
            .fold(0, |acc: Capacity, &id| acc.saturating_add(self.edge(id).flow()))
    }
}
