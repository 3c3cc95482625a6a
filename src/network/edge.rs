//! 边定义
//!
//! 有向容量边，每条逻辑边由正向边与残量边成对组成

use crate::types::{is_infinite, saturating_sub, Capacity, NodeId, INFINITE_CAPACITY};
use serde::{Deserialize, Serialize};

/// 边 ID（边数组中的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for EdgeId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

/// 边
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// 起点
    from: NodeId,
    /// 终点
    to: NodeId,
    /// 容量（残量边为 0）
    capacity: Capacity,
    /// 当前流量（有符号）
    flow: Capacity,
    /// 配对的残量边
    residual: EdgeId,
}

impl Edge {
    pub(crate) fn new(from: NodeId, to: NodeId, capacity: Capacity, residual: EdgeId) -> Self {
        Self {
            from,
            to,
            capacity,
            flow: 0,
            residual,
        }
    }

    /// 获取起点
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// 获取终点
    pub fn to(&self) -> NodeId {
        self.to
    }

    /// 获取容量
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// 获取流量
    pub fn flow(&self) -> Capacity {
        self.flow
    }

    /// 获取残量边 ID
    pub fn residual(&self) -> EdgeId {
        self.residual
    }

    /// 剩余容量 = 容量 - 流量
    ///
    /// 无穷容量边的剩余容量始终为无穷。
    pub fn remaining_capacity(&self) -> Capacity {
        if is_infinite(self.capacity) {
            INFINITE_CAPACITY
        } else {
            saturating_sub(self.capacity, self.flow)
        }
    }

    /// 是否为自环
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub(crate) fn add_flow(&mut self, amount: Capacity) {
        self.flow = self.flow.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_capacity() {
        let mut e = Edge::new(0, 1, 10, EdgeId::new(1));
        assert_eq!(e.remaining_capacity(), 10);

        e.add_flow(4);
        assert_eq!(e.flow(), 4);
        assert_eq!(e.remaining_capacity(), 6);

        let mut r = Edge::new(1, 0, 0, EdgeId::new(0));
        r.add_flow(-4);
        assert_eq!(r.remaining_capacity(), 4);
    }

    #[test]
    fn test_infinite_capacity_does_not_wrap() {
        let mut e = Edge::new(0, 1, INFINITE_CAPACITY, EdgeId::new(1));
        e.add_flow(1_000);
        assert_eq!(e.remaining_capacity(), INFINITE_CAPACITY);

        e.add_flow(INFINITE_CAPACITY);
        assert_eq!(e.flow(), INFINITE_CAPACITY);

        let mut r = Edge::new(1, 0, 0, EdgeId::new(0));
        r.add_flow(-INFINITE_CAPACITY);
        r.add_flow(-5);
        assert_eq!(r.flow(), Capacity::MIN);
        assert_eq!(r.remaining_capacity(), INFINITE_CAPACITY);
    }
}
