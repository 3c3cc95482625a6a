//! 访问标记
//!
//! 每轮遍历递增一次令牌，避免在两次 BFS 之间清空布尔数组

use crate::types::NodeId;

/// 按轮次递增的访问标记
#[derive(Debug, Clone)]
pub struct VisitMarker {
    token: u32,
    stamps: Vec<u32>,
}

impl VisitMarker {
    /// 为 `node_count` 个节点创建标记
    pub fn new(node_count: usize) -> Self {
        Self {
            token: 0,
            stamps: vec![0; node_count],
        }
    }

    /// 开始新一轮遍历，此前的所有访问记录失效
    pub fn next_pass(&mut self) {
        if self.token == u32::MAX {
            self.stamps.iter_mut().for_each(|s| *s = 0);
            self.token = 0;
        }
        self.token += 1;
    }

    /// 标记节点已访问
    #[inline]
    pub fn visit(&mut self, node: NodeId) {
        self.stamps[node] = self.token;
    }

    /// 本轮是否已访问
    #[inline]
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.token != 0 && self.stamps[node] == self.token
    }

    /// 当前令牌
    pub fn token(&self) -> u32 {
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_are_independent() {
        let mut marker = VisitMarker::new(4);
        assert!(!marker.is_visited(0));

        marker.next_pass();
        marker.visit(1);
        assert!(marker.is_visited(1));
        assert!(!marker.is_visited(2));

        marker.next_pass();
        assert!(!marker.is_visited(1));
        assert_eq!(marker.token(), 2);
    }

    #[test]
    fn test_token_wrap_resets_stamps() {
        let mut marker = VisitMarker::new(2);
        marker.token = u32::MAX - 1;
        marker.next_pass();
        marker.visit(0);
        assert_eq!(marker.token(), u32::MAX);

        marker.next_pass();
        assert_eq!(marker.token(), 1);
        assert!(!marker.is_visited(0));
    }
}
