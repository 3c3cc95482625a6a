//! 最小割提取
//!
//! 最小割定义为：在最终残量网络中，沿剩余容量为正的边从源点可达的节点集合。
//! 与产生残量网络的算法无关。

use super::{FlowResult, Termination};
use crate::error::{Error, Result};
use crate::network::{EdgeId, FlowNetwork, VisitMarker};
use crate::types::{is_infinite, saturating_add, Capacity};
use std::collections::VecDeque;

/// 残量网络中从源点可达的节点掩码
pub fn residual_reachable(network: &FlowNetwork) -> Vec<bool> {
    let mut marker = VisitMarker::new(network.node_count());
    mark_reachable(network, &mut marker);
    (0..network.node_count())
        .map(|v| marker.is_visited(v))
        .collect()
}

/// 用给定的访问标记做一次可达性遍历
pub(crate) fn mark_reachable(network: &FlowNetwork, marker: &mut VisitMarker) {
    let mut queue = VecDeque::new();

    marker.next_pass();
    marker.visit(network.source());
    queue.push_back(network.source());

    while let Some(u) = queue.pop_front() {
        for &id in network.outgoing(u) {
            let edge = network.edge(id);
            if edge.remaining_capacity() > 0 && !marker.is_visited(edge.to()) {
                marker.visit(edge.to());
                queue.push_back(edge.to());
            }
        }
    }
}

/// 跨越割（源侧 -> 汇侧）的正向边
pub fn cut_edges(network: &FlowNetwork, source_side: &[bool]) -> Vec<EdgeId> {
    network
        .forward_edges()
        .filter(|(_, e)| source_side[e.from()] && !source_side[e.to()])
        .map(|(id, _)| id)
        .collect()
}

/// 割容量：跨越割的边的原始容量之和（饱和）
pub fn cut_capacity(network: &FlowNetwork, source_side: &[bool]) -> Capacity {
    cut_edges(network, source_side)
        .into_iter()
        .fold(0, |acc, id| saturating_add(acc, network.edge(id).capacity()))
}

/// 校验流守恒、容量约束以及最大流等于割容量
pub fn verify(network: &FlowNetwork, result: &FlowResult) -> Result<()> {
    for (id, edge) in network.forward_edges() {
        if edge.flow() < 0 || edge.flow() > edge.capacity() {
            return Err(Error::FlowInvariant(format!(
                "边 {} ({} -> {}) 流量 {} 超出容量 [0, {}]",
                id.index(),
                edge.from(),
                edge.to(),
                edge.flow(),
                edge.capacity()
            )));
        }
    }

    for v in 0..network.node_count() {
        if v == network.source() || v == network.sink() {
            continue;
        }
        let net = network.net_outflow(v);
        if net != 0 {
            return Err(Error::FlowInvariant(format!(
                "节点 {} 流不守恒，净流出 {}",
                v, net
            )));
        }
    }

    let source_out = network.net_outflow(network.source());
    if source_out != result.max_flow {
        return Err(Error::FlowInvariant(format!(
            "源点净流出 {} 与最大流 {} 不一致",
            source_out, result.max_flow
        )));
    }

    // 提前终止时残量网络中仍有增广路，割不是最小割
    if result.termination != Termination::Exhausted {
        return Ok(());
    }

    let cut = cut_capacity(network, &result.min_cut);
    if !is_infinite(cut) && cut != result.max_flow {
        return Err(Error::FlowInvariant(format!(
            "割容量 {} 与最大流 {} 不一致",
            cut, result.max_flow
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> FlowNetwork {
        // 0 -(5)-> 1 -(2)-> 2 -(5)-> 3
        let mut net = FlowNetwork::new(4, 0, 3).unwrap();
        net.add_edge(0, 1, 5).unwrap();
        net.add_edge(1, 2, 2).unwrap();
        net.add_edge(2, 3, 5).unwrap();
        net
    }

    #[test]
    fn test_reachable_before_flow() {
        let net = chain();
        assert_eq!(residual_reachable(&net), vec![true, true, true, true]);
    }

    #[test]
    fn test_reachable_after_saturation() {
        let mut net = chain();
        for id in net.forward_edges().map(|(id, _)| id).collect::<Vec<_>>() {
            net.augment(id, 2);
        }

        let mask = residual_reachable(&net);
        assert_eq!(mask, vec![true, true, false, false]);

        let crossing = cut_edges(&net, &mask);
        assert_eq!(crossing.len(), 1);
        assert_eq!(net.edge(crossing[0]).from(), 1);
        assert_eq!(cut_capacity(&net, &mask), 2);
    }

    #[test]
    fn test_residual_edges_do_not_count_as_real() {
        // 只有反向边 2 -> 1 -> 0，源点 0 的出边都是残量边
        let mut net = FlowNetwork::new(3, 0, 2).unwrap();
        net.add_edge(2, 1, 5).unwrap();
        net.add_edge(1, 0, 5).unwrap();
        assert_eq!(residual_reachable(&net), vec![true, false, false]);
    }

    #[test]
    fn test_verify_detects_broken_conservation() {
        let mut net = chain();
        let first = net.forward_edges().next().map(|(id, _)| id).unwrap();
        net.augment(first, 3);

        let result = FlowResult::empty(net.node_count());
        let err = verify(&net, &result).unwrap_err();
        assert!(matches!(err, Error::FlowInvariant(_)));
    }
}
