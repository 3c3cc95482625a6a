//! Edmonds-Karp 最大流算法
//!
//! 基于 BFS 的 Ford-Fulkerson：每轮寻找一条最短增广路，
//! 以路径瓶颈增广，直到源点无法到达汇点

use super::min_cut::residual_reachable;
use super::{FlowResult, MaxFlowSolver, SolverOptions, SolverState, Termination};
use crate::metrics::{SolveStats, Timer};
use crate::network::{EdgeId, FlowNetwork, VisitMarker};
use crate::types::{is_infinite, saturating_add, Capacity, INFINITE_CAPACITY};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// Edmonds-Karp 求解器
pub struct EdmondsKarpSolver {
    network: FlowNetwork,
    options: SolverOptions,
    state: SolverState,
    result: Option<FlowResult>,
    /// 每个节点的发现边
    parent: Vec<Option<EdgeId>>,
    marker: VisitMarker,
}

impl EdmondsKarpSolver {
    /// 创建求解器，接管网络所有权
    pub fn new(network: FlowNetwork) -> Self {
        Self::with_options(network, SolverOptions::default())
    }

    /// 带选项创建求解器
    pub fn with_options(network: FlowNetwork, options: SolverOptions) -> Self {
        let n = network.node_count();
        Self {
            network,
            options,
            state: SolverState::Idle,
            result: None,
            parent: vec![None; n],
            marker: VisitMarker::new(n),
        }
    }

    /// 交还网络
    pub fn into_network(self) -> FlowNetwork {
        self.network
    }

    fn run(&mut self) -> FlowResult {
        self.state = SolverState::Running;
        let timer = Timer::start();
        let mut stats = SolveStats::default();
        let mut max_flow: Capacity = 0;

        let termination = loop {
            stats.search_passes += 1;
            if !self.bfs() {
                break Termination::Exhausted;
            }

            let bottleneck = self.path_bottleneck();
            if is_infinite(bottleneck) {
                warn!("增广路全部由无穷容量边组成，停止增广");
                break Termination::UnboundedPath;
            }
            if self.options.limit_reached(stats.augmentations) {
                warn!(
                    augmentations = stats.augmentations,
                    "达到增广次数上限，提前结束"
                );
                break Termination::IterationLimit;
            }

            self.augment_path(bottleneck);
            max_flow = saturating_add(max_flow, bottleneck);
            stats.augmentations += 1;
            trace!(bottleneck, max_flow, "增广");
        };

        // 最小割取自独立的残量可达性遍历
        let min_cut = residual_reachable(&self.network);

        stats.duration_us = timer.elapsed_us();
        debug!(
            max_flow,
            augmentations = stats.augmentations,
            bfs_passes = stats.search_passes,
            ?termination,
            "Edmonds-Karp 求解完成"
        );

        self.state = SolverState::Done;
        FlowResult {
            max_flow,
            min_cut,
            termination,
            stats,
        }
    }

    /// BFS 找最短增广路，找到汇点即停止
    fn bfs(&mut self) -> bool {
        let source = self.network.source();
        let sink = self.network.sink();
        let mut queue = VecDeque::new();

        self.marker.next_pass();
        self.marker.visit(source);
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            for &id in self.network.outgoing(u) {
                let edge = self.network.edge(id);
                let v = edge.to();
                if edge.remaining_capacity() > 0 && !self.marker.is_visited(v) {
                    self.marker.visit(v);
                    self.parent[v] = Some(id);
                    if v == sink {
                        return true;
                    }
                    queue.push_back(v);
                }
            }
        }

        false
    }

    /// 沿发现边从汇点回溯，求路径瓶颈
    fn path_bottleneck(&self) -> Capacity {
        let mut bottleneck = INFINITE_CAPACITY;
        for id in self.path_edges() {
            bottleneck = bottleneck.min(self.network.remaining_capacity(id));
        }
        bottleneck
    }

    fn augment_path(&mut self, amount: Capacity) {
        let path: Vec<EdgeId> = self.path_edges().collect();
        for id in path {
            self.network.augment(id, amount);
        }
    }

    /// 当前增广路上的边（从汇点到源点）
    fn path_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        let source = self.network.source();
        let mut node = self.network.sink();
        std::iter::from_fn(move || {
            if node == source {
                return None;
            }
            let id = self.parent[node]?;
            node = self.network.edge(id).from();
            Some(id)
        })
    }
}

impl MaxFlowSolver for EdmondsKarpSolver {
    fn name(&self) -> &'static str {
        "edmonds-karp"
    }

    fn state(&self) -> SolverState {
        self.state
    }

    fn network(&self) -> &FlowNetwork {
        &self.network
    }

    fn solve(&mut self) -> &FlowResult {
        let result = match self.result.take() {
            Some(result) => result,
            None => self.run(),
        };
        self.result.insert(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_chain() {
        let mut net = FlowNetwork::new(3, 0, 2).unwrap();
        net.add_edge(0, 1, 10).unwrap();
        net.add_edge(1, 2, 5).unwrap();

        let mut solver = EdmondsKarpSolver::new(net);
        assert_eq!(solver.max_flow(), 5);
        assert_eq!(solver.min_cut(), &[true, true, false]);
    }

    #[test]
    fn test_shortest_path_first() {
        // 0 -> 3 直达，另有一条更长的路径 0 -> 1 -> 2 -> 3
        let mut net = FlowNetwork::new(4, 0, 3).unwrap();
        net.add_edge(0, 1, 1).unwrap();
        net.add_edge(1, 2, 1).unwrap();
        net.add_edge(2, 3, 1).unwrap();
        let direct = net.add_edge(0, 3, 1).unwrap();

        let mut solver = EdmondsKarpSolver::with_options(
            net,
            SolverOptions::default().with_max_augmentations(1),
        );
        let result = solver.solve().clone();
        assert_eq!(result.termination, Termination::IterationLimit);
        assert_eq!(solver.network().edge(direct).flow(), 1);
    }

    #[test]
    fn test_stats_and_state() {
        let mut net = FlowNetwork::new(4, 0, 3).unwrap();
        net.add_edge(0, 1, 3).unwrap();
        net.add_edge(0, 2, 4).unwrap();
        net.add_edge(1, 3, 3).unwrap();
        net.add_edge(2, 3, 4).unwrap();

        let mut solver = EdmondsKarpSolver::new(net);
        assert_eq!(solver.state(), SolverState::Idle);

        let stats = solver.solve().stats.clone();
        assert_eq!(solver.state(), SolverState::Done);
        assert_eq!(stats.augmentations, 2);
        // 两次成功的 BFS 加一次失败的 BFS
        assert_eq!(stats.search_passes, 3);

        let net = solver.into_network();
        assert_eq!(net.net_outflow(0), 7);
    }
}
