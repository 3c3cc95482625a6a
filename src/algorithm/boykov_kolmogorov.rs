//! Boykov-Kolmogorov 最大流算法
//!
//! 维护两棵不相交的搜索树：以源点为根的 S 树和以汇点为根的 T 树。
//! 每轮依次执行：
//! 1. 生长：活跃节点向自由邻居扩展，直到两棵树相遇
//! 2. 增广：沿相遇处连成的路径以瓶颈值增广，饱和的树边使其子节点成为孤儿
//! 3. 收养：为孤儿在同一棵树中寻找以根为起点的新父节点，找不到则释放为自由节点
//!
//! 与 Edmonds-Karp 每轮从头 BFS 不同，两棵树在增广之间复用，
//! 只修复被饱和边破坏的局部，适合终端边密集的网格图（图像分割）。
//!
//! 活跃集合与孤儿集合都是 FIFO 队列，邻接表按插入顺序扫描，结果可复现。

use super::min_cut::residual_reachable;
use super::{FlowResult, MaxFlowSolver, SolverOptions, SolverState, Termination};
use crate::metrics::{SolveStats, Timer};
use crate::network::{EdgeId, FlowNetwork};
use crate::types::{is_infinite, saturating_add, Capacity, NodeId};
use std::collections::VecDeque;
use tracing::{debug, trace, warn};

/// 节点所属的搜索树
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tree {
    Free,
    Source,
    Sink,
}

/// Boykov-Kolmogorov 求解器
pub struct BoykovKolmogorovSolver {
    network: FlowNetwork,
    options: SolverOptions,
    state: SolverState,
    result: Option<FlowResult>,
    tree: Vec<Tree>,
    /// 父边，方向为父节点 -> 子节点；树根与孤儿为 `None`
    parent: Vec<Option<EdgeId>>,
    active: Vec<bool>,
    active_queue: VecDeque<NodeId>,
    orphans: VecDeque<NodeId>,
    stats: SolveStats,
}

impl BoykovKolmogorovSolver {
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
            tree: vec![Tree::Free; n],
            parent: vec![None; n],
            active: vec![false; n],
            active_queue: VecDeque::new(),
            orphans: VecDeque::new(),
            stats: SolveStats::default(),
        }
    }

    /// 交还网络
    pub fn into_network(self) -> FlowNetwork {
        self.network
    }

    fn run(&mut self) -> FlowResult {
        self.state = SolverState::Running;
        let timer = Timer::start();
        let source = self.network.source();
        let sink = self.network.sink();

        self.tree[source] = Tree::Source;
        self.tree[sink] = Tree::Sink;
        self.activate(source);
        self.activate(sink);

        let mut max_flow: Capacity = 0;
        let termination = loop {
            self.stats.search_passes += 1;
            let Some(mid) = self.grow() else {
                break Termination::Exhausted;
            };

            let bottleneck = self.path_bottleneck(mid);
            if is_infinite(bottleneck) {
                warn!("增广路全部由无穷容量边组成，停止增广");
                break Termination::UnboundedPath;
            }
            if self.options.limit_reached(self.stats.augmentations) {
                warn!(
                    augmentations = self.stats.augmentations,
                    "达到增广次数上限，提前结束"
                );
                break Termination::IterationLimit;
            }

            self.augment(mid, bottleneck);
            max_flow = saturating_add(max_flow, bottleneck);
            self.stats.augmentations += 1;
            trace!(bottleneck, max_flow, orphans = self.orphans.len(), "增广");

            self.adopt_orphans();
        };

        // 正常结束时 S 树恰好是残量网络中从源点可达的节点集合
        let min_cut = match termination {
            Termination::Exhausted => self.tree.iter().map(|&t| t == Tree::Source).collect(),
            _ => residual_reachable(&self.network),
        };

        let mut stats = std::mem::take(&mut self.stats);
        stats.duration_us = timer.elapsed_us();
        debug!(
            max_flow,
            augmentations = stats.augmentations,
            growth_passes = stats.search_passes,
            orphans = stats.orphans_processed,
            adoptions = stats.adoptions,
            ?termination,
            "Boykov-Kolmogorov 求解完成"
        );

        self.state = SolverState::Done;
        FlowResult {
            max_flow,
            min_cut,
            termination,
            stats,
        }
    }

    fn activate(&mut self, node: NodeId) {
        if !self.active[node] {
            self.active[node] = true;
            self.active_queue.push_back(node);
        }
    }

    fn make_orphan(&mut self, node: NodeId) {
        self.parent[node] = None;
        self.active[node] = false;
        self.orphans.push_back(node);
    }

    /// 树边在流动方向上的剩余容量
    ///
    /// S 树中流量沿父边流向子节点，T 树中沿父边的反向边流向父节点。
    fn link_capacity(&self, parent_edge: EdgeId, tree: Tree) -> Capacity {
        match tree {
            Tree::Source => self.network.remaining_capacity(parent_edge),
            Tree::Sink => self
                .network
                .remaining_capacity(self.network.residual(parent_edge)),
            Tree::Free => 0,
        }
    }

    /// 生长阶段，返回连接两棵树的边（方向 S -> T）
    fn grow(&mut self) -> Option<EdgeId> {
        while let Some(&a) = self.active_queue.front() {
            if !self.active[a] {
                self.active_queue.pop_front();
                continue;
            }

            let tree = self.tree[a];
            let network = &self.network;
            for &e in network.outgoing(a) {
                // T 树沿入边生长：e 的反向边为 q -> a
                let flow_edge = match tree {
                    Tree::Sink => network.residual(e),
                    _ => e,
                };
                if network.remaining_capacity(flow_edge) <= 0 {
                    continue;
                }

                let q = network.edge(e).to();
                match self.tree[q] {
                    Tree::Free => {
                        self.tree[q] = tree;
                        self.parent[q] = Some(e);
                        if !self.active[q] {
                            self.active[q] = true;
                            self.active_queue.push_back(q);
                        }
                        self.stats.tree_growths += 1;
                    }
                    other if other != tree => return Some(flow_edge),
                    _ => {}
                }
            }

            self.active_queue.pop_front();
            self.active[a] = false;
        }

        None
    }

    /// 从节点沿父边走到树根经过的父边
    fn tree_path(&self, start: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let mut node = start;
        std::iter::from_fn(move || {
            let e = self.parent[node]?;
            node = self.network.edge(e).from();
            Some(e)
        })
    }

    fn path_bottleneck(&self, mid: EdgeId) -> Capacity {
        let edge = self.network.edge(mid);
        let source_side = self
            .tree_path(edge.from())
            .map(|e| self.link_capacity(e, Tree::Source));
        let sink_side = self
            .tree_path(edge.to())
            .map(|e| self.link_capacity(e, Tree::Sink));

        source_side
            .chain(sink_side)
            .fold(edge.remaining_capacity(), Capacity::min)
    }

    /// 沿 S 树路径、中间边、T 树路径增广，饱和的树边产生孤儿
    fn augment(&mut self, mid: EdgeId, amount: Capacity) {
        let (from, to) = {
            let edge = self.network.edge(mid);
            (edge.from(), edge.to())
        };
        let source_path: Vec<EdgeId> = self.tree_path(from).collect();
        let sink_path: Vec<EdgeId> = self.tree_path(to).collect();

        self.network.augment(mid, amount);

        for e in source_path {
            self.network.augment(e, amount);
            if self.network.remaining_capacity(e) == 0 {
                let child = self.network.edge(e).to();
                self.make_orphan(child);
            }
        }

        for e in sink_path {
            let flow_edge = self.network.residual(e);
            self.network.augment(flow_edge, amount);
            if self.network.remaining_capacity(flow_edge) == 0 {
                let child = self.network.edge(e).to();
                self.make_orphan(child);
            }
        }
    }

    /// 处理孤儿队列直到清空
    fn adopt_orphans(&mut self) {
        while let Some(orphan) = self.orphans.pop_front() {
            self.stats.orphans_processed += 1;
            let tree = self.tree[orphan];

            match self.find_parent(orphan, tree) {
                Some(parent_edge) => {
                    self.parent[orphan] = Some(parent_edge);
                    self.activate(orphan);
                    self.stats.adoptions += 1;
                }
                None => self.release(orphan, tree),
            }
        }
    }

    /// 在同一棵树中寻找有效父节点：有指向孤儿的剩余容量，且自身父链通向树根
    fn find_parent(&self, orphan: NodeId, tree: Tree) -> Option<EdgeId> {
        self.network.outgoing(orphan).iter().find_map(|&e| {
            let candidate = self.network.edge(e).to();
            if self.tree[candidate] != tree {
                return None;
            }
            // 父边方向为 candidate -> orphan
            let parent_edge = self.network.residual(e);
            (self.link_capacity(parent_edge, tree) > 0 && self.is_rooted(candidate, tree))
                .then_some(parent_edge)
        })
    }

    /// 沿父链能否到达树根；遇到孤儿（无父边的非根节点）即失败
    fn is_rooted(&self, node: NodeId, tree: Tree) -> bool {
        let root = match tree {
            Tree::Source => self.network.source(),
            Tree::Sink => self.network.sink(),
            Tree::Free => return false,
        };

        let mut current = node;
        for _ in 0..=self.network.node_count() {
            if current == root {
                return true;
            }
            match self.parent[current] {
                Some(e) => current = self.network.edge(e).from(),
                None => return false,
            }
        }
        false
    }

    /// 无法收养：子节点级联为孤儿，可能重新生长过来的邻居重新激活，节点变为自由
    fn release(&mut self, orphan: NodeId, tree: Tree) {
        for i in 0..self.network.outgoing(orphan).len() {
            let e = self.network.outgoing(orphan)[i];
            let neighbor = self.network.edge(e).to();
            if self.tree[neighbor] != tree {
                continue;
            }

            let is_child = self.parent[neighbor]
                .map_or(false, |p| self.network.edge(p).from() == orphan);
            if is_child {
                self.make_orphan(neighbor);
            } else if self.link_capacity(self.network.residual(e), tree) > 0 {
                self.activate(neighbor);
            }
        }

        self.tree[orphan] = Tree::Free;
        self.active[orphan] = false;
        self.stats.nodes_freed += 1;
    }
}

impl MaxFlowSolver for BoykovKolmogorovSolver {
    fn name(&self) -> &'static str {
        "boykov-kolmogorov"
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
