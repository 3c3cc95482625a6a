//! 最大流 / 最小割算法模块
//!
//! 包含 Edmonds-Karp 与 Boykov-Kolmogorov 两种可互换的求解器，
//! 以及二者共用的最小割提取

mod boykov_kolmogorov;
mod edmonds_karp;
pub mod min_cut;

pub use boykov_kolmogorov::BoykovKolmogorovSolver;
pub use edmonds_karp::EdmondsKarpSolver;
pub use min_cut::{cut_capacity, cut_edges, residual_reachable, verify};

use crate::metrics::SolveStats;
use crate::network::FlowNetwork;
use crate::types::{Capacity, SolverKind};
use serde::{Deserialize, Serialize};

/// 求解器状态：`Idle -> Running -> Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverState {
    Idle,
    Running,
    Done,
}

/// 求解结束原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// 不存在增广路，已得到最大流
    Exhausted,
    /// 找到一条全部由无穷容量边组成的路径，未施加增广
    UnboundedPath,
    /// 达到调用方设置的增广次数上限
    IterationLimit,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Exhausted => "exhausted",
            Termination::UnboundedPath => "unbounded-path",
            Termination::IterationLimit => "iteration-limit",
        }
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 求解结果（一次计算，之后只读）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowResult {
    /// 最大流量值
    pub max_flow: Capacity,
    /// 最小割源侧掩码（`true` 表示从源点可达）
    pub min_cut: Vec<bool>,
    /// 结束原因
    pub termination: Termination,
    /// 统计信息
    pub stats: SolveStats,
}

impl FlowResult {
    pub(crate) fn empty(node_count: usize) -> Self {
        Self {
            max_flow: 0,
            min_cut: vec![false; node_count],
            termination: Termination::Exhausted,
            stats: SolveStats::default(),
        }
    }

    /// 源侧节点数
    pub fn source_side_count(&self) -> usize {
        self.min_cut.iter().filter(|&&b| b).count()
    }

    /// 是否为完整求解（非提前终止）
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Exhausted
    }
}

/// 求解选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// 增广次数上限，`None` 表示不限制
    pub max_augmentations: Option<u64>,
}

impl SolverOptions {
    pub fn with_max_augmentations(mut self, limit: u64) -> Self {
        self.max_augmentations = Some(limit);
        self
    }

    pub(crate) fn limit_reached(&self, augmentations: u64) -> bool {
        self.max_augmentations
            .map_or(false, |limit| augmentations >= limit)
    }
}

/// 最大流求解器
///
/// 求解器独占网络；首次 `solve` 计算并缓存结果，之后的调用直接返回缓存。
pub trait MaxFlowSolver {
    /// 算法名称
    fn name(&self) -> &'static str;

    /// 当前状态
    fn state(&self) -> SolverState;

    /// 底层网络（求解后包含最终流量）
    fn network(&self) -> &FlowNetwork;

    /// 求解并返回结果
    fn solve(&mut self) -> &FlowResult;

    /// 最大流量值
    fn max_flow(&mut self) -> Capacity {
        self.solve().max_flow
    }

    /// 最小割源侧掩码
    fn min_cut(&mut self) -> &[bool] {
        &self.solve().min_cut
    }
}

impl SolverKind {
    /// 用给定网络构造求解器
    pub fn build(self, network: FlowNetwork, options: SolverOptions) -> Box<dyn MaxFlowSolver> {
        match self {
            SolverKind::EdmondsKarp => Box::new(EdmondsKarpSolver::with_options(network, options)),
            SolverKind::BoykovKolmogorov => {
                Box::new(BoykovKolmogorovSolver::with_options(network, options))
            }
        }
    }
}
