//! 流网络通用类型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 节点 ID（稠密下标，范围 `[0, n)`）
pub type NodeId = usize;

/// 容量 / 流量（非负整数，反向边上的流量可为负）
pub type Capacity = i64;

/// 无穷容量哨兵值，用于硬约束（强制属于源侧或汇侧）
pub const INFINITE_CAPACITY: Capacity = Capacity::MAX;

/// 是否为无穷容量
#[inline]
pub fn is_infinite(capacity: Capacity) -> bool {
    capacity == INFINITE_CAPACITY
}

/// 饱和加法：涉及无穷容量时不会回绕为负数
#[inline]
pub fn saturating_add(a: Capacity, b: Capacity) -> Capacity {
    a.saturating_add(b)
}

/// 饱和减法
#[inline]
pub fn saturating_sub(a: Capacity, b: Capacity) -> Capacity {
    a.saturating_sub(b)
}

/// 求解算法种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// BFS 最短增广路
    EdmondsKarp,
    /// 双搜索树增量算法（适合图像分割）
    #[default]
    BoykovKolmogorov,
}

impl SolverKind {
    /// 简短名称
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::EdmondsKarp => "edmonds-karp",
            SolverKind::BoykovKolmogorov => "boykov-kolmogorov",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ek" | "edmonds-karp" | "edmonds_karp" => Ok(SolverKind::EdmondsKarp),
            "bk" | "boykov-kolmogorov" | "boykov_kolmogorov" => Ok(SolverKind::BoykovKolmogorov),
            other => Err(crate::Error::ParseError(format!("未知的求解算法: {}", other))),
        }
    }
}

/// 解析容量文本，`inf` / `infinite` / `∞` 表示无穷容量
pub fn parse_capacity(s: &str) -> Result<Capacity, crate::Error> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "inf" | "infinite" | "infinity" | "∞" => Ok(INFINITE_CAPACITY),
        _ => s
            .parse::<Capacity>()
            .map_err(|e| crate::Error::ParseError(format!("无效的容量 '{}': {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_arithmetic() {
        assert_eq!(saturating_add(INFINITE_CAPACITY, 10), INFINITE_CAPACITY);
        assert_eq!(saturating_add(3, 4), 7);
        assert_eq!(saturating_sub(0, INFINITE_CAPACITY), -INFINITE_CAPACITY);
        assert!(is_infinite(saturating_add(INFINITE_CAPACITY, INFINITE_CAPACITY)));
    }

    #[test]
    fn test_solver_kind_parse() {
        assert_eq!("bk".parse::<SolverKind>().unwrap(), SolverKind::BoykovKolmogorov);
        assert_eq!("Edmonds-Karp".parse::<SolverKind>().unwrap(), SolverKind::EdmondsKarp);
        assert!("dinic".parse::<SolverKind>().is_err());
        assert_eq!(SolverKind::default(), SolverKind::BoykovKolmogorov);
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity(" 42 ").unwrap(), 42);
        assert_eq!(parse_capacity("INF").unwrap(), INFINITE_CAPACITY);
        assert!(parse_capacity("abc").is_err());
        // 负值在解析层合法，由 add_edge 拒绝
        assert_eq!(parse_capacity("-3").unwrap(), -3);
    }
}
