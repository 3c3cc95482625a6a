//! 求解指标收集模块
//!
//! 记录一次求解过程中的增广次数、搜索轮次和孤儿处理情况

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// 单次求解的统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// 增广次数
    pub augmentations: u64,
    /// 搜索轮次（Edmonds-Karp 为 BFS 次数，Boykov-Kolmogorov 为生长阶段次数）
    pub search_passes: u64,
    /// 加入搜索树的节点数
    pub tree_growths: u64,
    /// 处理过的孤儿节点数
    pub orphans_processed: u64,
    /// 成功重新收养的孤儿数
    pub adoptions: u64,
    /// 被释放为自由节点的孤儿数
    pub nodes_freed: u64,
    /// 耗时（微秒）
    pub duration_us: u64,
}

impl SolveStats {
    /// 耗时（毫秒）
    pub fn duration_ms(&self) -> f64 {
        self.duration_us as f64 / 1000.0
    }

    /// 平均每次增广耗时（微秒）
    pub fn avg_augmentation_us(&self) -> f64 {
        if self.augmentations == 0 {
            0.0
        } else {
            self.duration_us as f64 / self.augmentations as f64
        }
    }
}

/// 计时器
#[derive(Debug)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_derived_values() {
        let stats = SolveStats {
            augmentations: 4,
            duration_us: 2000,
            ..Default::default()
        };
        assert_eq!(stats.duration_ms(), 2.0);
        assert_eq!(stats.avg_augmentation_us(), 500.0);
        assert_eq!(SolveStats::default().avg_augmentation_us(), 0.0);
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(2));
        assert!(timer.elapsed_us() >= 2000);
    }
}
