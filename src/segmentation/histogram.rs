//! 强度直方图模型
//!
//! 由前景 / 背景种子拟合两个拉普拉斯平滑的强度分布，
//! 用负对数似然给出每个像素属于前景或背景的代价

use crate::types::Capacity;

const BINS: usize = 256;

/// 前景 / 背景强度直方图
#[derive(Debug, Clone)]
pub struct HistogramModel {
    object: [u32; BINS],
    background: [u32; BINS],
    object_total: u32,
    background_total: u32,
    /// 能量缩放系数
    scale: f64,
}

impl Default for HistogramModel {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl HistogramModel {
    pub fn new(scale: f64) -> Self {
        Self {
            object: [0; BINS],
            background: [0; BINS],
            object_total: 0,
            background_total: 0,
            scale,
        }
    }

    pub fn add_object_seed(&mut self, intensity: u8) {
        self.object[intensity as usize] += 1;
        self.object_total += 1;
    }

    pub fn add_background_seed(&mut self, intensity: u8) {
        self.background[intensity as usize] += 1;
        self.background_total += 1;
    }

    /// P(强度 | 前景) = (count + 1) / (total + 256)
    pub fn object_probability(&self, intensity: u8) -> f64 {
        smoothed(self.object[intensity as usize], self.object_total)
    }

    /// P(强度 | 背景)
    pub fn background_probability(&self, intensity: u8) -> f64 {
        smoothed(self.background[intensity as usize], self.background_total)
    }

    /// 像素标为前景的代价
    pub fn object_energy(&self, intensity: u8) -> Capacity {
        energy(self.object_probability(intensity), self.scale)
    }

    /// 像素标为背景的代价
    pub fn background_energy(&self, intensity: u8) -> Capacity {
        energy(self.background_probability(intensity), self.scale)
    }
}

fn smoothed(count: u32, total: u32) -> f64 {
    (count as f64 + 1.0) / (total as f64 + BINS as f64)
}

fn energy(probability: f64, scale: f64) -> Capacity {
    (-probability.ln() * scale).round().max(0.0) as Capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model_is_uniform() {
        let model = HistogramModel::default();
        assert_eq!(model.object_probability(0), 1.0 / 256.0);
        // -ln(1/256) * 100 = 554.5
        assert_eq!(model.object_energy(17), 555);
        assert_eq!(model.object_energy(17), model.background_energy(200));
    }

    #[test]
    fn test_seeds_lower_energy() {
        let mut model = HistogramModel::default();
        for _ in 0..50 {
            model.add_object_seed(200);
            model.add_background_seed(20);
        }

        assert!(model.object_energy(200) < model.object_energy(20));
        assert!(model.background_energy(20) < model.background_energy(200));
        // (50 + 1) / (50 + 256)
        let p = model.object_probability(200);
        assert!((p - 51.0 / 306.0).abs() < 1e-12);
        assert_eq!(model.object_energy(200), 179);
    }
}
