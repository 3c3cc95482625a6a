//! 图割图像分割
//!
//! 由灰度图像和前景 / 背景种子构造流网络：
//! - 硬约束：前景种子 `source -> p`、背景种子 `p -> sink`，容量为无穷
//! - t-link：其余像素按直方图负对数似然连接两个终端
//! - n-link：四邻域相邻像素按强度差的高斯衰减连接，最小为 1
//!
//! 求解后最小割的源侧即前景。

mod histogram;
mod image;

pub use histogram::HistogramModel;
pub use image::{luminance, GrayImage, PixelSeed};

use crate::algorithm::{SolverOptions, Termination};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::metrics::SolveStats;
use crate::network::FlowNetwork;
use crate::types::{Capacity, SolverKind, INFINITE_CAPACITY};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// 分割参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// n-link 高斯衰减的噪声标准差
    pub noise_sigma: f64,
    /// n-link 最大权重
    pub boundary_scale: f64,
    /// t-link 能量缩放
    pub energy_scale: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            noise_sigma: 30.0,
            boundary_scale: 100.0,
            energy_scale: 100.0,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.noise_sigma > 0.0) {
            return Err(Error::ConfigError(format!(
                "noise_sigma 必须为正: {}",
                self.noise_sigma
            )));
        }
        if !(self.boundary_scale >= 0.0) || !(self.energy_scale >= 0.0) {
            return Err(Error::ConfigError(
                "boundary_scale 与 energy_scale 不能为负".to_string(),
            ));
        }
        Ok(())
    }

    /// 相邻像素之间的边权：`max(1, floor(scale * exp(-diff² / 2σ²)))`
    pub fn boundary_weight(&self, a: u8, b: u8) -> Capacity {
        let diff = (a as f64 - b as f64).abs();
        let falloff = (-(diff * diff) / (2.0 * self.noise_sigma * self.noise_sigma)).exp();
        ((self.boundary_scale * falloff) as Capacity).max(1)
    }
}

/// 分割结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub width: usize,
    pub height: usize,
    /// 前景掩码（与输入栅格同序）
    pub mask: Vec<bool>,
    pub max_flow: Capacity,
    pub termination: Termination,
    pub solver: SolverKind,
    pub stats: SolveStats,
}

impl Segmentation {
    /// 前景像素数
    pub fn foreground_count(&self) -> usize {
        self.mask.iter().filter(|&&b| b).count()
    }

    pub fn is_foreground(&self, row: usize, col: usize) -> bool {
        self.mask[row * self.width + col]
    }

    /// 把前景像素向红色混合 50%，返回 `0xAARRGGBB`
    pub fn tint_foreground(&self, rgb: &[u32]) -> Result<Vec<u32>> {
        if rgb.len() != self.mask.len() {
            return Err(Error::InvalidImage(format!(
                "像素数 {} 与掩码长度 {} 不符",
                rgb.len(),
                self.mask.len()
            )));
        }

        Ok(rgb
            .iter()
            .zip(&self.mask)
            .map(|(&p, &foreground)| {
                if !foreground {
                    return p;
                }
                let r = (((p >> 16) & 0xFF) + 0xFF) / 2;
                let g = ((p >> 8) & 0xFF) / 2;
                let b = (p & 0xFF) / 2;
                0xFF00_0000 | (r << 16) | (g << 8) | b
            })
            .collect())
    }
}

/// 图割分割器
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
    solver: SolverKind,
    options: SolverOptions,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// 从引擎配置创建
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            config: config.segmentation.clone(),
            solver: config.solver,
            options: config.solver_options(),
        }
    }

    /// 设置求解算法
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// 设置求解选项
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// 构造流网络：像素节点 `0..P`，源点 `P`，汇点 `P + 1`
    pub fn build_network(
        &self,
        image: &GrayImage,
        object_seeds: &[PixelSeed],
        background_seeds: &[PixelSeed],
    ) -> Result<FlowNetwork> {
        self.config.validate()?;

        let pixel_count = image.len();
        let source = pixel_count;
        let sink = pixel_count + 1;
        let pixels = image.pixels();

        let object = seed_indices(image, object_seeds)?;
        let background = seed_indices(image, background_seeds)?;

        let mut seeded = vec![false; pixel_count];
        for &i in &object {
            seeded[i] = true;
        }
        if let Some(&i) = background.iter().find(|&&i| seeded[i]) {
            return Err(Error::InvalidSeed(format!(
                "像素 ({}, {}) 同时是前景和背景种子",
                i / image.width(),
                i % image.width()
            )));
        }
        for &i in &background {
            seeded[i] = true;
        }

        let mut histogram = HistogramModel::new(self.config.energy_scale);
        for &i in &object {
            histogram.add_object_seed(pixels[i]);
        }
        for &i in &background {
            histogram.add_background_seed(pixels[i]);
        }

        // 权重并行计算，加边按栅格顺序串行
        let terminal_links: Vec<(Capacity, Capacity)> = pixels
            .par_iter()
            .map(|&v| (histogram.background_energy(v), histogram.object_energy(v)))
            .collect();
        let neighbor_links: Vec<(usize, usize, Capacity)> = (0..pixel_count)
            .into_par_iter()
            .flat_map_iter(|p| {
                image
                    .forward_neighbors(p)
                    .map(move |q| (p, q, self.config.boundary_weight(pixels[p], pixels[q])))
            })
            .collect();

        let logical_edges = object.len() + background.len() + 2 * pixel_count + 2 * neighbor_links.len();
        let mut network =
            FlowNetwork::new(pixel_count + 2, source, sink)?.with_edge_capacity(logical_edges);

        for &i in &object {
            network.add_edge(source, i, INFINITE_CAPACITY)?;
        }
        for &i in &background {
            network.add_edge(i, sink, INFINITE_CAPACITY)?;
        }

        for (p, &(to_source, to_sink)) in terminal_links.iter().enumerate() {
            if seeded[p] {
                continue;
            }
            network.add_edge(source, p, to_source)?;
            network.add_edge(p, sink, to_sink)?;
        }

        for &(p, q, weight) in &neighbor_links {
            network.add_edge(p, q, weight)?;
            network.add_edge(q, p, weight)?;
        }

        debug!(
            pixels = pixel_count,
            edges = network.edge_count(),
            object_seeds = object.len(),
            background_seeds = background.len(),
            "分割网络构造完成"
        );

        Ok(network)
    }

    /// 构造网络、求解并把最小割映射回像素
    pub fn segment(
        &self,
        image: &GrayImage,
        object_seeds: &[PixelSeed],
        background_seeds: &[PixelSeed],
    ) -> Result<Segmentation> {
        let network = self.build_network(image, object_seeds, background_seeds)?;
        let mut solver = self.solver.build(network, self.options);
        let result = solver.solve();

        let mut mask = result.min_cut.clone();
        mask.truncate(image.len());

        let segmentation = Segmentation {
            width: image.width(),
            height: image.height(),
            mask,
            max_flow: result.max_flow,
            termination: result.termination,
            solver: self.solver,
            stats: result.stats.clone(),
        };

        info!(
            solver = %self.solver,
            max_flow = segmentation.max_flow,
            foreground = segmentation.foreground_count(),
            pixels = image.len(),
            "分割完成"
        );

        Ok(segmentation)
    }
}

/// 种子点转为去重后的栅格下标（保持输入顺序）
fn seed_indices(image: &GrayImage, seeds: &[PixelSeed]) -> Result<Vec<usize>> {
    let mut seen = vec![false; image.len()];
    let mut indices = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let i = seed.to_index(image)?;
        if !seen[i] {
            seen[i] = true;
            indices.push(i);
        }
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 左半暗、右半亮的 6x4 图像
    fn two_tone() -> GrayImage {
        let mut pixels = Vec::new();
        for _row in 0..4 {
            for col in 0..6 {
                pixels.push(if col < 3 { 20 } else { 220 });
            }
        }
        GrayImage::new(6, 4, pixels).unwrap()
    }

    #[test]
    fn test_boundary_weight() {
        let config = SegmentationConfig::default();
        assert_eq!(config.boundary_weight(10, 10), 100);
        // exp(-900 / 1800) * 100 = 60.65
        assert_eq!(config.boundary_weight(0, 30), 60);
        assert_eq!(config.boundary_weight(0, 255), 1);
    }

    #[test]
    fn test_network_layout() {
        let image = two_tone();
        let segmenter = Segmenter::default();
        let net = segmenter
            .build_network(&image, &[PixelSeed::new(1, 4)], &[PixelSeed::new(1, 1)])
            .unwrap();

        assert_eq!(net.node_count(), 26);
        assert_eq!(net.source(), 24);
        assert_eq!(net.sink(), 25);

        // 2 条硬约束 + 22 个像素各 2 条 t-link + 38 对相邻像素各 2 条 n-link
        assert_eq!(net.edge_count(), 2 + 22 * 2 + 38 * 2);

        let hard: Vec<_> = net
            .forward_edges()
            .filter(|(_, e)| e.capacity() == INFINITE_CAPACITY)
            .map(|(_, e)| (e.from(), e.to()))
            .collect();
        assert_eq!(hard, vec![(24, 10), (7, 25)]);
    }

    #[test]
    fn test_two_tone_segmentation() {
        let image = two_tone();
        for solver in [SolverKind::EdmondsKarp, SolverKind::BoykovKolmogorov] {
            let result = Segmenter::default()
                .with_solver(solver)
                .segment(&image, &[PixelSeed::new(1, 4)], &[PixelSeed::new(1, 1)])
                .unwrap();

            assert_eq!(result.mask.len(), 24);
            assert_eq!(result.termination, Termination::Exhausted);
            assert_eq!(result.foreground_count(), 12, "{}", solver);
            for row in 0..4 {
                for col in 0..6 {
                    assert_eq!(result.is_foreground(row, col), col >= 3, "{} ({}, {})", solver, row, col);
                }
            }
        }
    }

    #[test]
    fn test_seed_validation() {
        let image = two_tone();
        let segmenter = Segmenter::default();

        let overlap = segmenter.build_network(&image, &[(0, 0).into()], &[(0, 0).into()]);
        assert!(matches!(overlap, Err(Error::InvalidSeed(_))));

        let outside = segmenter.build_network(&image, &[(4, 0).into()], &[]);
        assert!(matches!(outside, Err(Error::InvalidSeed(_))));

        // 重复种子只计一次
        let net = segmenter
            .build_network(&image, &[(0, 0).into(), (0, 0).into()], &[])
            .unwrap();
        assert_eq!(net.edge_count(), 1 + 23 * 2 + 38 * 2);
    }

    #[test]
    fn test_no_seeds_still_solves() {
        let image = two_tone();
        let result = Segmenter::default().segment(&image, &[], &[]).unwrap();
        assert_eq!(result.mask.len(), image.len());
        assert!(result.max_flow > 0);
    }

    #[test]
    fn test_invalid_config() {
        let config = SegmentationConfig {
            noise_sigma: 0.0,
            ..Default::default()
        };
        let err = Segmenter::new(config)
            .build_network(&two_tone(), &[], &[])
            .unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_tint_foreground() {
        let seg = Segmentation {
            width: 2,
            height: 1,
            mask: vec![true, false],
            max_flow: 0,
            termination: Termination::Exhausted,
            solver: SolverKind::BoykovKolmogorov,
            stats: SolveStats::default(),
        };
        let tinted = seg.tint_foreground(&[0x204060, 0x204060]).unwrap();
        assert_eq!(tinted[0], 0xFF8F_2030);
        assert_eq!(tinted[1], 0x204060);
        assert!(seg.tint_foreground(&[0]).is_err());
    }
}
