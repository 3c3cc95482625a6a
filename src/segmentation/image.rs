//! 灰度图像与种子点

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 灰度图像（按行存储的 8 位强度）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrayImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayImage {
    /// 由强度数组创建
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImage(format!(
                "图像尺寸必须为正: {}x{}",
                width, height
            )));
        }
        let expected = width.checked_mul(height).ok_or_else(|| {
            Error::InvalidImage(format!("图像尺寸溢出: {}x{}", width, height))
        })?;
        if pixels.len() != expected {
            return Err(Error::InvalidImage(format!(
                "像素数 {} 与尺寸 {}x{} 不符",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// 由 `0xRRGGBB` 打包的彩色像素创建，按亮度公式转为灰度
    pub fn from_rgb(width: usize, height: usize, rgb: &[u32]) -> Result<Self> {
        let pixels = rgb.iter().map(|&p| luminance(p)).collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 像素总数
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// 栅格下标：`row * width + col`
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// 读取强度
    #[inline]
    pub fn intensity(&self, row: usize, col: usize) -> u8 {
        self.pixels[self.index(row, col)]
    }

    /// 四邻域中右侧与下方的邻居（每对相邻像素只出现一次）
    pub(crate) fn forward_neighbors(&self, index: usize) -> impl Iterator<Item = usize> {
        let (row, col) = (index / self.width, index % self.width);
        let right = (col + 1 < self.width).then_some(index + 1);
        let down = (row + 1 < self.height).then_some(index + self.width);
        right.into_iter().chain(down)
    }
}

/// 亮度：`0.299 r + 0.587 g + 0.114 b`，向下取整
pub fn luminance(rgb: u32) -> u8 {
    let r = (rgb >> 16) & 0xFF;
    let g = (rgb >> 8) & 0xFF;
    let b = rgb & 0xFF;
    // 千分比整数运算，结果即精确值向下取整
    ((299 * r + 587 * g + 114 * b) / 1000) as u8
}

/// 用户选定的种子像素
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSeed {
    pub row: usize,
    pub col: usize,
}

impl PixelSeed {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// 转为栅格下标，越界时报错
    pub fn to_index(&self, image: &GrayImage) -> Result<usize> {
        if self.row >= image.height() || self.col >= image.width() {
            return Err(Error::InvalidSeed(format!(
                "种子点 ({}, {}) 超出图像范围 {}x{}",
                self.row,
                self.col,
                image.width(),
                image.height()
            )));
        }
        Ok(image.index(self.row, self.col))
    }
}

impl From<(usize, usize)> for PixelSeed {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}
