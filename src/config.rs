//! 引擎配置
//!
//! 从 JSON 文件加载，缺省字段使用默认值

use crate::algorithm::SolverOptions;
use crate::error::{Error, Result};
use crate::segmentation::SegmentationConfig;
use crate::types::SolverKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 引擎配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 求解算法
    pub solver: SolverKind,
    /// 增广次数上限
    pub max_augmentations: Option<u64>,
    /// 分割参数
    pub segmentation: SegmentationConfig,
}

impl EngineConfig {
    /// 从 JSON 文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.segmentation.validate()?;
        Ok(config)
    }

    /// 保存为 JSON 文件
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// 求解选项
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            max_augmentations: self.max_augmentations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"solver": "edmonds_karp", "segmentation": {{"noise_sigma": 12.5}}}}"#).unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.solver, SolverKind::EdmondsKarp);
        assert_eq!(config.max_augmentations, None);
        assert_eq!(config.segmentation.noise_sigma, 12.5);
        assert_eq!(config.segmentation.boundary_scale, 100.0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowcut.json");

        let config = EngineConfig {
            max_augmentations: Some(500),
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = EngineConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.solver_options().max_augmentations, Some(500));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"solver": "dinic"}}"#).unwrap();
        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(Error::ConfigError(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"segmentation": {{"noise_sigma": -1.0}}}}"#).unwrap();
        assert!(matches!(
            EngineConfig::from_file(file.path()),
            Err(Error::ConfigError(_))
        ));
    }
}
