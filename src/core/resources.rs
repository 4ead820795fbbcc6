use bevy::prelude::*;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// 默认配置文件路径
pub const CONFIG_PATH: &str = "config/bundles.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// 全局配置（启动时从 TOML 读取一次）
#[derive(Resource, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct BundleConfig {
    /// 创造模式：清空收纳袋时溢出的物品不会掉落
    pub creative: bool,
    pub backpack_capacity: usize,
    /// 带有这些标签的物品不能放进收纳袋
    pub ignored_tags: Vec<String>,
    pub items_path: String,
    /// 固定种子，方便复现 tooltip 的排列
    pub tooltip_seed: Option<u64>,
    pub screen_width: i32,
    pub screen_height: i32,
    /// 0 = 不限制
    pub max_tooltip_width: i32,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            creative: false,
            backpack_capacity: 30,
            ignored_tags: vec!["bundle_ignored".into()],
            items_path: "data/items.ron".into(),
            tooltip_seed: None,
            screen_width: 427,
            screen_height: 240,
            max_tooltip_width: 0,
        }
    }
}

impl BundleConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 文件不存在时直接用默认值；文件存在但解析失败才算错误
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        use anyhow::Context;

        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path).with_context(|| format!("loading {}", path.display()))
    }
}
