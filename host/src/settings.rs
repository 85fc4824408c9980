//! # Settings 模块
//!
//! 用户设置的键值存储（音乐 / 音效音量）。
//!
//! 存储方式通过 [`SettingsStore`] 注入：发布版使用 JSON 文件，测试使用内存存储。

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// 音乐音量键
pub const MUSIC_VOLUME_KEY: &str = "MusicVolume";
/// 音效音量键
pub const SFX_VOLUME_KEY: &str = "SfxVolume";

/// 设置存储错误
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("设置文件读写失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("设置序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 键值设置存储
pub trait SettingsStore {
    /// 读取浮点值，不存在时返回 `default`
    fn get_float(&self, key: &str, default: f32) -> f32;

    fn set_float(&mut self, key: &str, value: f32);

    /// 持久化所有修改
    fn save(&mut self) -> Result<(), SettingsError>;
}

/// JSON 文件设置存储
///
/// 文件内容是 `{ "MusicVolume": 0.8, ... }` 形式的扁平对象。
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
    values: BTreeMap<String, f32>,
}

impl JsonSettingsStore {
    /// 从文件加载设置，文件不存在或损坏时从空设置开始
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, path = ?path, "解析用户设置失败，使用默认值");
                BTreeMap::new()
            }),
            Err(_) => {
                debug!(path = ?path, "用户设置文件不存在，使用默认值");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// 内存设置存储
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: BTreeMap<String, f32>,
    /// `save` 被调用的次数
    saves: usize,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: f32) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_float(&self, key: &str, default: f32) -> f32 {
        self.values.get(key).copied().unwrap_or(default)
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> Result<(), SettingsError> {
        self.saves += 1;
        Ok(())
    }
}
