//! # Audio 模块
//!
//! 音乐与音效管理。
//!
//! ## 功能特性
//!
//! - 音乐切换：旧曲目淡出、换曲、新曲目淡入到用户音量（`music:1` 上的交叉淡出）
//! - 音乐停止：淡出后停止，并恢复用户音量
//! - 音效播放：转发给注入的 [`AudioBackend`]
//! - 音量设置：限制在 `[0, 1]`，通过 [`SettingsStore`] 持久化
//!
//! 解码与混音不在这里；[`AudioChannel`] 只记录一个混音器需要读取的状态。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use seq_runtime::{InterruptPolicy, ResourceId, Scheduler, SequenceBuilder, Tween};
use tracing::{debug, info, warn};

use super::music_layer;
use super::view::AudioChannel;
use crate::config::{AudioConfig, SoundEntry};
use crate::settings::{MUSIC_VOLUME_KEY, SFX_VOLUME_KEY, SettingsStore};

/// 停止序列的身份键（曲目名不会带括号）
const STOP_KEY: &str = "(stop)";

/// 音频输出后端
///
/// 方法接受 `&self`：后端会被序列回调共享持有。
pub trait AudioBackend {
    /// 音乐通道换上新片段
    fn music_started(&self, clip: &str, volume: f32);

    /// 音乐通道停止
    fn music_stopped(&self);

    /// 播放一次性音效
    fn play_one_shot(&self, clip: &str, volume: f32);
}

/// 后端收到的一次调用
#[derive(Debug, Clone, PartialEq)]
pub enum SoundCall {
    MusicStarted { clip: String, volume: f32 },
    MusicStopped,
    OneShot { clip: String, volume: f32 },
}

/// 记录所有调用的后端（测试 / headless 使用）
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: RefCell<Vec<SoundCall>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SoundCall> {
        self.calls.borrow().clone()
    }

    /// 播放过的音效片段
    pub fn one_shots(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SoundCall::OneShot { clip, .. } => Some(clip.clone()),
                _ => None,
            })
            .collect()
    }
}

impl AudioBackend for RecordingBackend {
    fn music_started(&self, clip: &str, volume: f32) {
        self.calls.borrow_mut().push(SoundCall::MusicStarted {
            clip: clip.to_string(),
            volume,
        });
    }

    fn music_stopped(&self) {
        self.calls.borrow_mut().push(SoundCall::MusicStopped);
    }

    fn play_one_shot(&self, clip: &str, volume: f32) {
        self.calls.borrow_mut().push(SoundCall::OneShot {
            clip: clip.to_string(),
            volume,
        });
    }
}

/// 只输出日志的后端
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn music_started(&self, clip: &str, volume: f32) {
        info!(clip = clip, volume = volume, "开始播放音乐");
    }

    fn music_stopped(&self) {
        info!("音乐已停止");
    }

    fn play_one_shot(&self, clip: &str, volume: f32) {
        info!(clip = clip, volume = volume, "播放音效");
    }
}

/// 音频管理器
pub struct AudioManager {
    /// 音乐目录（名称 -> 片段）
    music: HashMap<String, String>,
    /// 音效目录（名称 -> 片段）
    sfx: HashMap<String, String>,
    /// 音乐通道
    channel: AudioChannel,
    /// 音乐通道所在资源
    resource: ResourceId,
    sfx_volume: f32,
    backend: Rc<dyn AudioBackend>,
    settings: Box<dyn SettingsStore>,
    /// 切换音乐使用的策略
    crossfade: InterruptPolicy,
    crossfade_duration: f32,
    stop_fade_duration: f32,
    default_music_volume: f32,
}

impl AudioManager {
    /// 创建音频管理器，并从设置中读取音量
    pub fn new(
        config: &AudioConfig,
        backend: Rc<dyn AudioBackend>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        let music_volume = settings.get_float(MUSIC_VOLUME_KEY, config.default_music_volume);
        let sfx_volume = settings.get_float(SFX_VOLUME_KEY, config.default_sfx_volume);

        Self {
            music: build_catalog(&config.music, "music"),
            sfx: build_catalog(&config.sfx, "sfx"),
            channel: AudioChannel::new(music_volume),
            resource: music_layer(1),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            backend,
            settings,
            crossfade: InterruptPolicy::crossfade(config.crossfade_duration),
            crossfade_duration: config.crossfade_duration,
            stop_fade_duration: config.stop_fade_duration,
            default_music_volume: config.default_music_volume,
        }
    }

    /// 播放音乐
    ///
    /// 有曲目在响时先淡出，再换曲并淡入到用户音量。
    /// 曲目不存在时只记录警告。
    pub fn play_music(&mut self, scheduler: &mut Scheduler, name: &str) -> bool {
        let Some(clip) = self.music.get(name).cloned() else {
            warn!(name = name, "音乐不存在");
            return false;
        };

        let volume = self.music_volume();
        let channel = self.channel.clone();
        let backend = self.backend.clone();
        let spec = SequenceBuilder::new()
            .append_callback(move || {
                channel.set_volume(0.0);
                channel.play(clip.as_str());
                backend.music_started(&clip, volume);
                Ok(())
            })
            .append_tween(Tween::between(
                self.channel.binding("volume"),
                0.0,
                volume,
                self.crossfade_duration,
            ))
            .into_spec()
            .with_key(name)
            .with_audible(self.channel.binding("level"));

        match scheduler.play_with(&self.resource, spec, &self.crossfade) {
            Ok(outcome) => {
                debug!(name = name, ?outcome, "切换音乐");
                !outcome.is_rejected()
            }
            Err(e) => {
                warn!(name = name, error = %e, "切换音乐失败");
                false
            }
        }
    }

    /// 淡出并停止音乐
    ///
    /// `fade` 为 `None` 时使用配置的默认时长；没有音乐在播放时什么也不做。
    pub fn stop_music(&mut self, scheduler: &mut Scheduler, fade: Option<f32>) -> bool {
        if !self.channel.is_playing() {
            return false;
        }

        let restore = self.music_volume();
        let channel = self.channel.clone();
        let backend = self.backend.clone();
        let spec = SequenceBuilder::new()
            .append_tween(Tween::to(
                self.channel.binding("volume"),
                0.0,
                fade.unwrap_or(self.stop_fade_duration),
            ))
            .append_callback(move || {
                channel.stop();
                channel.set_volume(restore);
                backend.music_stopped();
                Ok(())
            })
            .into_spec()
            .with_key(STOP_KEY);

        match scheduler.play_with(&self.resource, spec, &InterruptPolicy::ReplaceAlways) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "停止音乐失败");
                false
            }
        }
    }

    /// 播放音效
    pub fn play_sfx(&self, name: &str) -> bool {
        let Some(clip) = self.sfx.get(name) else {
            warn!(name = name, "音效不存在");
            return false;
        };
        self.backend.play_one_shot(clip, self.sfx_volume);
        true
    }

    /// 设置音乐音量
    ///
    /// 进行中的停止淡出被取消，音乐继续以新音量播放；
    /// 进行中的换曲会直接跑完（完成换曲），再应用新音量。
    pub fn set_music_volume(&mut self, scheduler: &mut Scheduler, volume: f32) {
        if !volume.is_finite() {
            warn!(volume = volume, "忽略无效的音乐音量");
            return;
        }
        let resource = self.resource.as_str();
        if scheduler.active_key(resource) == Some(STOP_KEY) {
            debug!("调整音量，取消停止淡出");
            scheduler.cancel(resource);
        } else {
            scheduler.complete(resource);
        }

        let volume = volume.clamp(0.0, 1.0);
        self.channel.set_volume(volume);
        self.settings.set_float(MUSIC_VOLUME_KEY, volume);
        self.persist();
    }

    /// 设置音效音量
    pub fn set_sfx_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            warn!(volume = volume, "忽略无效的音效音量");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.sfx_volume = volume;
        self.settings.set_float(SFX_VOLUME_KEY, volume);
        self.persist();
    }

    /// 用户设置中的音乐音量
    pub fn music_volume(&self) -> f32 {
        self.settings
            .get_float(MUSIC_VOLUME_KEY, self.default_music_volume)
            .clamp(0.0, 1.0)
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx_volume
    }

    /// 音乐通道
    pub fn channel(&self) -> &AudioChannel {
        &self.channel
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    fn persist(&mut self) {
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "保存用户设置失败");
        }
    }
}

/// 构建名称索引，重名时保留第一个
fn build_catalog(entries: &[SoundEntry], kind: &str) -> HashMap<String, String> {
    let mut catalog = HashMap::new();
    for entry in entries {
        if catalog.contains_key(&entry.name) {
            warn!(kind = kind, name = %entry.name, "音频目录中存在重名条目");
            continue;
        }
        catalog.insert(entry.name.clone(), entry.clip.clone());
    }
    catalog
}
