//! # Config 模块
//!
//! 运行时配置管理，集中管理所有动画时长、音频目录和演示参数。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use seq_runtime::EasingFunction;
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 动画配置
    #[serde(default)]
    pub animation: AnimationConfig,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// headless 演示配置
    #[serde(default)]
    pub demo: DemoConfig,
}

/// 各个 UI 元素的动画参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub loading: LoadingConfig,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub sky: SkyConfig,
}

/// 一条预设通知
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEntry {
    pub name: String,
    pub text: String,
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// 淡入 / 淡出时长（秒）
    #[serde(default = "default_notify_fade")]
    pub fade_duration: f32,

    /// 完全可见的停留时长（秒）
    #[serde(default = "default_notify_hold")]
    pub hold_duration: f32,

    /// 入场 / 退场的垂直位移
    #[serde(default = "default_notify_move")]
    pub vertical_move_distance: f32,

    /// 预设通知列表
    #[serde(default = "default_notifications")]
    pub notifications: Vec<NotificationEntry>,
}

/// 结算窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 显示 / 隐藏动画时长（秒）
    #[serde(default = "default_window_duration")]
    pub duration: f32,

    #[serde(default = "default_show_ease")]
    pub show_ease: EasingFunction,

    #[serde(default = "default_hide_ease")]
    pub hide_ease: EasingFunction,

    /// 内容面板的起始缩放
    #[serde(default = "default_window_start_scale")]
    pub start_scale: f32,
}

/// 按钮点击冲击参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PunchConfig {
    #[serde(default = "default_punch_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_punch_duration")]
    pub duration: f32,
    #[serde(default = "default_punch_vibrato")]
    pub vibrato: u32,
    #[serde(default = "default_punch_elasticity")]
    pub elasticity: f32,
}

/// 菜单配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfig {
    /// 面板切换的淡入淡出时长（秒）
    #[serde(default = "default_panel_fade")]
    pub panel_fade: f32,

    /// 进入主菜单时音乐的淡出时长（秒）
    #[serde(default = "default_enter_music_fade")]
    pub enter_music_fade: f32,

    /// 菜单界面的背景音乐
    #[serde(default = "default_menu_music")]
    pub music: String,

    #[serde(default)]
    pub punch: PunchConfig,
}

/// 加载画面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadingConfig {
    #[serde(default = "default_loading_fade")]
    pub fade_duration: f32,

    /// 停留时长下限（秒）
    #[serde(default = "default_loading_min_hold")]
    pub min_hold: f32,

    /// 停留时长上限（秒）
    #[serde(default = "default_loading_max_hold")]
    pub max_hold: f32,

    /// 依次轮换显示的提示语
    #[serde(default = "default_loading_messages")]
    pub messages: Vec<String>,
}

/// 待机动画配置（标题浮动、开始提示闪烁、灯光闪烁）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleConfig {
    #[serde(default = "default_logo_float_height")]
    pub logo_float_height: f32,

    /// 越大越快，单程时长为 `1 / speed`
    #[serde(default = "default_logo_float_speed")]
    pub logo_float_speed: f32,

    #[serde(default = "default_text_fade_speed")]
    pub text_fade_speed: f32,

    #[serde(default = "default_lamp_min_intensity")]
    pub lamp_min_intensity: f32,
    #[serde(default = "default_lamp_max_intensity")]
    pub lamp_max_intensity: f32,

    /// 外半径相对原始值的倍率范围
    #[serde(default = "default_lamp_min_radius")]
    pub lamp_min_radius: f32,
    #[serde(default = "default_lamp_max_radius")]
    pub lamp_max_radius: f32,

    /// 单次闪烁的时长范围（秒）
    #[serde(default = "default_lamp_min_flicker")]
    pub lamp_min_flicker: f32,
    #[serde(default = "default_lamp_max_flicker")]
    pub lamp_max_flicker: f32,
}

/// 夜空动画配置（星星闪烁与漂移、云朵横向漂移）
///
/// 所有 `min_*` / `max_*` 成对出现，每颗星星、每朵云各自在范围内取值。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyConfig {
    /// 闪烁时星星放大到的倍率范围
    #[serde(default = "default_glimmer_min_scale")]
    pub glimmer_min_scale: f32,
    #[serde(default = "default_glimmer_max_scale")]
    pub glimmer_max_scale: f32,

    /// 单程闪烁时长范围（秒）
    #[serde(default = "default_glimmer_min_duration")]
    pub glimmer_min_duration: f32,
    #[serde(default = "default_glimmer_max_duration")]
    pub glimmer_max_duration: f32,

    /// 闪烁时淡到的透明度范围
    #[serde(default = "default_glimmer_min_alpha")]
    pub glimmer_min_alpha: f32,
    #[serde(default = "default_glimmer_max_alpha")]
    pub glimmer_max_alpha: f32,

    /// 星星偏离原位的距离范围
    #[serde(default = "default_star_min_drift")]
    pub star_min_drift: f32,
    #[serde(default = "default_star_max_drift")]
    pub star_max_drift: f32,

    #[serde(default = "default_star_min_drift_duration")]
    pub star_min_drift_duration: f32,
    #[serde(default = "default_star_max_drift_duration")]
    pub star_max_drift_duration: f32,

    /// 云朵向右漂移的距离
    #[serde(default = "default_cloud_drift_distance")]
    pub cloud_drift_distance: f32,

    #[serde(default = "default_cloud_min_drift_duration")]
    pub cloud_min_drift_duration: f32,
    #[serde(default = "default_cloud_max_drift_duration")]
    pub cloud_max_drift_duration: f32,
}

/// 一条音频目录项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundEntry {
    pub name: String,
    pub clip: String,
}

/// 音频配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// 切换音乐时旧曲目的淡出时长，新曲目以同样时长淡入（秒）
    #[serde(default = "default_crossfade")]
    pub crossfade_duration: f32,

    /// `stop_music` 未指定时长时的淡出时长（秒）
    #[serde(default = "default_stop_fade")]
    pub stop_fade_duration: f32,

    /// 用户设置缺失时的音乐音量 (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub default_music_volume: f32,

    /// 用户设置缺失时的音效音量 (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub default_sfx_volume: f32,

    /// 用户设置文件
    #[serde(default = "default_settings_path")]
    pub settings_path: PathBuf,

    #[serde(default = "default_music")]
    pub music: Vec<SoundEntry>,

    #[serde(default = "default_sfx")]
    pub sfx: Vec<SoundEntry>,
}

/// headless 演示配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    /// 固定帧率
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// 演示总时长（秒）
    #[serde(default = "default_demo_seconds")]
    pub seconds: f32,
}

// 默认值函数
fn default_notify_fade() -> f32 {
    0.4
}

fn default_notify_hold() -> f32 {
    1.5
}

fn default_notify_move() -> f32 {
    50.0
}

fn default_notifications() -> Vec<NotificationEntry> {
    [
        ("Jump", "按空格键跳跃"),
        ("Sleep", "找个舒服的地方睡一觉吧"),
        ("Saved", "进度已保存"),
    ]
    .into_iter()
    .map(|(name, text)| NotificationEntry {
        name: name.to_string(),
        text: text.to_string(),
    })
    .collect()
}

fn default_window_duration() -> f32 {
    0.3
}

fn default_show_ease() -> EasingFunction {
    EasingFunction::OutBack
}

fn default_hide_ease() -> EasingFunction {
    EasingFunction::InCubic
}

fn default_window_start_scale() -> f32 {
    0.9
}

fn default_punch_amplitude() -> f32 {
    0.15
}

fn default_punch_duration() -> f32 {
    0.3
}

fn default_punch_vibrato() -> u32 {
    5
}

fn default_punch_elasticity() -> f32 {
    1.0
}

fn default_panel_fade() -> f32 {
    0.25
}

fn default_enter_music_fade() -> f32 {
    3.0
}

fn default_menu_music() -> String {
    "Waltz In C".to_string()
}

fn default_loading_fade() -> f32 {
    0.5
}

fn default_loading_min_hold() -> f32 {
    5.0
}

fn default_loading_max_hold() -> f32 {
    7.0
}

fn default_loading_messages() -> Vec<String> {
    vec![
        "正在铺床...".to_string(),
        "正在数羊...".to_string(),
        "正在关灯...".to_string(),
    ]
}

fn default_logo_float_height() -> f32 {
    30.0
}

fn default_logo_float_speed() -> f32 {
    1.0
}

fn default_text_fade_speed() -> f32 {
    0.8
}

fn default_lamp_min_intensity() -> f32 {
    0.8
}

fn default_lamp_max_intensity() -> f32 {
    1.2
}

fn default_lamp_min_radius() -> f32 {
    0.95
}

fn default_lamp_max_radius() -> f32 {
    1.05
}

fn default_lamp_min_flicker() -> f32 {
    0.05
}

fn default_lamp_max_flicker() -> f32 {
    0.2
}

fn default_glimmer_min_scale() -> f32 {
    1.1
}

fn default_glimmer_max_scale() -> f32 {
    1.5
}

fn default_glimmer_min_duration() -> f32 {
    1.0
}

fn default_glimmer_max_duration() -> f32 {
    3.0
}

fn default_glimmer_min_alpha() -> f32 {
    0.4
}

fn default_glimmer_max_alpha() -> f32 {
    1.0
}

fn default_star_min_drift() -> f32 {
    0.2
}

fn default_star_max_drift() -> f32 {
    0.8
}

fn default_star_min_drift_duration() -> f32 {
    5.0
}

fn default_star_max_drift_duration() -> f32 {
    10.0
}

fn default_cloud_drift_distance() -> f32 {
    2.0
}

fn default_cloud_min_drift_duration() -> f32 {
    20.0
}

fn default_cloud_max_drift_duration() -> f32 {
    40.0
}

fn default_crossfade() -> f32 {
    1.0
}

fn default_stop_fade() -> f32 {
    1.0
}

fn default_volume() -> f32 {
    1.0
}

fn default_settings_path() -> PathBuf {
    PathBuf::from("settings.json")
}

fn sound_entries(entries: &[(&str, &str)]) -> Vec<SoundEntry> {
    entries
        .iter()
        .map(|(name, clip)| SoundEntry {
            name: name.to_string(),
            clip: clip.to_string(),
        })
        .collect()
}

fn default_music() -> Vec<SoundEntry> {
    sound_entries(&[
        ("Theme", "music/theme.ogg"),
        ("Waltz In C", "music/waltz_in_c.ogg"),
    ])
}

fn default_sfx() -> Vec<SoundEntry> {
    sound_entries(&[
        ("Notification", "sfx/notification.wav"),
        ("Button Click", "sfx/button_click.wav"),
        ("Win", "sfx/win.wav"),
    ])
}

fn default_fps() -> u32 {
    60
}

fn default_demo_seconds() -> f32 {
    20.0
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            fade_duration: default_notify_fade(),
            hold_duration: default_notify_hold(),
            vertical_move_distance: default_notify_move(),
            notifications: default_notifications(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            duration: default_window_duration(),
            show_ease: default_show_ease(),
            hide_ease: default_hide_ease(),
            start_scale: default_window_start_scale(),
        }
    }
}

impl Default for PunchConfig {
    fn default() -> Self {
        Self {
            amplitude: default_punch_amplitude(),
            duration: default_punch_duration(),
            vibrato: default_punch_vibrato(),
            elasticity: default_punch_elasticity(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            panel_fade: default_panel_fade(),
            enter_music_fade: default_enter_music_fade(),
            music: default_menu_music(),
            punch: PunchConfig::default(),
        }
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            fade_duration: default_loading_fade(),
            min_hold: default_loading_min_hold(),
            max_hold: default_loading_max_hold(),
            messages: default_loading_messages(),
        }
    }
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            logo_float_height: default_logo_float_height(),
            logo_float_speed: default_logo_float_speed(),
            text_fade_speed: default_text_fade_speed(),
            lamp_min_intensity: default_lamp_min_intensity(),
            lamp_max_intensity: default_lamp_max_intensity(),
            lamp_min_radius: default_lamp_min_radius(),
            lamp_max_radius: default_lamp_max_radius(),
            lamp_min_flicker: default_lamp_min_flicker(),
            lamp_max_flicker: default_lamp_max_flicker(),
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            glimmer_min_scale: default_glimmer_min_scale(),
            glimmer_max_scale: default_glimmer_max_scale(),
            glimmer_min_duration: default_glimmer_min_duration(),
            glimmer_max_duration: default_glimmer_max_duration(),
            glimmer_min_alpha: default_glimmer_min_alpha(),
            glimmer_max_alpha: default_glimmer_max_alpha(),
            star_min_drift: default_star_min_drift(),
            star_max_drift: default_star_max_drift(),
            star_min_drift_duration: default_star_min_drift_duration(),
            star_max_drift_duration: default_star_max_drift_duration(),
            cloud_drift_distance: default_cloud_drift_distance(),
            cloud_min_drift_duration: default_cloud_min_drift_duration(),
            cloud_max_drift_duration: default_cloud_max_drift_duration(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            crossfade_duration: default_crossfade(),
            stop_fade_duration: default_stop_fade(),
            default_music_volume: default_volume(),
            default_sfx_volume: default_volume(),
            settings_path: default_settings_path(),
            music: default_music(),
            sfx: default_sfx(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            seconds: default_demo_seconds(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let notify = &self.animation.notify;
        let window = &self.animation.window;
        let menu = &self.animation.menu;
        let loading = &self.animation.loading;
        let idle = &self.animation.idle;
        let sky = &self.animation.sky;

        let durations = [
            ("animation.notify.fade_duration", notify.fade_duration),
            ("animation.notify.hold_duration", notify.hold_duration),
            ("animation.window.duration", window.duration),
            ("animation.menu.panel_fade", menu.panel_fade),
            ("animation.menu.enter_music_fade", menu.enter_music_fade),
            ("animation.menu.punch.duration", menu.punch.duration),
            ("animation.loading.fade_duration", loading.fade_duration),
            ("animation.loading.min_hold", loading.min_hold),
            ("animation.loading.max_hold", loading.max_hold),
            ("animation.idle.lamp_min_flicker", idle.lamp_min_flicker),
            ("animation.idle.lamp_max_flicker", idle.lamp_max_flicker),
            ("animation.sky.star_min_drift", sky.star_min_drift),
            ("animation.sky.star_max_drift", sky.star_max_drift),
            ("audio.crossfade_duration", self.audio.crossfade_duration),
            ("audio.stop_fade_duration", self.audio.stop_fade_duration),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} 必须是非负的有限值: {}",
                    name, value
                )));
            }
        }

        let finite = [
            ("animation.notify.vertical_move_distance", notify.vertical_move_distance),
            ("animation.window.start_scale", window.start_scale),
            ("animation.menu.punch.amplitude", menu.punch.amplitude),
            ("animation.menu.punch.elasticity", menu.punch.elasticity),
            ("animation.idle.logo_float_height", idle.logo_float_height),
            ("animation.sky.glimmer_min_scale", sky.glimmer_min_scale),
            ("animation.sky.glimmer_max_scale", sky.glimmer_max_scale),
            ("animation.sky.cloud_drift_distance", sky.cloud_drift_distance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} 必须是有限值: {}",
                    name, value
                )));
            }
        }

        if !(idle.logo_float_speed > 0.0 && idle.text_fade_speed > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "待机动画速度必须大于 0".to_string(),
            ));
        }

        // 往返循环的单程时长为 0 时每帧只能跑一轮，没有意义
        let cycles = [
            ("animation.sky.glimmer_min_duration", sky.glimmer_min_duration),
            ("animation.sky.star_min_drift_duration", sky.star_min_drift_duration),
            ("animation.sky.cloud_min_drift_duration", sky.cloud_min_drift_duration),
        ];
        for (name, value) in cycles {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} 必须大于 0: {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&sky.glimmer_min_alpha)
            || !(0.0..=1.0).contains(&sky.glimmer_max_alpha)
        {
            return Err(ConfigError::ValidationFailed(
                "星星透明度必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        let ranges = [
            ("animation.loading.*_hold", loading.min_hold, loading.max_hold),
            (
                "animation.idle.lamp_*_intensity",
                idle.lamp_min_intensity,
                idle.lamp_max_intensity,
            ),
            ("animation.idle.lamp_*_radius", idle.lamp_min_radius, idle.lamp_max_radius),
            (
                "animation.idle.lamp_*_flicker",
                idle.lamp_min_flicker,
                idle.lamp_max_flicker,
            ),
            ("animation.sky.glimmer_*_scale", sky.glimmer_min_scale, sky.glimmer_max_scale),
            (
                "animation.sky.glimmer_*_duration",
                sky.glimmer_min_duration,
                sky.glimmer_max_duration,
            ),
            ("animation.sky.glimmer_*_alpha", sky.glimmer_min_alpha, sky.glimmer_max_alpha),
            ("animation.sky.star_*_drift", sky.star_min_drift, sky.star_max_drift),
            (
                "animation.sky.star_*_drift_duration",
                sky.star_min_drift_duration,
                sky.star_max_drift_duration,
            ),
            (
                "animation.sky.cloud_*_drift_duration",
                sky.cloud_min_drift_duration,
                sky.cloud_max_drift_duration,
            ),
        ];
        for (name, min, max) in ranges {
            if !(min <= max) {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} 下限 {} 大于上限 {}",
                    name, min, max
                )));
            }
        }

        // 检查音量范围
        if !(0.0..=1.0).contains(&self.audio.default_music_volume) {
            return Err(ConfigError::ValidationFailed(
                "音乐音量必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.audio.default_sfx_volume) {
            return Err(ConfigError::ValidationFailed(
                "音效音量必须在 0.0 - 1.0 之间".to_string(),
            ));
        }

        if self.demo.fps == 0 {
            return Err(ConfigError::ValidationFailed("帧率必须大于 0".to_string()));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
