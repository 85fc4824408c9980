//! # Host 层
//!
//! 游戏 UI 动画的宿主层实现，驱动 `seq-runtime` 调度器。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 持有可动画的视图状态（UI 节点、音乐通道、灯光、星空）
//! - 把游戏中的动画调用点绑定到调度器上
//! - 读写配置与用户设置
//! - 以固定帧率推进调度器
//!
//! 真正的渲染和混音在 Host 之外完成，Host 只维护它们读取的状态。

pub mod app;
pub mod bindings;
pub mod config;
pub mod settings;

pub use app::{App, DemoAction, DemoReport, DemoStep, PLAY_BUTTON, default_script, run_demo};
pub use bindings::{
    AudioBackend, AudioChannel, AudioManager, IdleAnimator, Lamp, LampFlicker, LoadingManager,
    LogBackend, MenuManager, NotifyManager, RecordingBackend, SitSpot, SkyDriver, SoundCall,
    UiNode, WinUIAnimator,
};
pub use config::{
    AnimationConfig, AppConfig, AudioConfig, ConfigError, DemoConfig, IdleConfig, LoadingConfig,
    MenuConfig, NotifyConfig, SkyConfig, WindowConfig,
};
pub use settings::{JsonSettingsStore, MemorySettingsStore, SettingsError, SettingsStore};
