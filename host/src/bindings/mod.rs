//! # Bindings 模块
//!
//! 游戏中各个动画调用点在调度器上的绑定。
//!
//! 每个绑定持有自己的视图状态，所有调度操作都通过调用方传入的
//! `&mut Scheduler` 完成，没有全局单例。
//!
//! ## 资源划分
//!
//! | 资源 | 绑定 | 策略 |
//! |------|------|------|
//! | `music:1` | [`AudioManager`] | 交叉淡出 / 直接替换 |
//! | `notify` | [`NotifyManager`] | 同键忽略 / 可见时合并 |
//! | `window:win` | [`WinUIAnimator`] | 直接替换 |
//! | `menu:<面板>` / `button:<按钮>` | [`MenuManager`] | 直接替换 |
//! | `loading` | [`LoadingManager`] | 直接替换 |
//! | `idle:*` / `lamp:<序号>` | [`IdleAnimator`] / [`LampFlicker`] | 直接替换 |
//! | `star:<序号>:*` / `cloud:<序号>` | [`SkyDriver`] | 直接替换 |

mod audio;
mod idle;
mod loading;
mod menu;
mod notify;
mod sky;
mod view;
mod win_trigger;
mod window;

pub use audio::{AudioBackend, AudioManager, LogBackend, RecordingBackend, SoundCall};
pub use idle::{IdleAnimator, LampFlicker};
pub use loading::LoadingManager;
pub use menu::{MAIN_PANEL, MenuManager, START_PANEL};
pub use notify::{CUSTOM_CATEGORY, NotifyManager};
pub use sky::SkyDriver;
pub use view::{AudioChannel, AudioChannelData, Lamp, LampData, UiNode, UiNodeData};
pub use win_trigger::SitSpot;
pub use window::WinUIAnimator;

use seq_runtime::ResourceId;

/// 通知文字
pub const NOTIFY: &str = "notify";
/// 结算窗口
pub const WIN_WINDOW: &str = "window:win";
/// 加载画面
pub const LOADING: &str = "loading";
/// 标题浮动
pub const IDLE_LOGO: &str = "idle:logo";
/// 开始菜单标题浮动
pub const IDLE_START_LOGO: &str = "idle:start_logo";
/// “按任意键开始”闪烁
pub const IDLE_START_TEXT: &str = "idle:start_text";

/// 音乐层
pub fn music_layer(layer: u32) -> ResourceId {
    ResourceId::new(format!("music:{}", layer))
}

/// 菜单面板
pub fn menu_panel(name: &str) -> ResourceId {
    ResourceId::new(format!("menu:{}", name))
}

/// 按钮（点击冲击）
pub fn button(id: &str) -> ResourceId {
    ResourceId::new(format!("button:{}", id))
}

/// 灯光
pub fn lamp(index: usize) -> ResourceId {
    ResourceId::new(format!("lamp:{}", index))
}

/// 星星缩放闪烁
pub fn star_glimmer(index: usize) -> ResourceId {
    ResourceId::new(format!("star:{}:glimmer", index))
}

/// 星星透明度闪烁
pub fn star_fade(index: usize) -> ResourceId {
    ResourceId::new(format!("star:{}:fade", index))
}

/// 星星漂移
pub fn star_drift(index: usize) -> ResourceId {
    ResourceId::new(format!("star:{}:drift", index))
}

/// 云朵漂移
pub fn cloud(index: usize) -> ResourceId {
    ResourceId::new(format!("cloud:{}", index))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ids() {
        assert_eq!(music_layer(1).as_str(), "music:1");
        assert_eq!(menu_panel("Home").as_str(), "menu:Home");
        assert_eq!(button("play").as_str(), "button:play");
        assert_eq!(lamp(2).as_str(), "lamp:2");
        assert_eq!(star_fade(0).as_str(), "star:0:fade");
        assert_ne!(star_glimmer(1), star_drift(1));
        assert_eq!(cloud(3).as_str(), "cloud:3");
        assert_ne!(menu_panel("Home"), button("Home"));
    }
}
