//! # Menu 模块
//!
//! 菜单面板切换与按钮点击冲击。

use std::collections::BTreeMap;

use seq_runtime::{Punch, Scheduler, SequenceBuilder, SequenceNode, Tween, policy};
use tracing::{debug, warn};

use super::audio::AudioManager;
use super::view::UiNode;
use super::{button, menu_panel};
use crate::config::MenuConfig;

/// 开始菜单（“按任意键开始”）
pub const START_PANEL: &str = "Start";
/// 主菜单
pub const MAIN_PANEL: &str = "Main";

/// 按钮点击音效
const BUTTON_CLICK_SFX: &str = "Button Click";

/// 菜单管理器
pub struct MenuManager {
    panels: BTreeMap<String, UiNode>,
    buttons: BTreeMap<String, UiNode>,
    config: MenuConfig,
}

impl MenuManager {
    pub fn new(config: MenuConfig) -> Self {
        Self {
            panels: BTreeMap::new(),
            buttons: BTreeMap::new(),
            config,
        }
    }

    /// 注册面板
    pub fn add_panel(&mut self, name: impl Into<String>, node: UiNode) {
        let name = name.into();
        if self.panels.insert(name.clone(), node).is_some() {
            warn!(panel = %name, "面板被重复注册，使用新的节点");
        }
    }

    /// 注册按钮
    pub fn add_button(&mut self, id: impl Into<String>, node: UiNode) {
        let id = id.into();
        if self.buttons.insert(id.clone(), node).is_some() {
            warn!(button = %id, "按钮被重复注册，使用新的节点");
        }
    }

    pub fn panel(&self, name: &str) -> Option<&UiNode> {
        self.panels.get(name)
    }

    pub fn button(&self, id: &str) -> Option<&UiNode> {
        self.buttons.get(id)
    }

    /// 切换到指定面板：目标面板淡入，其余可见面板淡出后停用
    pub fn show_panel(&mut self, scheduler: &mut Scheduler, name: &str) -> bool {
        if !self.panels.contains_key(name) {
            warn!(panel = name, "面板不存在");
            return false;
        }

        let fade = self.config.panel_fade;
        for (panel_name, node) in &self.panels {
            let resource = menu_panel(panel_name);
            if panel_name == name {
                node.set_active(true);
                let spec = SequenceBuilder::new()
                    .append_tween(Tween::to(node.binding("alpha"), 1.0, fade))
                    .into_spec()
                    .with_key("show");
                if let Err(e) = scheduler.play(&resource, spec, policy::REPLACE_ALWAYS) {
                    warn!(panel = %panel_name, error = %e, "面板动画无效");
                }
            } else if node.is_active() {
                let hidden = node.clone();
                let spec = SequenceBuilder::new()
                    .append_tween(Tween::to(node.binding("alpha"), 0.0, fade))
                    .into_spec()
                    .with_key("hide")
                    .on_complete(move || hidden.set_active(false));
                if let Err(e) = scheduler.play(&resource, spec, policy::REPLACE_ALWAYS) {
                    warn!(panel = %panel_name, error = %e, "面板动画无效");
                }
            }
        }

        debug!(panel = name, "切换菜单面板");
        true
    }

    /// 按钮点击冲击
    ///
    /// 正在进行的冲击先直接跑完（缩放回到静止值），再开始新的冲击。
    pub fn punch_button(&mut self, scheduler: &mut Scheduler, id: &str) -> bool {
        let Some(node) = self.buttons.get(id) else {
            warn!(button = id, "按钮不存在");
            return false;
        };

        let resource = button(id);
        scheduler.complete(resource.as_str());

        let punch = &self.config.punch;
        let spec = SequenceBuilder::new()
            .append(SequenceNode::punch(
                Punch::new(node.binding("scale"), punch.amplitude, punch.duration)
                    .with_vibrato(punch.vibrato)
                    .with_elasticity(punch.elasticity),
            ))
            .into_spec();

        match scheduler.play(&resource, spec, policy::REPLACE_ALWAYS) {
            Ok(_) => true,
            Err(e) => {
                warn!(button = id, error = %e, "按钮动画无效");
                false
            }
        }
    }

    /// 从开始菜单进入主菜单：切换面板、淡出菜单音乐、播放点击音效
    pub fn enter_main_menu(&mut self, scheduler: &mut Scheduler, audio: &mut AudioManager) {
        self.show_panel(scheduler, MAIN_PANEL);
        audio.stop_music(scheduler, Some(self.config.enter_music_fade));
        audio.play_sfx(BUTTON_CLICK_SFX);
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }
}
