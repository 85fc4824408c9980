//! # Notify 模块
//!
//! 屏幕通知。
//!
//! - 预设通知：同名通知正在显示时忽略重复触发，不同名则打断重新开始
//! - 自定义通知：已有自定义通知可见时只换文字并跳过淡入，停留计时重新开始

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use seq_runtime::{EasingFunction, Phase, Scheduler, SequenceBuilder, Tween, policy};
use tracing::{debug, warn};

use super::NOTIFY;
use super::audio::AudioManager;
use super::view::UiNode;
use crate::config::NotifyConfig;

/// 自定义通知的类别
pub const CUSTOM_CATEGORY: &str = "custom";

/// 自定义通知在 `current` 中的标记
const CUSTOM_ID: &str = "[CUSTOM]";

/// 通知音效
const NOTIFICATION_SFX: &str = "Notification";

/// 通知管理器
pub struct NotifyManager {
    text: UiNode,
    /// 预设通知（名称 -> 文字）
    catalog: HashMap<String, String>,
    config: NotifyConfig,
    /// 文字的静止位置
    base_y: f32,
    /// 正在显示的通知名称
    current: Rc<RefCell<Option<String>>>,
}

impl NotifyManager {
    pub fn new(text: UiNode, config: NotifyConfig) -> Self {
        let base_y = text.y();
        text.set_alpha(0.0);
        text.set_active(false);

        let mut catalog = HashMap::new();
        for entry in &config.notifications {
            if catalog.contains_key(&entry.name) {
                warn!(name = %entry.name, "通知列表中存在重名条目");
                continue;
            }
            catalog.insert(entry.name.clone(), entry.text.clone());
        }

        Self {
            text,
            catalog,
            config,
            base_y,
            current: Rc::new(RefCell::new(None)),
        }
    }

    /// 触发预设通知
    ///
    /// # 返回
    /// 是否开始了新的通知（重复触发或名称不存在时为 `false`）
    pub fn trigger(
        &mut self,
        scheduler: &mut Scheduler,
        audio: &AudioManager,
        name: &str,
        with_sound: bool,
    ) -> bool {
        let Some(message) = self.catalog.get(name).cloned() else {
            warn!(name = name, "通知不存在");
            return false;
        };

        let fade = self.config.fade_duration;
        let distance = self.config.vertical_move_distance;
        let alpha = self.text.binding("alpha");
        let y = self.text.binding("y");

        let spec = SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(alpha.clone(), 0.0, 1.0, fade))
                    .join_tween(
                        Tween::between(y.clone(), self.base_y + distance, self.base_y, fade)
                            .with_easing(EasingFunction::OutQuad),
                    )
            })
            .phase(Phase::Hold, |b| b.append_interval(self.config.hold_duration))
            .phase(Phase::Exit, |b| {
                b.append_tween(Tween::to(alpha.clone(), 0.0, fade)).join_tween(
                    Tween::to(y.clone(), self.base_y - distance, fade)
                        .with_easing(EasingFunction::InQuad),
                )
            })
            .into_spec()
            .with_key(name)
            .on_complete(self.on_complete_hook(true))
            .on_kill(self.on_kill_hook());

        let outcome = match scheduler.play(NOTIFY, spec, policy::IGNORE_IF_SAME_KEY) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(name = name, error = %e, "通知动画无效");
                return false;
            }
        };
        if outcome.is_rejected() {
            debug!(name = name, "同一通知正在显示，忽略");
            return false;
        }

        self.text.set_active(true);
        self.text.set_text(message);
        self.text.set_alpha(0.0);
        self.text.set_y(self.base_y + distance);
        *self.current.borrow_mut() = Some(name.to_string());

        if with_sound {
            audio.play_sfx(NOTIFICATION_SFX);
        }
        true
    }

    /// 触发自定义通知
    pub fn trigger_custom(&mut self, scheduler: &mut Scheduler, message: &str) -> bool {
        let fade = self.config.fade_duration;
        let alpha = self.text.binding("alpha");
        let text = self.text.clone();

        let spec = SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(alpha.clone(), 0.0, 1.0, fade))
            })
            .phase(Phase::Hold, |b| {
                // 合并时跳过了淡入，文字保持完全可见
                b.append_callback(move || {
                    text.set_alpha(1.0);
                    Ok(())
                })
                .append_interval(self.config.hold_duration)
            })
            .phase(Phase::Exit, |b| b.append_tween(Tween::to(alpha.clone(), 0.0, fade)))
            .into_spec()
            .with_category(CUSTOM_CATEGORY)
            .on_complete(self.on_complete_hook(false))
            .on_kill(self.on_kill_hook());

        if let Err(e) = scheduler.play(NOTIFY, spec, policy::COALESCE_WHILE_VISIBLE) {
            warn!(error = %e, "通知动画无效");
            return false;
        }

        self.text.set_active(true);
        self.text.set_text(message);
        self.text.set_y(self.base_y);
        *self.current.borrow_mut() = Some(CUSTOM_ID.to_string());
        true
    }

    /// 正在显示的预设通知名称，自定义通知为 `"[CUSTOM]"`
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn text(&self) -> &UiNode {
        &self.text
    }

    pub fn base_y(&self) -> f32 {
        self.base_y
    }

    fn on_complete_hook(&self, reset_position: bool) -> impl Fn() + 'static {
        let text = self.text.clone();
        let current = self.current.clone();
        let base_y = self.base_y;
        move || {
            text.set_active(false);
            if reset_position {
                text.set_y(base_y);
            }
            *current.borrow_mut() = None;
        }
    }

    fn on_kill_hook(&self) -> impl Fn() + 'static {
        let current = self.current.clone();
        move || *current.borrow_mut() = None
    }
}
