//! # Window 模块
//!
//! 结算窗口的显示 / 隐藏动画：遮罩层与内容面板同时淡入淡出，内容面板带缩放。
//!
//! 窗口只有在显示动画完成后才可交互；隐藏时立即禁用交互。

use seq_runtime::{Scheduler, SequenceBuilder, Tween, policy};
use tracing::warn;

use super::WIN_WINDOW;
use super::view::UiNode;
use crate::config::WindowConfig;

/// 遮罩层与内容面板的淡入淡出时长之比
const SECONDARY_FADE_RATIO: f32 = 0.8;

/// 结算窗口动画
pub struct WinUIAnimator {
    /// 窗口根节点（整体透明度与交互开关）
    root: UiNode,
    /// 半透明遮罩
    overlay: UiNode,
    /// 内容面板
    container: UiNode,
    config: WindowConfig,
}

impl WinUIAnimator {
    /// 创建窗口动画，窗口初始为隐藏状态
    pub fn new(root: UiNode, overlay: UiNode, container: UiNode, config: WindowConfig) -> Self {
        root.set_alpha(0.0);
        root.set_interactable(false);
        Self {
            root,
            overlay,
            container,
            config,
        }
    }

    /// 显示窗口
    pub fn show(&mut self, scheduler: &mut Scheduler) -> bool {
        let duration = self.config.duration;
        let root = self.root.clone();
        let on_shown = self.root.clone();

        let spec = SequenceBuilder::new()
            .append_callback(move || {
                root.set_alpha(1.0);
                Ok(())
            })
            .append_tween(Tween::to(
                self.overlay.binding("alpha"),
                1.0,
                duration * SECONDARY_FADE_RATIO,
            ))
            .join_tween(Tween::to(self.container.binding("alpha"), 1.0, duration))
            .join_tween(
                Tween::to(self.container.binding("scale"), 1.0, duration)
                    .with_easing(self.config.show_ease),
            )
            .into_spec()
            .with_key("show")
            .on_complete(move || on_shown.set_interactable(true));

        if let Err(e) = scheduler.play(WIN_WINDOW, spec, policy::REPLACE_ALWAYS) {
            warn!(error = %e, "窗口显示动画无效");
            return false;
        }

        self.overlay.set_alpha(0.0);
        self.container.set_alpha(0.0);
        self.container.set_scale(self.config.start_scale);
        true
    }

    /// 隐藏窗口
    ///
    /// 动画结束后根节点完全透明；是否停用窗口由调用方决定。
    pub fn hide(&mut self, scheduler: &mut Scheduler) -> bool {
        let duration = self.config.duration;
        let on_hidden = self.root.clone();

        let spec = SequenceBuilder::new()
            .append_tween(Tween::to(self.overlay.binding("alpha"), 0.0, duration))
            .join_tween(Tween::to(
                self.container.binding("alpha"),
                0.0,
                duration * SECONDARY_FADE_RATIO,
            ))
            .join_tween(
                Tween::to(
                    self.container.binding("scale"),
                    self.config.start_scale,
                    duration,
                )
                .with_easing(self.config.hide_ease),
            )
            .into_spec()
            .with_key("hide")
            .on_complete(move || on_hidden.set_alpha(0.0));

        if let Err(e) = scheduler.play(WIN_WINDOW, spec, policy::REPLACE_ALWAYS) {
            warn!(error = %e, "窗口隐藏动画无效");
            return false;
        }

        self.root.set_interactable(false);
        true
    }

    pub fn is_interactable(&self) -> bool {
        self.root.is_interactable()
    }

    pub fn root(&self) -> &UiNode {
        &self.root
    }

    pub fn overlay(&self) -> &UiNode {
        &self.overlay
    }

    pub fn container(&self) -> &UiNode {
        &self.container
    }
}
