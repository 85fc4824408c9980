//! # Loading 模块
//!
//! 加载画面：轮换提示语，淡入，随机停留一段时间，淡出后停用。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seq_runtime::{Scheduler, SequenceBuilder, Tween, policy};
use tracing::{debug, warn};

use super::LOADING;
use super::view::UiNode;
use crate::config::LoadingConfig;

/// 加载画面管理器
pub struct LoadingManager {
    /// 加载画面面板（文字也显示在这里）
    panel: UiNode,
    config: LoadingConfig,
    /// 下一条提示语的下标
    next_message: usize,
    rng: StdRng,
}

impl LoadingManager {
    pub fn new(panel: UiNode, config: LoadingConfig) -> Self {
        Self::with_rng(panel, config, StdRng::from_entropy())
    }

    /// 使用固定种子（测试 / 可复现的演示）
    pub fn with_seed(panel: UiNode, config: LoadingConfig, seed: u64) -> Self {
        Self::with_rng(panel, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(panel: UiNode, config: LoadingConfig, rng: StdRng) -> Self {
        panel.set_alpha(0.0);
        panel.set_active(false);
        Self {
            panel,
            config,
            next_message: 0,
            rng,
        }
    }

    /// 显示加载画面
    ///
    /// # 返回
    /// 本次的停留时长（秒）；动画无效时为 `None`
    pub fn show(&mut self, scheduler: &mut Scheduler) -> Option<f32> {
        let hold = self.roll_hold();
        let fade = self.config.fade_duration;
        let panel = self.panel.clone();

        let spec = SequenceBuilder::new()
            .append_tween(Tween::to(self.panel.binding("alpha"), 1.0, fade))
            .append_interval(hold)
            .append_tween(Tween::to(self.panel.binding("alpha"), 0.0, fade))
            .append_callback(move || {
                panel.set_active(false);
                Ok(())
            })
            .into_spec();

        if let Err(e) = scheduler.play(LOADING, spec, policy::REPLACE_ALWAYS) {
            warn!(error = %e, "加载画面动画无效");
            return None;
        }

        self.panel.set_active(true);
        if let Some(message) = self.config.messages.get(self.next_message) {
            self.panel.set_text(message.as_str());
            self.next_message = (self.next_message + 1) % self.config.messages.len();
        }

        debug!(hold = hold, text = %self.panel.text(), "显示加载画面");
        Some(hold)
    }

    pub fn is_visible(&self) -> bool {
        self.panel.is_active()
    }

    pub fn panel(&self) -> &UiNode {
        &self.panel
    }

    fn roll_hold(&mut self) -> f32 {
        let (min, max) = (self.config.min_hold, self.config.max_hold);
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }
}
