//! # Idle 模块
//!
//! 菜单待机动画：标题浮动、“按任意键开始”闪烁、灯光闪烁。
//!
//! 标题和文字是无限往返循环；灯光每次闪烁都取新的随机目标，
//! 因此每轮都是一段新的序列，由 [`LampFlicker::update`] 在上一轮结束后续上。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seq_runtime::{
    AnimationSpec, EasingFunction, Loops, Scheduler, SequenceBuilder, SequenceNode, Tween, policy,
};
use tracing::{debug, warn};

use super::view::{Lamp, UiNode};
use super::{IDLE_LOGO, IDLE_START_LOGO, IDLE_START_TEXT, lamp};
use crate::config::IdleConfig;

/// 开始菜单标题的浮动高度
const START_LOGO_FLOAT_HEIGHT: f32 = 30.0;
/// 开始菜单标题的单程时长（秒）
const START_LOGO_FLOAT_DURATION: f32 = 2.0;

/// 标题浮动与文字闪烁
pub struct IdleAnimator {
    logo: UiNode,
    start_logo: UiNode,
    start_text: UiNode,
    config: IdleConfig,
}

impl IdleAnimator {
    pub fn new(logo: UiNode, start_logo: UiNode, start_text: UiNode, config: IdleConfig) -> Self {
        Self {
            logo,
            start_logo,
            start_text,
            config,
        }
    }

    /// 开始全部待机动画
    pub fn start(&self, scheduler: &mut Scheduler) {
        let logo_duration = 1.0 / self.config.logo_float_speed;
        let logo = Self::yoyo(
            Tween::to(
                self.logo.binding("y"),
                self.logo.y() + self.config.logo_float_height,
                logo_duration,
            )
            .with_easing(EasingFunction::InOutSine),
        );

        let start_logo = Self::yoyo(
            Tween::to(
                self.start_logo.binding("y"),
                self.start_logo.y() + START_LOGO_FLOAT_HEIGHT,
                START_LOGO_FLOAT_DURATION,
            )
            .with_easing(EasingFunction::InOutSine),
        );

        let text = Self::yoyo(
            Tween::to(
                self.start_text.binding("alpha"),
                0.0,
                1.0 / self.config.text_fade_speed,
            )
            .with_easing(EasingFunction::InOutQuad),
        );

        for (resource, spec) in [
            (IDLE_LOGO, logo),
            (IDLE_START_LOGO, start_logo),
            (IDLE_START_TEXT, text),
        ] {
            if let Err(e) = scheduler.play(resource, spec, policy::REPLACE_ALWAYS) {
                warn!(resource = resource, error = %e, "待机动画无效");
            }
        }
        debug!("待机动画开始");
    }

    /// 停止全部待机动画，属性停在当前值
    pub fn stop(&self, scheduler: &mut Scheduler) {
        scheduler.cancel(IDLE_LOGO);
        scheduler.cancel(IDLE_START_LOGO);
        scheduler.cancel(IDLE_START_TEXT);
    }

    pub fn logo(&self) -> &UiNode {
        &self.logo
    }

    pub fn start_logo(&self) -> &UiNode {
        &self.start_logo
    }

    pub fn start_text(&self) -> &UiNode {
        &self.start_text
    }

    fn yoyo(tween: Tween) -> AnimationSpec {
        SequenceBuilder::new()
            .append_tween(tween)
            .into_spec()
            .with_loops(Loops::Yoyo(None))
    }
}

/// 灯光闪烁
pub struct LampFlicker {
    lamps: Vec<Lamp>,
    config: IdleConfig,
    rng: StdRng,
    running: bool,
}

impl LampFlicker {
    pub fn new(lamps: Vec<Lamp>, config: IdleConfig) -> Self {
        Self::with_rng(lamps, config, StdRng::from_entropy())
    }

    /// 使用固定种子（测试 / 可复现的演示）
    pub fn with_seed(lamps: Vec<Lamp>, config: IdleConfig, seed: u64) -> Self {
        Self::with_rng(lamps, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(lamps: Vec<Lamp>, config: IdleConfig, rng: StdRng) -> Self {
        if lamps.is_empty() {
            warn!("没有配置任何灯光");
        }
        Self {
            lamps,
            config,
            rng,
            running: false,
        }
    }

    /// 开始闪烁
    pub fn start(&mut self, scheduler: &mut Scheduler) {
        self.running = true;
        for index in 0..self.lamps.len() {
            self.flicker(scheduler, index);
        }
    }

    /// 为已经闪烁完一轮的灯光续上下一轮
    ///
    /// # 返回
    /// 本次续上的灯光数量
    pub fn update(&mut self, scheduler: &mut Scheduler) -> usize {
        if !self.running {
            return 0;
        }

        let mut restarted = 0;
        for index in 0..self.lamps.len() {
            if !scheduler.is_active(lamp(index).as_str()) {
                self.flicker(scheduler, index);
                restarted += 1;
            }
        }
        restarted
    }

    /// 停止闪烁，灯光停在当前值
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        self.running = false;
        for index in 0..self.lamps.len() {
            scheduler.cancel(lamp(index).as_str());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn lamps(&self) -> &[Lamp] {
        &self.lamps
    }

    fn flicker(&mut self, scheduler: &mut Scheduler, index: usize) {
        let intensity = self.roll(self.config.lamp_min_intensity, self.config.lamp_max_intensity);
        let radius_scale = self.roll(self.config.lamp_min_radius, self.config.lamp_max_radius);
        let intensity_duration =
            self.roll(self.config.lamp_min_flicker, self.config.lamp_max_flicker);
        let radius_duration = self.roll(self.config.lamp_min_flicker, self.config.lamp_max_flicker);

        let target = &self.lamps[index];
        let spec = AnimationSpec::new(SequenceNode::parallel(vec![
            SequenceNode::tween(Tween::to(
                target.binding("intensity"),
                intensity,
                intensity_duration,
            )),
            SequenceNode::tween(Tween::to(
                target.binding("radius"),
                target.base_radius() * radius_scale,
                radius_duration,
            )),
        ]));

        if let Err(e) = scheduler.play(lamp(index), spec, policy::REPLACE_ALWAYS) {
            warn!(lamp = index, error = %e, "灯光闪烁动画无效");
        }
    }

    fn roll(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }
}
