//! # Sky 模块
//!
//! 夜空装饰动画：星星闪烁（缩放 + 淡入淡出）、星星漂移、云朵横向漂移。
//!
//! 每条动画都是无限往返循环，开始前随机延迟一段时间（不超过单程时长），
//! 让同一批星星和云朵错开节奏。单程时长、幅度和延迟都在启动时随机决定，
//! 之后不再变化，因此不需要像灯光那样每帧续播。

use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seq_runtime::{
    AnimationSpec, EasingFunction, Loops, ResourceId, Scheduler, SequenceBuilder, SequenceNode,
    Tween, policy,
};
use tracing::{debug, warn};

use super::view::UiNode;
use super::{cloud, star_drift, star_fade, star_glimmer};
use crate::config::SkyConfig;

/// 星星与云朵动画
pub struct SkyDriver {
    stars: Vec<UiNode>,
    clouds: Vec<UiNode>,
    config: SkyConfig,
    rng: StdRng,
    running: bool,
}

impl SkyDriver {
    pub fn new(stars: Vec<UiNode>, clouds: Vec<UiNode>, config: SkyConfig) -> Self {
        Self::with_rng(stars, clouds, config, StdRng::from_entropy())
    }

    /// 使用固定种子（测试 / 可复现的演示）
    pub fn with_seed(stars: Vec<UiNode>, clouds: Vec<UiNode>, config: SkyConfig, seed: u64) -> Self {
        Self::with_rng(stars, clouds, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(stars: Vec<UiNode>, clouds: Vec<UiNode>, config: SkyConfig, rng: StdRng) -> Self {
        Self {
            stars,
            clouds,
            config,
            rng,
            running: false,
        }
    }

    /// 为每颗星星和每朵云开始循环动画
    ///
    /// 以各自当前的缩放、透明度和位置为原点；重复调用会以新的随机参数重新开始。
    pub fn start(&mut self, scheduler: &mut Scheduler) {
        for index in 0..self.stars.len() {
            self.animate_star(scheduler, index);
        }
        for index in 0..self.clouds.len() {
            self.animate_cloud(scheduler, index);
        }
        self.running = true;
        debug!(stars = self.stars.len(), clouds = self.clouds.len(), "夜空动画开始");
    }

    /// 停止全部动画，属性停在当前值
    pub fn stop(&mut self, scheduler: &mut Scheduler) {
        self.running = false;
        for index in 0..self.stars.len() {
            scheduler.cancel(star_glimmer(index).as_str());
            scheduler.cancel(star_fade(index).as_str());
            scheduler.cancel(star_drift(index).as_str());
        }
        for index in 0..self.clouds.len() {
            scheduler.cancel(cloud(index).as_str());
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stars(&self) -> &[UiNode] {
        &self.stars
    }

    pub fn clouds(&self) -> &[UiNode] {
        &self.clouds
    }

    fn animate_star(&mut self, scheduler: &mut Scheduler, index: usize) {
        let config = &self.config;
        let (min_duration, max_duration) = (config.glimmer_min_duration, config.glimmer_max_duration);
        let (min_scale, max_scale) = (config.glimmer_min_scale, config.glimmer_max_scale);
        let (min_alpha, max_alpha) = (config.glimmer_min_alpha, config.glimmer_max_alpha);
        let (min_drift, max_drift) = (config.star_min_drift, config.star_max_drift);
        let (min_move, max_move) = (config.star_min_drift_duration, config.star_max_drift_duration);

        let star = self.stars[index].clone();

        // 缩放和透明度共用同一个单程时长，但各自随机延迟
        let glimmer_duration = self.roll(min_duration, max_duration);
        let scale = star.scale() * self.roll(min_scale, max_scale);
        let glimmer = Tween::to(star.binding("scale"), scale, glimmer_duration)
            .with_easing(EasingFunction::InOutSine);
        let delay = self.roll(0.0, glimmer_duration);
        play(scheduler, star_glimmer(index), looped(SequenceNode::tween(glimmer), delay));

        let alpha = self.roll(min_alpha, max_alpha);
        let fade = Tween::to(star.binding("alpha"), alpha, glimmer_duration)
            .with_easing(EasingFunction::InOutSine);
        let delay = self.roll(0.0, glimmer_duration);
        play(scheduler, star_fade(index), looped(SequenceNode::tween(fade), delay));

        let move_duration = self.roll(min_move, max_move);
        let (dx, dy) = self.inside_unit_circle();
        let distance = self.roll(min_drift, max_drift);
        let drift = SequenceBuilder::new()
            .append_tween(
                Tween::to(star.binding("x"), star.x() + dx * distance, move_duration)
                    .with_easing(EasingFunction::InOutSine),
            )
            .join_tween(
                Tween::to(star.binding("y"), star.y() + dy * distance, move_duration)
                    .with_easing(EasingFunction::InOutSine),
            )
            .build();
        let delay = self.roll(0.0, move_duration);
        play(scheduler, star_drift(index), looped(drift, delay));
    }

    fn animate_cloud(&mut self, scheduler: &mut Scheduler, index: usize) {
        let duration = self.roll(
            self.config.cloud_min_drift_duration,
            self.config.cloud_max_drift_duration,
        );
        let target = &self.clouds[index];
        let drift = Tween::to(
            target.binding("x"),
            target.x() + self.config.cloud_drift_distance,
            duration,
        )
        .with_easing(EasingFunction::InOutSine);
        let delay = self.roll(0.0, duration);
        play(scheduler, cloud(index), looped(SequenceNode::tween(drift), delay));
    }

    fn roll(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..=max)
        } else {
            min
        }
    }

    /// 单位圆内均匀分布的随机点
    fn inside_unit_circle(&mut self) -> (f32, f32) {
        let angle = self.rng.gen_range(0.0..TAU);
        let radius = self.rng.gen_range(0.0f32..=1.0).sqrt();
        (radius * angle.cos(), radius * angle.sin())
    }
}

fn looped(root: SequenceNode, delay: f32) -> AnimationSpec {
    AnimationSpec::new(root)
        .with_loops(Loops::Yoyo(None))
        .with_delay(delay)
}

fn play(scheduler: &mut Scheduler, resource: ResourceId, spec: AnimationSpec) {
    if let Err(e) = scheduler.play(resource.as_str(), spec, policy::REPLACE_ALWAYS) {
        warn!(resource = %resource, error = %e, "夜空动画无效");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sky(config: SkyConfig) -> SkyDriver {
        let stars = (0..3)
            .map(|i| {
                let star = UiNode::new(format!("star_{}", i));
                star.set_x(i as f32 * 10.0);
                star.set_y(50.0);
                star
            })
            .collect();
        SkyDriver::with_seed(stars, vec![UiNode::new("cloud_0")], config, 3)
    }

    #[test]
    fn test_start_plays_every_layer() {
        let mut scheduler = Scheduler::new();
        let mut sky = sky(SkyConfig::default());

        sky.start(&mut scheduler);
        assert!(sky.is_running());
        // 每颗星星三条，每朵云一条
        assert_eq!(scheduler.active_count(), 3 * 3 + 1);
        for index in 0..3 {
            assert!(scheduler.is_active(star_glimmer(index).as_str()));
            assert!(scheduler.is_active(star_drift(index).as_str()));
        }
        assert_eq!(
            scheduler.timeline(cloud(0).as_str()).unwrap().describe(),
            vec![format!(
                "0..{} tween x current->2 InOutSine",
                scheduler.timeline(cloud(0).as_str()).unwrap().duration()
            )]
        );
    }

    #[test]
    fn test_stars_stay_within_configured_range() {
        let mut scheduler = Scheduler::new();
        let config = SkyConfig::default();
        let mut sky = sky(config.clone());
        sky.start(&mut scheduler);

        for _ in 0..600 {
            scheduler.tick(0.1);
            for (i, star) in sky.stars().iter().enumerate() {
                assert!((1.0 - 1e-4..=config.glimmer_max_scale + 1e-4).contains(&star.scale()));
                assert!((config.glimmer_min_alpha - 1e-4..=1.0).contains(&star.alpha()));
                let dx = star.x() - i as f32 * 10.0;
                let dy = star.y() - 50.0;
                assert!((dx * dx + dy * dy).sqrt() <= config.star_max_drift + 1e-3);
            }
            let x = sky.clouds()[0].x();
            assert!((0.0..=config.cloud_drift_distance + 1e-4).contains(&x));
        }
        // 无限循环不会自行结束
        assert_eq!(scheduler.active_count(), 10);
    }

    #[test]
    fn test_cloud_waits_for_delay() {
        let mut scheduler = Scheduler::new();
        let config = SkyConfig {
            cloud_min_drift_duration: 4.0,
            cloud_max_drift_duration: 4.0,
            ..SkyConfig::default()
        };
        let mut sky = SkyDriver::with_seed(Vec::new(), vec![UiNode::new("cloud")], config, 9);
        sky.start(&mut scheduler);

        // 延迟在 [0, 4] 秒内；8 秒后至少走完一个单程
        let mut moved_at = None;
        for frame in 1..=80 {
            scheduler.tick(0.1);
            if moved_at.is_none() && sky.clouds()[0].x() > 0.0 {
                moved_at = Some(frame);
            }
        }
        assert!(moved_at.is_some());
        assert!(scheduler.iteration(cloud(0).as_str()).unwrap() >= 1);
    }

    #[test]
    fn test_same_seed_same_sky() {
        let mut first = Scheduler::new();
        let mut second = Scheduler::new();
        let mut a = sky(SkyConfig::default());
        let mut b = sky(SkyConfig::default());
        a.start(&mut first);
        b.start(&mut second);

        for _ in 0..50 {
            first.tick(0.1);
            second.tick(0.1);
        }
        for (x, y) in a.stars().iter().zip(b.stars()) {
            assert_eq!(x.snapshot(), y.snapshot());
        }
    }

    #[test]
    fn test_stop_freezes_sky() {
        let mut scheduler = Scheduler::new();
        let mut sky = sky(SkyConfig::default());
        sky.start(&mut scheduler);
        for _ in 0..30 {
            scheduler.tick(0.1);
        }

        sky.stop(&mut scheduler);
        assert!(!sky.is_running());
        assert_eq!(scheduler.active_count(), 0);

        let frozen: Vec<_> = sky.stars().iter().map(UiNode::snapshot).collect();
        scheduler.tick(1.0);
        let after: Vec<_> = sky.stars().iter().map(UiNode::snapshot).collect();
        assert_eq!(frozen, after);
    }
}
