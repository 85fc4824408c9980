//! # App 模块
//!
//! 组合根：创建调度器与全部绑定，并把游戏中的操作转发给它们。
//!
//! 每帧先为闪烁完一轮的灯光续上新序列、检查通关条件，再推进调度器。

mod demo;

pub use demo::{DemoAction, DemoReport, DemoStep, default_script, run_demo};

use std::rc::Rc;

use seq_runtime::{Scheduler, SequenceEvent};
use tracing::info;

use crate::bindings::{
    AudioBackend, AudioManager, IdleAnimator, Lamp, LampFlicker, LoadingManager, MAIN_PANEL,
    MenuManager, NotifyManager, START_PANEL, SitSpot, SkyDriver, UiNode, WinUIAnimator,
};
use crate::config::AppConfig;
use crate::settings::SettingsStore;

/// 开始菜单上的按钮
pub const PLAY_BUTTON: &str = "play";

/// 场景中的灯光数量
const LAMP_COUNT: usize = 3;
/// 灯光初始外半径
const LAMP_RADIUS: f32 = 3.0;
/// 通知文字的静止位置
const NOTIFY_BASE_Y: f32 = 200.0;
/// 夜空中的星星数量
const STAR_COUNT: usize = 5;
/// 夜空中的云朵数量
const CLOUD_COUNT: usize = 2;

/// 应用状态
pub struct App {
    pub scheduler: Scheduler,
    pub audio: AudioManager,
    pub notify: NotifyManager,
    pub window: WinUIAnimator,
    pub menu: MenuManager,
    pub loading: LoadingManager,
    pub sit_spot: SitSpot,
    pub idle: IdleAnimator,
    pub lamps: LampFlicker,
    pub sky: SkyDriver,
    /// 玩家是否处于睡眠状态
    pub player_sleeping: bool,
    /// 菜单音乐
    menu_music: String,
}

impl App {
    pub fn new(
        config: &AppConfig,
        backend: Rc<dyn AudioBackend>,
        settings: Box<dyn SettingsStore>,
    ) -> Self {
        Self::build(config, backend, settings, None)
    }

    /// 随机部分（加载停留、灯光闪烁）使用固定种子
    pub fn with_seed(
        config: &AppConfig,
        backend: Rc<dyn AudioBackend>,
        settings: Box<dyn SettingsStore>,
        seed: u64,
    ) -> Self {
        Self::build(config, backend, settings, Some(seed))
    }

    fn build(
        config: &AppConfig,
        backend: Rc<dyn AudioBackend>,
        settings: Box<dyn SettingsStore>,
        seed: Option<u64>,
    ) -> Self {
        let animation = &config.animation;

        let mut menu = MenuManager::new(animation.menu.clone());
        menu.add_panel(START_PANEL, UiNode::new("start_panel"));
        menu.add_panel(MAIN_PANEL, UiNode::hidden("main_panel"));
        menu.add_button(PLAY_BUTTON, UiNode::new("play_button"));

        let notify_text = UiNode::new("notify_text");
        notify_text.set_y(NOTIFY_BASE_Y);

        let window = WinUIAnimator::new(
            UiNode::new("win_window"),
            UiNode::hidden("win_overlay"),
            UiNode::new("win_container"),
            animation.window.clone(),
        );

        let idle = IdleAnimator::new(
            UiNode::new("logo"),
            UiNode::new("start_logo"),
            UiNode::new("start_text"),
            animation.idle.clone(),
        );

        let lamp_views = (0..LAMP_COUNT)
            .map(|_| Lamp::new(1.0, LAMP_RADIUS))
            .collect::<Vec<_>>();

        let stars = (0..STAR_COUNT)
            .map(|i| {
                let star = UiNode::new(format!("star_{}", i));
                star.set_x(i as f32 * 3.0);
                star.set_y(8.0 + (i % 2) as f32);
                star
            })
            .collect::<Vec<_>>();
        let clouds = (0..CLOUD_COUNT)
            .map(|i| {
                let cloud = UiNode::new(format!("cloud_{}", i));
                cloud.set_x(i as f32 * 6.0);
                cloud.set_y(6.0);
                cloud
            })
            .collect::<Vec<_>>();

        let loading_panel = UiNode::hidden("loading_panel");
        let (loading, lamps, sky) = match seed {
            Some(seed) => (
                LoadingManager::with_seed(loading_panel, animation.loading.clone(), seed),
                LampFlicker::with_seed(lamp_views, animation.idle.clone(), seed),
                SkyDriver::with_seed(stars, clouds, animation.sky.clone(), seed),
            ),
            None => (
                LoadingManager::new(loading_panel, animation.loading.clone()),
                LampFlicker::new(lamp_views, animation.idle.clone()),
                SkyDriver::new(stars, clouds, animation.sky.clone()),
            ),
        };

        Self {
            scheduler: Scheduler::new(),
            audio: AudioManager::new(&config.audio, backend, settings),
            notify: NotifyManager::new(notify_text, animation.notify.clone()),
            window,
            menu,
            loading,
            sit_spot: SitSpot::new(),
            idle,
            lamps,
            sky,
            player_sleeping: false,
            menu_music: animation.menu.music.clone(),
        }
    }

    /// 进入开始菜单：播放菜单音乐，开始待机动画
    pub fn start(&mut self) {
        info!(music = %self.menu_music, "进入开始菜单");
        self.audio.play_music(&mut self.scheduler, &self.menu_music);
        self.idle.start(&mut self.scheduler);
        self.lamps.start(&mut self.scheduler);
        self.sky.start(&mut self.scheduler);
    }

    /// 推进一帧，返回本帧的调度事件
    pub fn update(&mut self, dt: f32) -> Vec<SequenceEvent> {
        self.lamps.update(&mut self.scheduler);
        self.sit_spot.update(
            self.player_sleeping,
            &mut self.scheduler,
            &mut self.window,
            &self.audio,
        );
        self.scheduler.tick(dt)
    }

    /// “按任意键开始”
    pub fn press_start(&mut self) {
        self.idle.stop(&mut self.scheduler);
        self.menu.enter_main_menu(&mut self.scheduler, &mut self.audio);
    }

    /// 点击按钮：只有缩放冲击，不播放音效
    pub fn click_button(&mut self, id: &str) -> bool {
        self.menu.punch_button(&mut self.scheduler, id)
    }

    pub fn play_music(&mut self, name: &str) -> bool {
        self.audio.play_music(&mut self.scheduler, name)
    }

    pub fn stop_music(&mut self, fade: Option<f32>) -> bool {
        self.audio.stop_music(&mut self.scheduler, fade)
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.audio.set_music_volume(&mut self.scheduler, volume);
    }

    pub fn notify(&mut self, name: &str, with_sound: bool) -> bool {
        self.notify.trigger(&mut self.scheduler, &self.audio, name, with_sound)
    }

    pub fn notify_custom(&mut self, message: &str) -> bool {
        self.notify.trigger_custom(&mut self.scheduler, message)
    }

    pub fn show_window(&mut self) -> bool {
        self.window.show(&mut self.scheduler)
    }

    pub fn hide_window(&mut self) -> bool {
        self.window.hide(&mut self.scheduler)
    }

    pub fn show_loading(&mut self) -> Option<f32> {
        self.loading.show(&mut self.scheduler)
    }

    /// 关闭场景：停止所有动画
    pub fn shutdown(&mut self) {
        self.lamps.stop(&mut self.scheduler);
        self.sky.stop(&mut self.scheduler);
        self.scheduler.clear();
        info!("所有动画已停止");
    }
}
