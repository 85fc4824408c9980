//! # Demo 模块
//!
//! 无窗口的演示场景：按时间表向 [`App`] 发出操作，以固定帧率推进，
//! 并记录每一个调度事件。

use seq_runtime::SequenceEvent;
use tracing::{debug, info, warn};

use super::{App, PLAY_BUTTON};

/// 演示中的一次操作
#[derive(Debug, Clone, PartialEq)]
pub enum DemoAction {
    /// 进入开始菜单
    Start,
    /// “按任意键开始”
    PressStart,
    ClickButton(String),
    PlayMusic(String),
    StopMusic(Option<f32>),
    SetMusicVolume(f32),
    Notify { name: String, with_sound: bool },
    NotifyCustom(String),
    EnterSpot,
    ExitSpot,
    Sleep(bool),
    HideWindow,
    ShowLoading,
}

/// 时间表中的一项
#[derive(Debug, Clone, PartialEq)]
pub struct DemoStep {
    /// 触发时间（秒）
    pub at: f32,
    pub action: DemoAction,
}

impl DemoStep {
    pub fn new(at: f32, action: DemoAction) -> Self {
        Self { at, action }
    }
}

/// 演示结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoReport {
    pub frames: u32,
    pub actions: usize,
    pub started: usize,
    pub rejected: usize,
    pub killed: usize,
    pub completed: usize,
    pub callback_failed: usize,
}

impl DemoReport {
    fn record(&mut self, event: &SequenceEvent) {
        match event {
            SequenceEvent::Started { .. } => self.started += 1,
            SequenceEvent::Rejected { .. } => self.rejected += 1,
            SequenceEvent::Killed { .. } => self.killed += 1,
            SequenceEvent::Completed { .. } => self.completed += 1,
            SequenceEvent::CallbackFailed { .. } => self.callback_failed += 1,
        }
    }
}

/// 默认演示脚本
///
/// 菜单 → 切换音乐 → 连续触发通知 → 自定义通知 → 通关 → 加载画面
pub fn default_script() -> Vec<DemoStep> {
    use DemoAction::*;

    let notify = |name: &str| Notify {
        name: name.to_string(),
        with_sound: true,
    };

    vec![
        DemoStep::new(0.0, Start),
        DemoStep::new(1.5, PressStart),
        DemoStep::new(2.0, ClickButton(PLAY_BUTTON.to_string())),
        DemoStep::new(2.1, ClickButton(PLAY_BUTTON.to_string())),
        DemoStep::new(2.5, PlayMusic("Theme".to_string())),
        DemoStep::new(3.0, PlayMusic("Waltz In C".to_string())),
        DemoStep::new(4.0, notify("Jump")),
        DemoStep::new(4.2, notify("Jump")),
        DemoStep::new(4.4, notify("Jump")),
        DemoStep::new(4.8, notify("Saved")),
        DemoStep::new(8.0, NotifyCustom("欢迎回来".to_string())),
        DemoStep::new(8.6, NotifyCustom("今天也要早点睡".to_string())),
        DemoStep::new(9.2, NotifyCustom("晚安".to_string())),
        DemoStep::new(11.0, EnterSpot),
        DemoStep::new(12.0, Sleep(true)),
        DemoStep::new(12.2, Sleep(false)),
        DemoStep::new(12.5, Sleep(true)),
        DemoStep::new(14.0, HideWindow),
        DemoStep::new(14.0, ExitSpot),
        DemoStep::new(15.0, ShowLoading),
        DemoStep::new(16.0, SetMusicVolume(0.5)),
        DemoStep::new(18.0, StopMusic(None)),
    ]
}

/// 以固定帧率运行演示脚本
pub fn run_demo(app: &mut App, script: &[DemoStep], fps: u32, seconds: f32) -> DemoReport {
    let mut report = DemoReport::default();
    if fps == 0 || !seconds.is_finite() || seconds <= 0.0 {
        warn!(fps = fps, seconds = seconds, "演示参数无效");
        return report;
    }

    let mut steps = script.to_vec();
    steps.sort_by(|a, b| a.at.total_cmp(&b.at));

    let dt = 1.0 / fps as f32;
    let total_frames = (seconds * fps as f32).ceil() as u32;
    let mut next = 0;

    info!(fps = fps, seconds = seconds, steps = steps.len(), "演示开始");

    for frame in 0..total_frames {
        let now = frame as f32 * dt;
        while next < steps.len() && steps[next].at <= now {
            apply(app, &steps[next].action, now);
            report.actions += 1;
            next += 1;
        }

        for event in app.update(dt) {
            info!(frame = frame, time = now, event = ?event, "调度事件");
            report.record(&event);
        }
        report.frames += 1;
    }

    app.shutdown();
    info!(?report, "演示结束");
    report
}

fn apply(app: &mut App, action: &DemoAction, now: f32) {
    debug!(time = now, ?action, "执行操作");
    match action {
        DemoAction::Start => app.start(),
        DemoAction::PressStart => app.press_start(),
        DemoAction::ClickButton(id) => {
            app.click_button(id);
        }
        DemoAction::PlayMusic(name) => {
            app.play_music(name);
        }
        DemoAction::StopMusic(fade) => {
            app.stop_music(*fade);
        }
        DemoAction::SetMusicVolume(volume) => app.set_music_volume(*volume),
        DemoAction::Notify { name, with_sound } => {
            app.notify(name, *with_sound);
        }
        DemoAction::NotifyCustom(message) => {
            app.notify_custom(message);
        }
        DemoAction::EnterSpot => app.sit_spot.player_entered(),
        DemoAction::ExitSpot => app.sit_spot.player_exited(),
        DemoAction::Sleep(sleeping) => app.player_sleeping = *sleeping,
        DemoAction::HideWindow => {
            app.hide_window();
        }
        DemoAction::ShowLoading => {
            if let Some(hold) = app.show_loading() {
                info!(hold = hold, "加载画面停留");
            }
        }
    }
}
