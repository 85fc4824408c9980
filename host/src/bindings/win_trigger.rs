//! # Win Trigger 模块
//!
//! 通关判定：玩家站在休息点上并进入睡眠状态时，显示结算窗口并播放胜利音效。
//! 每个休息点只会触发一次。

use seq_runtime::Scheduler;
use tracing::{debug, info};

use super::audio::AudioManager;
use super::window::WinUIAnimator;

/// 胜利音效
const WIN_SFX: &str = "Win";

/// 休息点
#[derive(Debug, Default)]
pub struct SitSpot {
    player_on_spot: bool,
    has_won: bool,
}

impl SitSpot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 玩家进入休息点
    pub fn player_entered(&mut self) {
        debug!("玩家进入休息点");
        self.player_on_spot = true;
    }

    /// 玩家离开休息点
    pub fn player_exited(&mut self) {
        debug!("玩家离开休息点");
        self.player_on_spot = false;
    }

    /// 每帧检查通关条件
    ///
    /// # 返回
    /// 本帧是否触发了通关
    pub fn update(
        &mut self,
        player_sleeping: bool,
        scheduler: &mut Scheduler,
        window: &mut WinUIAnimator,
        audio: &AudioManager,
    ) -> bool {
        if self.has_won || !self.player_on_spot || !player_sleeping {
            return false;
        }

        info!("通关条件达成");
        self.has_won = true;
        window.show(scheduler);
        audio.play_sfx(WIN_SFX);
        true
    }

    pub fn has_won(&self) -> bool {
        self.has_won
    }

    pub fn is_player_on_spot(&self) -> bool {
        self.player_on_spot
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::bindings::audio::RecordingBackend;
    use crate::bindings::view::UiNode;
    use crate::config::{AudioConfig, WindowConfig};
    use crate::settings::MemorySettingsStore;

    fn setup() -> (Scheduler, WinUIAnimator, AudioManager, Rc<RecordingBackend>) {
        let backend = Rc::new(RecordingBackend::new());
        let audio = AudioManager::new(
            &AudioConfig::default(),
            backend.clone(),
            Box::new(MemorySettingsStore::new()),
        );
        let window = WinUIAnimator::new(
            UiNode::new("win"),
            UiNode::new("overlay"),
            UiNode::new("container"),
            WindowConfig::default(),
        );
        (Scheduler::new(), window, audio, backend)
    }

    #[test]
    fn test_fires_once() {
        let (mut scheduler, mut window, audio, backend) = setup();
        let mut spot = SitSpot::new();

        spot.player_entered();
        assert!(!spot.update(false, &mut scheduler, &mut window, &audio));
        assert!(spot.update(true, &mut scheduler, &mut window, &audio));
        assert!(!spot.update(true, &mut scheduler, &mut window, &audio));

        assert!(spot.has_won());
        assert!(scheduler.is_active("window:win"));
        assert_eq!(backend.one_shots(), vec!["sfx/win.wav".to_string()]);
    }

    #[test]
    fn test_sleeping_off_spot_does_nothing() {
        let (mut scheduler, mut window, audio, backend) = setup();
        let mut spot = SitSpot::new();

        assert!(!spot.update(true, &mut scheduler, &mut window, &audio));

        spot.player_entered();
        spot.player_exited();
        assert!(!spot.update(true, &mut scheduler, &mut window, &audio));

        assert!(!spot.has_won());
        assert_eq!(scheduler.active_count(), 0);
        assert!(backend.calls().is_empty());
    }
}
