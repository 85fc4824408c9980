//! # Scheduler 测试

use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::error::SpecError;
use crate::property::SharedValue;
use crate::spec::{Loops, Phase, SequenceBuilder, SequenceNode, Tween};

fn fade_in(value: &SharedValue, duration: f32) -> AnimationSpec {
    SequenceBuilder::new()
        .append_tween(Tween::between(value.binding(), 0.0, 1.0, duration))
        .into_spec()
}

fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn()>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let make = move |label: &str| -> Box<dyn Fn()> {
        let sink = sink.clone();
        let label = label.to_string();
        Box::new(move || sink.borrow_mut().push(label.clone()))
    };
    (log, make)
}

// -------------------------------------------------------------------------
// 打断策略
// -------------------------------------------------------------------------

#[test]
fn test_replace_always_kills_before_start() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let kill_a = hook("kill a");
    let first = scheduler
        .play("menu", fade_in(&value, 1.0).on_kill(move || kill_a()), policy::REPLACE_ALWAYS)
        .unwrap();
    let second = scheduler
        .play("menu", fade_in(&value, 1.0), policy::REPLACE_ALWAYS)
        .unwrap();

    let (Some(a), Some(b)) = (first.handle(), second.handle()) else {
        panic!("both plays should start");
    };
    assert_ne!(a, b);
    assert_eq!(*log.borrow(), vec!["kill a".to_string()]);
    assert_eq!(scheduler.handle_id("menu"), Some(b));

    let events = scheduler.tick(0.0);
    assert_eq!(
        events,
        vec![
            SequenceEvent::Started {
                resource: "menu".into(),
                handle: a
            },
            SequenceEvent::Killed {
                resource: "menu".into(),
                handle: a
            },
            SequenceEvent::Started {
                resource: "menu".into(),
                handle: b
            },
        ]
    );
}

#[test]
fn test_ignore_same_key_keeps_running_sequence() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);

    let first = scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Jump"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();
    scheduler.tick(0.5);

    let second = scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Jump"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();

    assert!(second.is_rejected());
    assert_eq!(scheduler.handle_id("notify"), first.handle());
    assert_eq!(scheduler.elapsed("notify"), Some(0.5));
    assert_eq!(
        scheduler.tick(0.0),
        vec![SequenceEvent::Rejected {
            resource: "notify".into()
        }]
    );
}

#[test]
fn test_ignore_same_key_within_one_frame() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);

    let first = scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Jump"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();
    let second = scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Jump"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();

    let handle = first.handle().unwrap();
    assert!(second.is_rejected());
    assert_eq!(scheduler.active_count(), 1);
    assert_eq!(scheduler.handle_id("notify"), Some(handle));
    assert_eq!(
        scheduler.tick(0.0),
        vec![
            SequenceEvent::Started {
                resource: "notify".into(),
                handle
            },
            SequenceEvent::Rejected {
                resource: "notify".into()
            },
        ]
    );
}

#[test]
fn test_ignore_same_key_different_key_replaces() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);

    scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Jump"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();
    let outcome = scheduler
        .play("notify", fade_in(&value, 2.0).with_key("Land"), policy::IGNORE_IF_SAME_KEY)
        .unwrap();

    assert!(!outcome.is_rejected());
    assert_eq!(scheduler.active_key("notify"), Some("Land"));
}

#[test]
fn test_crossfade_prepends_fade_out() {
    let mut scheduler = Scheduler::new();
    let volume = SharedValue::new(1.0);

    let track_b = SequenceBuilder::new()
        .append_tween(Tween::between(volume.binding(), 0.0, 1.0, 1.0))
        .into_spec()
        .with_key("trackB")
        .with_audible(volume.binding());
    scheduler
        .play("music", track_b, policy::CROSSFADE_MERGE)
        .unwrap();

    let lines = scheduler.timeline("music").unwrap().describe();
    assert_eq!(lines[0], "0..1 tween value current->0 Linear");
    assert_eq!(lines[1], "1..2 tween value 0->1 Linear");

    scheduler.tick(0.5);
    assert_eq!(volume.get(), 0.5);
    scheduler.tick(0.5);
    assert_eq!(volume.get(), 0.0);
    scheduler.tick(1.0);
    assert_eq!(volume.get(), 1.0);
    assert!(!scheduler.is_active("music"));
}

#[test]
fn test_crossfade_silent_starts_directly() {
    let mut scheduler = Scheduler::new();
    let volume = SharedValue::new(0.0);

    let spec = fade_in(&volume, 1.0).with_audible(volume.binding());
    scheduler.play("music", spec, policy::CROSSFADE_MERGE).unwrap();

    assert_eq!(scheduler.timeline("music").unwrap().len(), 1);
}

#[test]
fn test_coalesce_skips_entry_phase() {
    let mut scheduler = Scheduler::new();
    let alpha = SharedValue::new(0.0);

    let notification = || {
        SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(alpha.binding(), 0.0, 1.0, 0.5))
            })
            .phase(Phase::Hold, |b| b.append_interval(1.5))
            .phase(Phase::Exit, |b| {
                b.append_tween(Tween::to(alpha.binding(), 0.0, 0.5))
            })
            .into_spec()
            .with_category("custom")
    };

    scheduler
        .play("notify", notification(), policy::COALESCE_WHILE_VISIBLE)
        .unwrap();
    assert_eq!(scheduler.timeline("notify").unwrap().len(), 3);

    scheduler.tick(0.75);
    scheduler
        .play("notify", notification(), policy::COALESCE_WHILE_VISIBLE)
        .unwrap();

    let timeline = scheduler.timeline("notify").unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.duration(), 2.0);
    assert_eq!(alpha.get(), 1.0);
}

#[test]
fn test_coalesce_entry_only_finishes_at_once() {
    let mut scheduler = Scheduler::new();
    let alpha = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let popup = || {
        SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(alpha.binding(), 0.0, 1.0, 0.5))
            })
            .into_spec()
            .with_category("custom")
    };

    scheduler
        .play("notify", popup(), policy::COALESCE_WHILE_VISIBLE)
        .unwrap();
    scheduler.tick(0.25);

    let on_complete = hook("complete");
    let outcome = scheduler
        .play(
            "notify",
            popup().on_complete(move || on_complete()),
            policy::COALESCE_WHILE_VISIBLE,
        )
        .unwrap();
    assert!(!outcome.is_rejected());
    assert!(scheduler.timeline("notify").unwrap().is_empty());

    let events = scheduler.tick(1.0 / 60.0);
    assert!(events.iter().any(|e| matches!(e, SequenceEvent::Completed { .. })));
    assert!(!scheduler.is_active("notify"));
    assert_eq!(*log.borrow(), vec!["complete".to_string()]);
    // 入场被整体跳过，属性停在被打断时的值
    assert_eq!(alpha.get(), 0.5);
}

// -------------------------------------------------------------------------
// 生命周期
// -------------------------------------------------------------------------

#[test]
fn test_cancel_is_idempotent() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let on_kill = hook("kill");
    let on_complete = hook("complete");
    scheduler
        .play(
            "window",
            fade_in(&value, 1.0)
                .on_kill(move || on_kill())
                .on_complete(move || on_complete()),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    scheduler.cancel("window");
    scheduler.cancel("window");
    scheduler.cancel("never-used");

    assert!(!scheduler.is_active("window"));
    assert_eq!(*log.borrow(), vec!["kill".to_string()]);

    // 被打断的序列不再推进，也不会再完成
    scheduler.tick(2.0);
    assert_eq!(*log.borrow(), vec!["kill".to_string()]);
}

#[test]
fn test_lands_exactly_on_target() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let on_complete = hook("complete");
    scheduler
        .play(
            "fade",
            SequenceBuilder::new()
                .append_tween(Tween::between(value.binding(), 0.0, 1.0, 1.0))
                .into_spec()
                .on_complete(move || on_complete()),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();
    scheduler.tick(0.0);

    // 60 帧的 1/60 秒在 f32 下累加不足 1.0，最后一帧也必须落在终点
    for frame in 1..=60 {
        let events = scheduler.tick(1.0 / 60.0);
        let completed = events
            .iter()
            .any(|e| matches!(e, SequenceEvent::Completed { .. }));
        assert_eq!(completed, frame == 60, "frame {frame}");
    }

    assert_eq!(value.get(), 1.0);
    assert_eq!(scheduler.status("fade"), None);
    assert_eq!(*log.borrow(), vec!["complete".to_string()]);
}

#[test]
fn test_fractional_frames_land_on_sequence_boundaries() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play(
            "fade",
            SequenceBuilder::new()
                .append_tween(Tween::between(value.binding(), 0.0, 1.0, 0.7))
                .append_tween(Tween::to(value.binding(), 2.0, 0.3))
                .into_spec(),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    for _ in 0..7 {
        scheduler.tick(0.1);
    }
    // 第二段刚开始，只可能带上一个 ulp 的进度
    assert!((value.get() - 1.0).abs() < 1e-6);
    for _ in 0..3 {
        scheduler.tick(0.1);
    }
    assert_eq!(value.get(), 2.0);
    assert!(!scheduler.is_active("fade"));
}

#[test]
fn test_complete_runs_remaining_steps() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let callback_log = log.clone();
    let on_complete = hook("complete");
    scheduler
        .play(
            "loading",
            SequenceBuilder::new()
                .append_tween(Tween::between(value.binding(), 0.0, 1.0, 1.0))
                .append_callback(move || {
                    callback_log.borrow_mut().push("callback".to_string());
                    Ok(())
                })
                .append_tween(Tween::to(value.binding(), 0.0, 1.0))
                .into_spec()
                .on_complete(move || on_complete()),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    scheduler.tick(0.25);
    assert!(scheduler.complete("loading"));
    assert!(!scheduler.complete("loading"));

    assert_eq!(value.get(), 0.0);
    assert_eq!(
        *log.borrow(),
        vec!["callback".to_string(), "complete".to_string()]
    );
}

#[test]
fn test_callback_failure_completes_early() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let (log, hook) = recorder();

    let on_complete = hook("complete");
    let handle = scheduler
        .play(
            "menu",
            SequenceBuilder::new()
                .append_callback(|| Err("面板不存在".into()))
                .append_tween(Tween::between(value.binding(), 0.0, 1.0, 1.0))
                .into_spec()
                .on_complete(move || on_complete()),
            policy::REPLACE_ALWAYS,
        )
        .unwrap()
        .handle()
        .unwrap();
    scheduler.tick(0.0);

    let events = scheduler.tick(0.1);
    assert_eq!(
        events,
        vec![
            SequenceEvent::CallbackFailed {
                resource: "menu".into(),
                handle,
                error: CallbackError::new("面板不存在"),
            },
            SequenceEvent::Completed {
                resource: "menu".into(),
                handle,
            },
        ]
    );
    assert_eq!(value.get(), 0.0);
    assert_eq!(*log.borrow(), vec!["complete".to_string()]);
}

#[test]
fn test_pause_and_resume() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play("idle", fade_in(&value, 1.0), policy::REPLACE_ALWAYS)
        .unwrap();

    scheduler.tick(0.25);
    assert!(scheduler.pause("idle"));
    assert!(!scheduler.pause("idle"));
    scheduler.tick(0.5);
    assert_eq!(value.get(), 0.25);
    assert_eq!(scheduler.status("idle"), Some(SequenceStatus::Paused));

    assert!(scheduler.resume("idle"));
    scheduler.tick(0.25);
    assert_eq!(value.get(), 0.5);
}

#[test]
fn test_infinite_loop_never_completes() {
    let mut scheduler = Scheduler::new();
    let scale = SharedValue::new(1.0);
    scheduler
        .play(
            "idle",
            SequenceBuilder::new()
                .append_tween(Tween::between(scale.binding(), 1.0, 1.5, 0.5))
                .into_spec()
                .with_loops(Loops::Yoyo(None)),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    for _ in 0..100 {
        let events = scheduler.tick(0.125);
        assert!(!events.iter().any(|e| matches!(e, SequenceEvent::Completed { .. })));
    }
    assert!(scheduler.is_active("idle"));
    assert_eq!(scheduler.iteration("idle"), Some(25));
}

#[test]
fn test_huge_dt_on_endless_loop_returns() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play(
            "idle",
            fade_in(&value, 0.5).with_loops(Loops::Restart(None)),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    let events = scheduler.tick(1.0e9);
    assert!(!events.iter().any(|e| matches!(e, SequenceEvent::Completed { .. })));
    assert!(scheduler.is_active("idle"));
    assert_eq!(scheduler.iteration("idle"), Some(2_000_000_000));
    assert_eq!(scheduler.elapsed("idle"), Some(0.0));

    scheduler.tick(0.25);
    assert_eq!(value.get(), 0.5);
}

#[test]
fn test_huge_dt_finishes_counted_loop() {
    let mut scheduler = Scheduler::new();
    let restart = SharedValue::new(0.0);
    let yoyo = SharedValue::new(0.0);
    scheduler
        .play(
            "restart",
            fade_in(&restart, 0.5).with_loops(Loops::Restart(Some(3))),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();
    scheduler
        .play(
            "yoyo",
            fade_in(&yoyo, 0.5).with_loops(Loops::Yoyo(Some(4))),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    let events = scheduler.tick(1.0e9);
    let completed = events
        .iter()
        .filter(|e| matches!(e, SequenceEvent::Completed { .. }))
        .count();
    assert_eq!(completed, 2);
    assert_eq!(restart.get(), 1.0);
    // 偶数轮往返结束在起点
    assert_eq!(yoyo.get(), 0.0);
}

#[test]
fn test_delay_postpones_start() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play(
            "cloud",
            fade_in(&value, 1.0).with_delay(0.5),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    scheduler.tick(0.25);
    assert_eq!(value.get(), 0.0);
    assert_eq!(scheduler.elapsed("cloud"), Some(0.0));

    // 剩余的 0.25 秒延迟被扣除后，多出的时间计入第一轮
    scheduler.tick(0.5);
    assert_eq!(value.get(), 0.25);
    assert_eq!(scheduler.elapsed("cloud"), Some(0.25));
}

#[test]
fn test_delay_runs_once_before_endless_yoyo() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play(
            "star",
            fade_in(&value, 1.0)
                .with_loops(Loops::Yoyo(None))
                .with_delay(0.75),
            policy::REPLACE_ALWAYS,
        )
        .unwrap();

    scheduler.tick(0.75);
    assert_eq!(value.get(), 0.0);
    scheduler.tick(1.0);
    assert_eq!(value.get(), 1.0);
    assert_eq!(scheduler.iteration("star"), Some(1));

    // 第二轮直接反向，不再等待
    scheduler.tick(0.5);
    assert_eq!(value.get(), 0.5);
    scheduler.tick(0.5);
    assert_eq!(value.get(), 0.0);
    assert_eq!(scheduler.iteration("star"), Some(2));
    assert!(scheduler.is_active("star"));
}

#[test]
fn test_invalid_dt_is_ignored() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    scheduler
        .play("fade", fade_in(&value, 1.0), policy::REPLACE_ALWAYS)
        .unwrap();

    scheduler.tick(-1.0);
    scheduler.tick(f32::NAN);
    scheduler.tick(0.0);

    assert_eq!(scheduler.elapsed("fade"), Some(0.0));
    assert_eq!(value.get(), 0.0);
}

#[test]
fn test_cancel_all() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    for resource in ["a", "b", "c"] {
        scheduler
            .play(resource, fade_in(&value, 1.0), policy::REPLACE_ALWAYS)
            .unwrap();
    }
    assert_eq!(scheduler.active_count(), 3);

    scheduler.cancel_all();
    assert_eq!(scheduler.active_count(), 0);
    assert_eq!(scheduler.resources().count(), 3);
}

// -------------------------------------------------------------------------
// 错误处理
// -------------------------------------------------------------------------

#[test]
fn test_unknown_policy() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);

    let result = scheduler.play("menu", fade_in(&value, 1.0), "shuffle");
    assert_eq!(result, Err(ScheduleError::UnknownPolicy("shuffle".to_string())));
    assert_eq!(scheduler.active_count(), 0);
    assert!(scheduler.tick(0.0).is_empty());
}

#[test]
fn test_invalid_spec_does_not_touch_active() {
    let mut scheduler = Scheduler::new();
    let value = SharedValue::new(0.0);
    let id = scheduler
        .play("menu", fade_in(&value, 1.0), policy::REPLACE_ALWAYS)
        .unwrap()
        .handle();
    scheduler.tick(0.0);

    let empty = AnimationSpec::new(SequenceNode::sequential(Vec::new()));
    assert_eq!(
        scheduler.play("menu", empty, policy::REPLACE_ALWAYS),
        Err(ScheduleError::InvalidSpec(SpecError::Empty))
    );

    let nan = fade_in(&value, f32::NAN);
    assert!(matches!(
        scheduler.play("menu", nan, policy::REPLACE_ALWAYS),
        Err(ScheduleError::InvalidSpec(SpecError::NonFiniteDuration { index: 0, .. }))
    ));

    assert_eq!(scheduler.handle_id("menu"), id);
    assert!(scheduler.tick(0.0).is_empty());
}

#[test]
fn test_register_custom_policy() {
    let mut scheduler = Scheduler::new();
    scheduler.register_policy("music_slow", InterruptPolicy::crossfade(2.0));

    assert_eq!(
        scheduler.policy("music_slow"),
        Some(&InterruptPolicy::crossfade(2.0))
    );
    assert!(scheduler.policy(policy::REPLACE_ALWAYS).is_some());
}
