//! # Handle 模块
//!
//! 单个序列的执行状态：时间轴游标、条目进度、循环计数。

use tracing::warn;

use super::{HandleId, SequenceStatus};
use crate::easing::punch_curve;
use crate::error::CallbackError;
use crate::policy::ActiveSnapshot;
use crate::spec::{AnimationSpec, Hook, Loops, Step};
use crate::timeline::{Timeline, TimelineEntry};

/// 到达时间点的容差（相对值）
///
/// 帧间隔是 f32，累加后会与条目端点相差几个 ulp；落在容差内即视为已到达。
const TIME_TOLERANCE: f64 = 1e-6;

/// 单次推进最多处理的轮数
///
/// 整轮会被直接跳过，正常情况下每次推进只需要两三轮。
const MAX_PASSES_PER_ADVANCE: u32 = 64;

/// 条目进度
#[derive(Debug, Clone, Copy, PartialEq)]
enum EntryState {
    Pending,
    /// 已开始；补间记录本轮起点值，冲击记录静止值
    Running { origin: f32 },
    Done,
}

/// 一次推进的结果
#[derive(Debug)]
pub(crate) enum Advance {
    Running,
    Finished,
    Aborted(CallbackError),
}

/// 序列执行状态
///
/// 由调度器独占持有；外部只能通过资源 ID 间接操作。
pub(crate) struct SequenceHandle {
    pub(crate) id: HandleId,
    key: Option<String>,
    category: Option<String>,
    timeline: Timeline,
    states: Vec<EntryState>,
    /// 补间第一次开始时采样的起点值（往返循环需要）
    captured: Vec<Option<f32>>,
    loops: Loops,
    iteration: u32,
    /// 首轮开始前还需等待的时间
    delay_remaining: f64,
    /// 当前轮内已经过的时间（f64 累加，避免帧间隔的舍入误差堆积）
    elapsed: f64,
    status: SequenceStatus,
    on_complete: Option<Hook>,
    on_kill: Option<Hook>,
}

impl SequenceHandle {
    pub(crate) fn new(id: HandleId, spec: AnimationSpec) -> Self {
        let timeline = Timeline::flatten(&spec.root);
        let len = timeline.len();
        Self {
            id,
            key: spec.key,
            category: spec.category,
            timeline,
            states: vec![EntryState::Pending; len],
            captured: vec![None; len],
            loops: spec.loops,
            iteration: 0,
            delay_remaining: f64::from(spec.delay.max(0.0)),
            elapsed: 0.0,
            status: SequenceStatus::Running,
            on_complete: spec.on_complete,
            on_kill: spec.on_kill,
        }
    }

    pub(crate) fn status(&self) -> SequenceStatus {
        self.status
    }

    pub(crate) fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub(crate) fn iteration(&self) -> u32 {
        self.iteration
    }

    pub(crate) fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub(crate) fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub(crate) fn snapshot(&self) -> ActiveSnapshot {
        ActiveSnapshot {
            handle: self.id,
            key: self.key.clone(),
            category: self.category.clone(),
            status: self.status,
            elapsed: self.elapsed as f32,
        }
    }

    pub(crate) fn pause(&mut self) -> bool {
        if self.status == SequenceStatus::Running {
            self.status = SequenceStatus::Paused;
            true
        } else {
            false
        }
    }

    pub(crate) fn resume(&mut self) -> bool {
        if self.status == SequenceStatus::Paused {
            self.status = SequenceStatus::Running;
            true
        } else {
            false
        }
    }

    /// 标记为被打断，返回需要调用的 on_kill
    pub(crate) fn kill(&mut self) -> Option<Hook> {
        if self.status.is_finished() {
            return None;
        }
        self.status = SequenceStatus::Killed;
        self.on_complete = None;
        self.on_kill.take()
    }

    /// 标记为完成，返回需要调用的 on_complete
    pub(crate) fn finish(&mut self) -> Option<Hook> {
        if self.status.is_finished() {
            return None;
        }
        self.status = SequenceStatus::Completed;
        self.on_kill = None;
        self.on_complete.take()
    }

    /// 推进 `dt` 秒
    ///
    /// `dt <= 0` 或已暂停时不改变任何状态。
    /// 无论 `dt` 多大都会在有限步内返回：跨越的整轮直接计入轮次而不逐轮执行。
    pub(crate) fn advance(&mut self, dt: f32) -> Advance {
        if self.status != SequenceStatus::Running || dt <= 0.0 {
            return Advance::Running;
        }

        let mut dt = f64::from(dt);
        if self.delay_remaining > 0.0 {
            let waited = dt.min(self.delay_remaining);
            self.delay_remaining -= waited;
            dt -= waited;
            if self.delay_remaining > TIME_TOLERANCE {
                return Advance::Running;
            }
            self.delay_remaining = 0.0;
            if dt <= 0.0 {
                return Advance::Running;
            }
        }

        self.elapsed += dt;
        for _ in 0..MAX_PASSES_PER_ADVANCE {
            if let Err(error) = self.process(self.elapsed) {
                return Advance::Aborted(error);
            }

            let duration = self.timeline.duration();
            let all_done = self.states.iter().all(|s| *s == EntryState::Done);
            if !all_done || !reached(self.elapsed, duration) {
                return Advance::Running;
            }

            if !self.has_next_iteration() {
                return Advance::Finished;
            }

            self.begin_next_iteration();
            if duration <= 0.0 {
                // 零时长循环每帧只跑一轮
                self.elapsed = 0.0;
                return Advance::Running;
            }
            self.wrap_into_iteration(f64::from(duration));
        }

        warn!(handle = %self.id, "单次推进轮数达到上限，剩余时间顺延到下一帧");
        Advance::Running
    }

    /// 把溢出时间折回新一轮
    ///
    /// 溢出超过一整轮时，完整的轮直接计入轮次（不会超过剩余轮数），
    /// 剩下不足一轮的部分留给下一次 `process`。
    fn wrap_into_iteration(&mut self, duration: f64) {
        let overflow = (self.elapsed - duration).max(0.0);
        let whole = (overflow / duration).floor();
        let skippable = match self.loops.iterations() {
            None => u32::MAX - self.iteration,
            // 至少留下最后一轮正常执行，以便写入终点值
            Some(total) => total.saturating_sub(self.iteration + 1),
        };
        let skip = whole.min(f64::from(skippable)) as u32;

        self.iteration += skip;
        self.elapsed = if skip > 0 && f64::from(skip) == whole {
            overflow.rem_euclid(duration)
        } else {
            (overflow - f64::from(skip) * duration).max(0.0)
        };
    }

    /// 立即跑完当前轮：未完成的补间写入终点值，未执行的回调依次执行
    pub(crate) fn force_complete(&mut self) -> Result<(), CallbackError> {
        let reversed = self.is_reversed();
        for index in 0..self.states.len() {
            if self.states[index] == EntryState::Done {
                continue;
            }
            self.states[index] = EntryState::Done;

            let entry = &self.timeline.entries()[index];
            match &entry.step {
                Step::Tween(tween) => {
                    let to = if reversed {
                        self.captured[index].or(tween.from).unwrap_or(tween.to)
                    } else {
                        tween.to
                    };
                    tween.property.set(to);
                }
                Step::Punch(punch) => {
                    if let Some(rest) = self.captured[index] {
                        punch.property.set(rest);
                    }
                }
                Step::Wait(_) => {}
                Step::Callback(f) => f()?,
            }
        }
        self.delay_remaining = 0.0;
        self.elapsed = f64::from(self.timeline.duration());
        Ok(())
    }

    fn is_reversed(&self) -> bool {
        self.loops.is_yoyo() && self.iteration % 2 == 1
    }

    fn has_next_iteration(&self) -> bool {
        match self.loops.iterations() {
            None => true,
            Some(total) => self.iteration + 1 < total,
        }
    }

    fn begin_next_iteration(&mut self) {
        self.iteration = self.iteration.saturating_add(1);
        self.states.fill(EntryState::Pending);
    }

    /// 处理所有开始时间不晚于 `elapsed` 的条目
    fn process(&mut self, elapsed: f64) -> Result<(), CallbackError> {
        let reversed = self.is_reversed();

        for index in 0..self.states.len() {
            let entry = &self.timeline.entries()[index];
            if !reached(elapsed, entry.start) {
                // 条目按开始时间排序，后面的都还没到
                break;
            }
            if self.states[index] == EntryState::Done {
                continue;
            }

            let finished = reached(elapsed, entry.end);
            match &entry.step {
                Step::Tween(tween) => {
                    let origin = match self.states[index] {
                        EntryState::Running { origin } => origin,
                        _ => {
                            let start = self.captured[index]
                                .or(tween.from)
                                .or_else(|| tween.property.get())
                                .unwrap_or(tween.to);
                            self.captured[index] = Some(start);
                            if reversed { tween.to } else { start }
                        }
                    };
                    let target = if reversed {
                        self.captured[index].unwrap_or(tween.to)
                    } else {
                        tween.to
                    };

                    if finished {
                        tween.property.set(target);
                        self.states[index] = EntryState::Done;
                    } else {
                        let progress = tween.easing.apply(local_progress(entry, elapsed));
                        tween.property.set(origin + (target - origin) * progress);
                        self.states[index] = EntryState::Running { origin };
                    }
                }
                Step::Punch(punch) => {
                    let rest = match self.states[index] {
                        EntryState::Running { origin } => origin,
                        _ => {
                            let rest = punch.property.get().unwrap_or(0.0);
                            self.captured[index] = Some(rest);
                            rest
                        }
                    };

                    if finished {
                        punch.property.set(rest);
                        self.states[index] = EntryState::Done;
                    } else {
                        let offset = punch_curve(
                            local_progress(entry, elapsed),
                            punch.vibrato,
                            punch.elasticity,
                        );
                        punch.property.set(rest + punch.amplitude * offset);
                        self.states[index] = EntryState::Running { origin: rest };
                    }
                }
                Step::Wait(_) => {
                    self.states[index] = if finished {
                        EntryState::Done
                    } else {
                        EntryState::Running { origin: 0.0 }
                    };
                }
                Step::Callback(f) => {
                    self.states[index] = EntryState::Done;
                    f()?;
                }
            }
        }
        Ok(())
    }
}

/// `elapsed` 是否已到达时间点 `at`（含容差）
fn reached(elapsed: f64, at: f32) -> bool {
    let at = f64::from(at);
    at - elapsed <= TIME_TOLERANCE * at.abs().max(1.0)
}

/// 条目内的线性进度，限制在 `[0, 1]`
fn local_progress(entry: &TimelineEntry, elapsed: f64) -> f32 {
    let duration = f64::from(entry.end - entry.start);
    if duration <= 0.0 {
        return 1.0;
    }
    ((elapsed - f64::from(entry.start)) / duration).clamp(0.0, 1.0) as f32
}
