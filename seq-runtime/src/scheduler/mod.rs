//! # Scheduler 模块
//!
//! 序列调度器：以资源为键管理活跃序列，按打断策略处理新的播放请求。
//!
//! ## 执行模型
//!
//! 单线程协作式：`play` / `cancel` / `tick` 都在宿主的每帧更新回调中调用，
//! 不需要任何锁。钩子（on_kill / on_complete / 回调步骤）在触发它们的调用内同步执行。
//!
//! ```rust,ignore
//! let mut scheduler = Scheduler::new();
//! scheduler.play("notify", spec, policy::IGNORE_IF_SAME_KEY)?;
//!
//! // 每帧
//! for event in scheduler.tick(dt) {
//!     debug!(?event, "序列事件");
//! }
//! ```

mod handle;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, error, warn};

use crate::error::{CallbackError, ScheduleError, ScheduleResult};
use crate::policy::{self, Decision, InterruptPolicy, RequestMeta};
use crate::resource::ResourceId;
use crate::spec::{AnimationSpec, Hook};
use crate::timeline::Timeline;

use handle::{Advance, SequenceHandle};

/// 序列句柄 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 序列状态
///
/// `Completed` 与 `Killed` 互斥，且只会进入一次。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Paused,
    Completed,
    Killed,
}

impl SequenceStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Killed)
    }
}

/// `play` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Started(HandleId),
    /// 被策略忽略，没有任何状态变化
    Rejected,
}

impl PlayOutcome {
    pub fn handle(&self) -> Option<HandleId> {
        match self {
            Self::Started(id) => Some(*id),
            Self::Rejected => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// 调度事件
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceEvent {
    Started {
        resource: ResourceId,
        handle: HandleId,
    },
    Rejected {
        resource: ResourceId,
    },
    Killed {
        resource: ResourceId,
        handle: HandleId,
    },
    /// 回调步骤失败，序列随后以 `Completed` 提前结束
    CallbackFailed {
        resource: ResourceId,
        handle: HandleId,
        error: CallbackError,
    },
    Completed {
        resource: ResourceId,
        handle: HandleId,
    },
}

/// 序列调度器
pub struct Scheduler {
    /// 资源槽位（ResourceId -> 活跃序列）
    slots: BTreeMap<ResourceId, Option<SequenceHandle>>,
    /// 已注册的打断策略
    policies: HashMap<String, InterruptPolicy>,
    /// 下一个句柄 ID
    next_handle_id: u64,
    /// 待处理的事件队列
    events: Vec<SequenceEvent>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("slots", &self.slots.len())
            .field("active", &self.active_count())
            .field("policies", &self.policies.len())
            .finish()
    }
}

impl Scheduler {
    /// 创建调度器，并注册四个内置策略
    pub fn new() -> Self {
        let mut policies = HashMap::new();
        policies.insert(policy::REPLACE_ALWAYS.to_string(), InterruptPolicy::ReplaceAlways);
        policies.insert(
            policy::IGNORE_IF_SAME_KEY.to_string(),
            InterruptPolicy::IgnoreIfSameKey,
        );
        policies.insert(
            policy::CROSSFADE_MERGE.to_string(),
            InterruptPolicy::crossfade(policy::DEFAULT_CROSSFADE_OUT),
        );
        policies.insert(
            policy::COALESCE_WHILE_VISIBLE.to_string(),
            InterruptPolicy::CoalesceWhileVisible,
        );

        Self {
            slots: BTreeMap::new(),
            policies,
            next_handle_id: 1,
            events: Vec::new(),
        }
    }

    fn next_handle_id(&mut self) -> HandleId {
        let id = HandleId(self.next_handle_id);
        self.next_handle_id += 1;
        id
    }

    // ========== 策略管理 ==========

    /// 注册（或覆盖）打断策略
    pub fn register_policy(&mut self, id: impl Into<String>, policy: InterruptPolicy) {
        self.policies.insert(id.into(), policy);
    }

    pub fn policy(&self, id: &str) -> Option<&InterruptPolicy> {
        self.policies.get(id)
    }

    // ========== 播放控制 ==========

    /// 按策略 ID 播放
    ///
    /// # 返回
    /// - `Ok(Started(id))`: 新序列已登记到资源槽位
    /// - `Ok(Rejected)`: 被策略忽略
    /// - `Err(..)`: 策略未注册或描述不合法，状态未改变
    pub fn play(
        &mut self,
        resource: impl Into<ResourceId>,
        spec: AnimationSpec,
        policy_id: &str,
    ) -> ScheduleResult<PlayOutcome> {
        let policy = self
            .policies
            .get(policy_id)
            .cloned()
            .ok_or_else(|| ScheduleError::UnknownPolicy(policy_id.to_string()))?;
        self.play_with(resource, spec, &policy)
    }

    /// 按给定策略播放
    pub fn play_with(
        &mut self,
        resource: impl Into<ResourceId>,
        spec: AnimationSpec,
        policy: &InterruptPolicy,
    ) -> ScheduleResult<PlayOutcome> {
        let resource = resource.into();
        if let Err(e) = spec.validate() {
            warn!(resource = %resource, error = %e, "拒绝无效的动画序列");
            return Err(e.into());
        }

        let existing = self
            .slots
            .get(&resource)
            .and_then(Option::as_ref)
            .map(SequenceHandle::snapshot);
        let request = RequestMeta::from_spec(&spec);

        let spec = match policy.decide(existing.as_ref(), &request) {
            Decision::Ignore => {
                debug!(resource = %resource, key = ?request.key, "请求被策略忽略");
                self.events.push(SequenceEvent::Rejected { resource });
                return Ok(PlayOutcome::Rejected);
            }
            Decision::Start => spec,
            Decision::MergeBefore(extra) => spec.prepended(extra),
            Decision::StartWithoutEntry => spec.without_entry(),
        };

        self.kill_slot(resource.as_str());

        let id = self.next_handle_id();
        let handle = SequenceHandle::new(id, spec);
        debug!(
            resource = %resource,
            handle = %id,
            steps = handle.timeline().len(),
            duration = handle.timeline().duration(),
            "序列开始"
        );
        self.slots.insert(resource.clone(), Some(handle));
        self.events.push(SequenceEvent::Started {
            resource,
            handle: id,
        });

        Ok(PlayOutcome::Started(id))
    }

    /// 取消资源上的活跃序列
    ///
    /// 没有活跃序列时什么也不做；重复调用是安全的。
    pub fn cancel(&mut self, resource: &str) {
        self.kill_slot(resource);
    }

    /// 取消所有活跃序列
    pub fn cancel_all(&mut self) {
        let resources: Vec<ResourceId> = self
            .slots
            .iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(resource, _)| resource.clone())
            .collect();
        for resource in resources {
            self.kill_slot(resource.as_str());
        }
    }

    /// 立即跑完资源上的活跃序列并触发 on_complete
    ///
    /// 返回是否存在活跃序列。
    pub fn complete(&mut self, resource: &str) -> bool {
        let Some(mut handle) = self.take_handle(resource) else {
            return false;
        };
        let resource = ResourceId::from(resource);

        if let Err(e) = handle.force_complete() {
            error!(resource = %resource, handle = %handle.id, error = %e, "回调执行失败");
            self.events.push(SequenceEvent::CallbackFailed {
                resource: resource.clone(),
                handle: handle.id,
                error: e,
            });
        }
        self.finish_handle(resource, handle);
        true
    }

    /// 暂停资源上的活跃序列
    pub fn pause(&mut self, resource: &str) -> bool {
        self.handle_mut(resource).is_some_and(|h| h.pause())
    }

    /// 恢复资源上已暂停的序列
    pub fn resume(&mut self, resource: &str) -> bool {
        self.handle_mut(resource).is_some_and(|h| h.resume())
    }

    /// 推进所有活跃序列
    ///
    /// # 返回
    /// 自上次 `tick` 以来产生的事件（包括 `play` / `cancel` 产生的）
    pub fn tick(&mut self, dt: f32) -> Vec<SequenceEvent> {
        if !dt.is_finite() || dt < 0.0 {
            warn!(dt = dt, "忽略无效的帧间隔");
            return std::mem::take(&mut self.events);
        }
        if dt == 0.0 {
            return std::mem::take(&mut self.events);
        }

        let mut finished: Vec<(ResourceId, Option<CallbackError>)> = Vec::new();
        for (resource, slot) in self.slots.iter_mut() {
            let Some(handle) = slot.as_mut() else {
                continue;
            };
            match handle.advance(dt) {
                Advance::Running => {}
                Advance::Finished => finished.push((resource.clone(), None)),
                Advance::Aborted(e) => finished.push((resource.clone(), Some(e))),
            }
        }

        for (resource, failure) in finished {
            let Some(handle) = self.take_handle(resource.as_str()) else {
                continue;
            };
            if let Some(e) = failure {
                error!(
                    resource = %resource,
                    handle = %handle.id,
                    error = %e,
                    "回调执行失败，序列提前结束"
                );
                self.events.push(SequenceEvent::CallbackFailed {
                    resource: resource.clone(),
                    handle: handle.id,
                    error: e,
                });
            }
            self.finish_handle(resource, handle);
        }

        std::mem::take(&mut self.events)
    }

    /// 清空所有序列（触发 on_kill）并丢弃未读事件
    pub fn clear(&mut self) {
        self.cancel_all();
        self.slots.clear();
        self.events.clear();
    }

    // ========== 查询方法 ==========

    /// 资源上是否有活跃序列
    pub fn is_active(&self, resource: &str) -> bool {
        self.handle(resource).is_some()
    }

    /// 活跃序列数量
    pub fn active_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_some()).count()
    }

    /// 资源上活跃序列的状态
    pub fn status(&self, resource: &str) -> Option<SequenceStatus> {
        self.handle(resource).map(SequenceHandle::status)
    }

    /// 资源上活跃序列的句柄 ID
    pub fn handle_id(&self, resource: &str) -> Option<HandleId> {
        self.handle(resource).map(|h| h.id)
    }

    /// 活跃序列在当前轮内已经过的时间
    pub fn elapsed(&self, resource: &str) -> Option<f32> {
        self.handle(resource).map(SequenceHandle::elapsed)
    }

    /// 活跃序列的循环轮次（从 0 开始）
    pub fn iteration(&self, resource: &str) -> Option<u32> {
        self.handle(resource).map(SequenceHandle::iteration)
    }

    /// 活跃序列的身份键
    pub fn active_key(&self, resource: &str) -> Option<&str> {
        self.handle(resource).and_then(SequenceHandle::key)
    }

    /// 活跃序列展开后的时间轴
    pub fn timeline(&self, resource: &str) -> Option<&Timeline> {
        self.handle(resource).map(SequenceHandle::timeline)
    }

    /// 所有出现过的资源（包括当前空闲的）
    pub fn resources(&self) -> impl Iterator<Item = &ResourceId> {
        self.slots.keys()
    }

    // ========== 内部工具 ==========

    fn handle(&self, resource: &str) -> Option<&SequenceHandle> {
        self.slots.get(resource).and_then(Option::as_ref)
    }

    fn handle_mut(&mut self, resource: &str) -> Option<&mut SequenceHandle> {
        self.slots.get_mut(resource).and_then(Option::as_mut)
    }

    fn take_handle(&mut self, resource: &str) -> Option<SequenceHandle> {
        self.slots.get_mut(resource).and_then(Option::take)
    }

    /// 打断并移除资源上的序列，触发 on_kill
    fn kill_slot(&mut self, resource: &str) {
        let Some(mut handle) = self.take_handle(resource) else {
            return;
        };
        debug!(resource = resource, handle = %handle.id, "序列被打断");
        self.events.push(SequenceEvent::Killed {
            resource: ResourceId::from(resource),
            handle: handle.id,
        });
        run_hook(handle.kill());
    }

    /// 标记完成，触发 on_complete（槽位已清空）
    fn finish_handle(&mut self, resource: ResourceId, mut handle: SequenceHandle) {
        debug!(resource = %resource, handle = %handle.id, "序列完成");
        let hook = handle.finish();
        self.events.push(SequenceEvent::Completed {
            resource,
            handle: handle.id,
        });
        run_hook(hook);
    }
}

fn run_hook(hook: Option<Hook>) {
    if let Some(hook) = hook {
        hook();
    }
}

#[cfg(test)]
mod tests;
