//! # Seq Runtime
//!
//! UI 动画序列调度的核心库。
//!
//! ## 架构概述
//!
//! `seq-runtime` 是纯逻辑核心，不依赖任何渲染或音频后端。
//! 宿主把可动画的对象包装为 [`Animatable`]，把动画描述为 [`AnimationSpec`]，
//! 再以资源 ID 为键交给 [`Scheduler`]：
//!
//! ```text
//! Host                              Scheduler
//!   │                                  │
//!   │── play(resource, spec, policy) ─►│ 策略决策（打断 / 忽略 / 合并）
//!   │                                  │
//!   │── tick(dt) ─────────────────────►│ 推进时间轴，写入属性
//!   │◄─ Vec<SequenceEvent> ────────────│
//! ```
//!
//! 同一资源任意时刻最多只有一个活跃序列；新请求如何对待旧序列由
//! [`InterruptPolicy`] 决定。
//!
//! ## 使用示例
//!
//! ```ignore
//! use seq_runtime::{Scheduler, SequenceBuilder, SharedValue, Tween, policy};
//!
//! let alpha = SharedValue::new(0.0);
//! let spec = SequenceBuilder::new()
//!     .append_tween(Tween::between(alpha.binding(), 0.0, 1.0, 0.4))
//!     .append_interval(1.5)
//!     .append_tween(Tween::to(alpha.binding(), 0.0, 0.4))
//!     .into_spec()
//!     .with_key("Jump");
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.play("notify", spec, policy::IGNORE_IF_SAME_KEY)?;
//!
//! loop {
//!     for event in scheduler.tick(frame_dt) {
//!         // ...
//!     }
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`easing`]：缓动曲线
//! - [`property`]：可动画属性与绑定
//! - [`spec`]：序列描述与构建器
//! - [`timeline`]：序列树展开
//! - [`policy`]：打断策略
//! - [`scheduler`]：调度器
//! - [`error`]：错误类型定义

pub mod easing;
pub mod error;
pub mod policy;
pub mod property;
pub mod resource;
pub mod scheduler;
pub mod spec;
pub mod timeline;

// 重导出核心类型
pub use easing::{EasingFunction, punch_curve};
pub use error::{CallbackError, CallbackResult, ScheduleError, ScheduleResult, SpecError};
pub use policy::{ActiveSnapshot, Decision, InterruptPolicy, RequestMeta};
pub use property::{Animatable, PropertyBinding, SharedValue};
pub use resource::ResourceId;
pub use scheduler::{HandleId, PlayOutcome, Scheduler, SequenceEvent, SequenceStatus};
pub use spec::{
    AnimationSpec, GroupMode, Hook, Loops, Phase, Punch, SequenceBuilder, SequenceNode, Step,
    StepCallback, Tween,
};
pub use timeline::{Timeline, TimelineEntry};
