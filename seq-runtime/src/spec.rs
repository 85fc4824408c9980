//! # Spec 模块
//!
//! 动画序列的声明式描述。
//!
//! ## 核心概念
//!
//! - `Step`: 最小执行单元（补间 / 冲击 / 等待 / 回调）
//! - `SequenceNode`: 步骤组成的树，组内顺序或并行执行
//! - `SequenceBuilder`: 仿补间库 Sequence API 的构建器（append / join / interval）
//! - `AnimationSpec`: 提交给调度器的完整描述，附带身份元数据与生命周期钩子
//!
//! 描述一旦提交就不再修改；调度器只会基于它生成新的描述（前置步骤、去掉入场阶段）。

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::error::{CallbackResult, SpecError};
use crate::property::PropertyBinding;

/// 回调步骤
pub type StepCallback = Rc<dyn Fn() -> CallbackResult>;

/// 生命周期钩子（on_complete / on_kill）
pub type Hook = Rc<dyn Fn()>;

/// 补间：把属性从 `from` 插值到 `to`
#[derive(Debug, Clone)]
pub struct Tween {
    pub property: PropertyBinding,
    /// `None` 表示在步骤开始时读取属性当前值
    pub from: Option<f32>,
    pub to: f32,
    pub duration: f32,
    pub easing: EasingFunction,
}

impl Tween {
    /// 从当前值补间到 `to`
    pub fn to(property: PropertyBinding, to: f32, duration: f32) -> Self {
        Self {
            property,
            from: None,
            to,
            duration,
            easing: EasingFunction::default(),
        }
    }

    /// 从 `from` 补间到 `to`
    pub fn between(property: PropertyBinding, from: f32, to: f32, duration: f32) -> Self {
        Self {
            from: Some(from),
            ..Self::to(property, to, duration)
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }
}

/// 冲击：围绕静止值振荡后回到静止值
#[derive(Debug, Clone)]
pub struct Punch {
    pub property: PropertyBinding,
    pub amplitude: f32,
    pub duration: f32,
    pub vibrato: u32,
    pub elasticity: f32,
}

impl Punch {
    pub fn new(property: PropertyBinding, amplitude: f32, duration: f32) -> Self {
        Self {
            property,
            amplitude,
            duration,
            vibrato: 10,
            elasticity: 1.0,
        }
    }

    pub fn with_vibrato(mut self, vibrato: u32) -> Self {
        self.vibrato = vibrato;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }
}

/// 执行步骤
#[derive(Clone)]
pub enum Step {
    Tween(Tween),
    Punch(Punch),
    Wait(f32),
    Callback(StepCallback),
}

impl Step {
    /// 步骤时长，负数视为 0（瞬时步骤）
    pub fn duration(&self) -> f32 {
        let raw = match self {
            Step::Tween(tween) => tween.duration,
            Step::Punch(punch) => punch.duration,
            Step::Wait(duration) => *duration,
            Step::Callback(_) => 0.0,
        };
        raw.max(0.0)
    }

    /// 调试用简短描述
    pub fn label(&self) -> String {
        match self {
            Step::Tween(tween) => {
                let from = tween
                    .from
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "current".to_string());
                format!(
                    "tween {} {}->{} {:?}",
                    tween.property.property_id(),
                    from,
                    tween.to,
                    tween.easing
                )
            }
            Step::Punch(punch) => format!(
                "punch {} ±{}",
                punch.property.property_id(),
                punch.amplitude
            ),
            Step::Wait(_) => "wait".to_string(),
            Step::Callback(_) => "callback".to_string(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), SpecError> {
        let raw_duration = match self {
            Step::Tween(tween) => tween.duration,
            Step::Punch(punch) => punch.duration,
            Step::Wait(duration) => *duration,
            Step::Callback(_) => 0.0,
        };
        if !raw_duration.is_finite() {
            return Err(SpecError::NonFiniteDuration {
                index,
                value: raw_duration,
            });
        }

        let (property, values) = match self {
            Step::Tween(tween) => (tween.property.property_id(), vec![tween.from, Some(tween.to)]),
            Step::Punch(punch) => (
                punch.property.property_id(),
                vec![Some(punch.amplitude), Some(punch.elasticity)],
            ),
            _ => return Ok(()),
        };
        match values.into_iter().flatten().find(|v| !v.is_finite()) {
            Some(value) => Err(SpecError::NonFiniteValue {
                index,
                property: property.to_string(),
                value,
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Tween(tween) => f.debug_tuple("Tween").field(tween).finish(),
            Step::Punch(punch) => f.debug_tuple("Punch").field(punch).finish(),
            Step::Wait(duration) => f.debug_tuple("Wait").field(duration).finish(),
            Step::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// 组内执行方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// 依次执行，组时长为子节点时长之和
    Sequential,
    /// 同时开始，组时长为最长子节点时长
    Parallel,
}

/// 阶段标记
///
/// `CoalesceWhileVisible` 策略会去掉 `Entry` 阶段，直接进入停留/退场。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Entry,
    Hold,
    Exit,
}

/// 序列树节点
#[derive(Clone)]
pub enum SequenceNode {
    Leaf(Step),
    Group {
        children: Vec<SequenceNode>,
        mode: GroupMode,
    },
    Delay(f32),
    Callback(StepCallback),
    Marked {
        phase: Phase,
        node: Box<SequenceNode>,
    },
}

impl SequenceNode {
    pub fn tween(tween: Tween) -> Self {
        Self::Leaf(Step::Tween(tween))
    }

    pub fn punch(punch: Punch) -> Self {
        Self::Leaf(Step::Punch(punch))
    }

    pub fn callback(f: impl Fn() -> CallbackResult + 'static) -> Self {
        Self::Callback(Rc::new(f))
    }

    pub fn sequential(children: Vec<SequenceNode>) -> Self {
        Self::Group {
            children,
            mode: GroupMode::Sequential,
        }
    }

    pub fn parallel(children: Vec<SequenceNode>) -> Self {
        Self::Group {
            children,
            mode: GroupMode::Parallel,
        }
    }

    pub fn marked(phase: Phase, node: SequenceNode) -> Self {
        Self::Marked {
            phase,
            node: Box::new(node),
        }
    }

    /// 叶子步骤数量（Delay / Callback 也计入）
    pub fn step_count(&self) -> usize {
        match self {
            Self::Leaf(_) | Self::Delay(_) | Self::Callback(_) => 1,
            Self::Group { children, .. } => children.iter().map(Self::step_count).sum(),
            Self::Marked { node, .. } => node.step_count(),
        }
    }

    /// 去掉指定阶段的所有节点，剩余为空时返回 `None`
    pub fn without_phase(&self, phase: Phase) -> Option<SequenceNode> {
        match self {
            Self::Marked { phase: p, .. } if *p == phase => None,
            Self::Marked { phase: p, node } => node
                .without_phase(phase)
                .map(|inner| Self::marked(*p, inner)),
            Self::Group { children, mode } => {
                let kept: Vec<_> = children
                    .iter()
                    .filter_map(|child| child.without_phase(phase))
                    .collect();
                (!kept.is_empty()).then(|| Self::Group {
                    children: kept,
                    mode: *mode,
                })
            }
            other => Some(other.clone()),
        }
    }

    /// 按展开顺序访问每个叶子步骤
    pub(crate) fn visit_steps(
        &self,
        visit: &mut dyn FnMut(&Step) -> Result<(), SpecError>,
    ) -> Result<(), SpecError> {
        match self {
            Self::Leaf(step) => visit(step),
            Self::Delay(duration) => visit(&Step::Wait(*duration)),
            Self::Callback(f) => visit(&Step::Callback(f.clone())),
            Self::Group { children, .. } => {
                for child in children {
                    child.visit_steps(visit)?;
                }
                Ok(())
            }
            Self::Marked { node, .. } => node.visit_steps(visit),
        }
    }
}

impl fmt::Debug for SequenceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(step) => f.debug_tuple("Leaf").field(step).finish(),
            Self::Group { children, mode } => f
                .debug_struct("Group")
                .field("mode", mode)
                .field("children", children)
                .finish(),
            Self::Delay(duration) => f.debug_tuple("Delay").field(duration).finish(),
            Self::Callback(_) => f.write_str("Callback"),
            Self::Marked { phase, node } => f
                .debug_struct("Marked")
                .field("phase", phase)
                .field("node", node)
                .finish(),
        }
    }
}

/// 序列构建器
///
/// 顶层按 append 顺序依次执行；`join` 让新步骤与上一个 append 的步骤同时开始。
///
/// ```rust,ignore
/// let root = SequenceBuilder::new()
///     .append_callback(|| Ok(()))
///     .append(SequenceNode::tween(Tween::between(overlay, 0.0, 1.0, 0.24)))
///     .join(SequenceNode::tween(Tween::between(container, 0.0, 1.0, 0.3)))
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SequenceBuilder {
    items: Vec<SequenceNode>,
}

impl SequenceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(mut self, node: SequenceNode) -> Self {
        self.items.push(node);
        self
    }

    pub fn append_tween(self, tween: Tween) -> Self {
        self.append(SequenceNode::tween(tween))
    }

    /// 与上一个 append 的节点并行执行
    pub fn join(mut self, node: SequenceNode) -> Self {
        match self.items.pop() {
            None => self.items.push(node),
            Some(SequenceNode::Group {
                mut children,
                mode: GroupMode::Parallel,
            }) => {
                children.push(node);
                self.items.push(SequenceNode::parallel(children));
            }
            Some(last) => self.items.push(SequenceNode::parallel(vec![last, node])),
        }
        self
    }

    pub fn join_tween(self, tween: Tween) -> Self {
        self.join(SequenceNode::tween(tween))
    }

    pub fn append_interval(mut self, duration: f32) -> Self {
        self.items.push(SequenceNode::Delay(duration));
        self
    }

    pub fn append_callback(mut self, f: impl Fn() -> CallbackResult + 'static) -> Self {
        self.items.push(SequenceNode::callback(f));
        self
    }

    /// 追加一段带阶段标记的子序列
    pub fn phase(
        mut self,
        phase: Phase,
        build: impl FnOnce(SequenceBuilder) -> SequenceBuilder,
    ) -> Self {
        let inner = build(SequenceBuilder::new()).build();
        self.items.push(SequenceNode::marked(phase, inner));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn build(self) -> SequenceNode {
        SequenceNode::sequential(self.items)
    }

    pub fn into_spec(self) -> AnimationSpec {
        AnimationSpec::new(self.build())
    }
}

/// 循环方式
///
/// 计数为总播放次数，`None` 表示无限循环（永远不会 Completed）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loops {
    #[default]
    Once,
    /// 每轮从头播放
    Restart(Option<u32>),
    /// 奇数轮交换补间的起止值（往返）
    Yoyo(Option<u32>),
}

impl Loops {
    /// 总播放次数，`None` 为无限
    pub fn iterations(&self) -> Option<u32> {
        match self {
            Loops::Once => Some(1),
            Loops::Restart(count) | Loops::Yoyo(count) => count.map(|n| n.max(1)),
        }
    }

    pub fn is_yoyo(&self) -> bool {
        matches!(self, Loops::Yoyo(_))
    }
}

/// 动画描述
#[derive(Clone)]
pub struct AnimationSpec {
    pub root: SequenceNode,
    /// 身份键：`IgnoreIfSameKey` 以此判断是否为同一请求
    pub key: Option<String>,
    /// 类别：`CoalesceWhileVisible` 以此判断是否可合并
    pub category: Option<String>,
    /// 当前正在“发声”的属性，`CrossfadeMerge` 会先把它淡出
    pub audible: Option<PropertyBinding>,
    pub loops: Loops,
    /// 首轮开始前的等待时间（秒），只等一次，不随循环重复
    pub delay: f32,
    pub(crate) on_complete: Option<Hook>,
    pub(crate) on_kill: Option<Hook>,
}

impl AnimationSpec {
    pub fn new(root: SequenceNode) -> Self {
        Self {
            root,
            key: None,
            category: None,
            audible: None,
            loops: Loops::Once,
            delay: 0.0,
            on_complete: None,
            on_kill: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_audible(mut self, binding: PropertyBinding) -> Self {
        self.audible = Some(binding);
        self
    }

    pub fn with_loops(mut self, loops: Loops) -> Self {
        self.loops = loops;
        self
    }

    /// 延迟开始；负值视为 0
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    /// 正常播放结束时调用
    pub fn on_complete(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(hook));
        self
    }

    /// 被 `cancel` 或新的 `play` 打断时调用
    pub fn on_kill(mut self, hook: impl Fn() + 'static) -> Self {
        self.on_kill = Some(Rc::new(hook));
        self
    }

    /// 校验：至少一个步骤，延迟与所有时长、取值均为有限值
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.root.step_count() == 0 {
            return Err(SpecError::Empty);
        }
        if !self.delay.is_finite() {
            return Err(SpecError::NonFiniteDelay(self.delay));
        }
        let mut index = 0;
        self.root.visit_steps(&mut |step| {
            step.validate(index)?;
            index += 1;
            Ok(())
        })
    }

    /// 在原有步骤前插入额外步骤
    pub fn prepended(mut self, extra: Vec<SequenceNode>) -> Self {
        if extra.is_empty() {
            return self;
        }
        let mut children = extra;
        children.push(self.root);
        self.root = SequenceNode::sequential(children);
        self
    }

    /// 去掉入场阶段
    pub fn without_entry(mut self) -> Self {
        self.root = self
            .root
            .without_phase(Phase::Entry)
            .unwrap_or_else(|| SequenceNode::sequential(Vec::new()));
        self
    }
}

impl fmt::Debug for AnimationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSpec")
            .field("key", &self.key)
            .field("category", &self.category)
            .field("loops", &self.loops)
            .field("delay", &self.delay)
            .field("steps", &self.root.step_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::SharedValue;

    #[test]
    fn test_join_groups_with_previous() {
        let a = SharedValue::new(0.0);
        let b = SharedValue::new(0.0);
        let root = SequenceBuilder::new()
            .append_tween(Tween::between(a.binding(), 0.0, 1.0, 1.0))
            .join_tween(Tween::between(b.binding(), 0.0, 1.0, 0.5))
            .append_interval(0.5)
            .build();

        match root {
            SequenceNode::Group { children, mode } => {
                assert_eq!(mode, GroupMode::Sequential);
                assert_eq!(children.len(), 2);
                assert!(matches!(
                    children[0],
                    SequenceNode::Group {
                        mode: GroupMode::Parallel,
                        ..
                    }
                ));
            }
            other => panic!("unexpected root: {:?}", other),
        }
    }

    #[test]
    fn test_validate_empty() {
        let spec = SequenceBuilder::new().into_spec();
        assert_eq!(spec.validate(), Err(SpecError::Empty));
    }

    #[test]
    fn test_validate_negative_duration_is_allowed() {
        let spec = SequenceBuilder::new().append_interval(-1.0).into_spec();
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_nan_duration() {
        let spec = SequenceBuilder::new()
            .append_callback(|| Ok(()))
            .append_interval(f32::NAN)
            .into_spec();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::NonFiniteDuration { index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_infinite_target() {
        let value = SharedValue::new(0.0);
        let spec = SequenceBuilder::new()
            .append_tween(Tween::to(value.binding(), f32::INFINITY, 1.0))
            .into_spec();
        assert!(matches!(
            spec.validate(),
            Err(SpecError::NonFiniteValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_without_entry() {
        let value = SharedValue::new(0.0);
        let spec = SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(value.binding(), 0.0, 1.0, 0.4))
            })
            .append_interval(1.5)
            .phase(Phase::Exit, |b| b.append_tween(Tween::to(value.binding(), 0.0, 0.4)))
            .into_spec();

        assert_eq!(spec.root.step_count(), 3);
        let stripped = spec.without_entry();
        assert_eq!(stripped.root.step_count(), 2);
    }

    #[test]
    fn test_without_entry_only_entry() {
        let value = SharedValue::new(0.0);
        let spec = SequenceBuilder::new()
            .phase(Phase::Entry, |b| {
                b.append_tween(Tween::between(value.binding(), 0.0, 1.0, 0.4))
            })
            .into_spec()
            .without_entry();

        assert_eq!(spec.root.step_count(), 0);
    }

    #[test]
    fn test_prepended() {
        let spec = SequenceBuilder::new()
            .append_interval(1.0)
            .into_spec()
            .with_key("track")
            .prepended(vec![SequenceNode::Delay(0.5)]);

        assert_eq!(spec.root.step_count(), 2);
        assert_eq!(spec.key.as_deref(), Some("track"));
    }

    #[test]
    fn test_validate_nan_delay() {
        let spec = SequenceBuilder::new()
            .append_interval(1.0)
            .into_spec()
            .with_delay(f32::NAN);
        assert!(matches!(spec.validate(), Err(SpecError::NonFiniteDelay(_))));

        let spec = SequenceBuilder::new()
            .append_interval(1.0)
            .into_spec()
            .with_delay(-2.0);
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_phase_and_mode_serde() {
        assert_eq!(serde_json::to_string(&Phase::Entry).unwrap(), "\"entry\"");
        assert_eq!(
            serde_json::from_str::<GroupMode>("\"parallel\"").unwrap(),
            GroupMode::Parallel
        );
    }

    #[test]
    fn test_loops_iterations() {
        assert_eq!(Loops::Once.iterations(), Some(1));
        assert_eq!(Loops::Restart(Some(3)).iterations(), Some(3));
        assert_eq!(Loops::Yoyo(Some(0)).iterations(), Some(1));
        assert_eq!(Loops::Yoyo(None).iterations(), None);
    }
}
