//! # Policy 模块
//!
//! 打断策略：同一资源上已有序列运行时，新的播放请求如何处理。
//!
//! 策略是纯函数 `(已有序列快照, 请求元数据) -> Decision`，
//! 不做任何修改；所有状态变更由调度器完成。

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::property::PropertyBinding;
use crate::scheduler::{HandleId, SequenceStatus};
use crate::spec::{AnimationSpec, SequenceNode, Tween};

/// 内置策略 ID
pub const REPLACE_ALWAYS: &str = "replace_always";
pub const IGNORE_IF_SAME_KEY: &str = "ignore_if_same_key";
pub const CROSSFADE_MERGE: &str = "crossfade_merge";
pub const COALESCE_WHILE_VISIBLE: &str = "coalesce_while_visible";

/// 默认交叉淡出时长（秒）
pub const DEFAULT_CROSSFADE_OUT: f32 = 1.0;

/// 打断策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InterruptPolicy {
    /// 总是打断旧序列重新开始（菜单面板、按钮冲击）
    ReplaceAlways,
    /// 身份键相同则忽略新请求（重复触发的同一通知）
    IgnoreIfSameKey,
    /// 先淡出当前发声的属性，再执行新序列（音乐切换）
    CrossfadeMerge {
        fade_out: f32,
        #[serde(default)]
        easing: EasingFunction,
    },
    /// 同类别序列仍可见时跳过入场，直接进入停留/退场（自定义通知换文字）
    CoalesceWhileVisible,
}

/// 调度决策
#[derive(Debug, Clone)]
pub enum Decision {
    /// 打断旧序列，执行新序列
    Start,
    /// 丢弃新请求
    Ignore,
    /// 打断旧序列，执行 `extra ++ spec`
    MergeBefore(Vec<SequenceNode>),
    /// 打断旧序列，执行去掉入场阶段的新序列
    StartWithoutEntry,
}

/// 已有序列的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSnapshot {
    pub handle: HandleId,
    pub key: Option<String>,
    pub category: Option<String>,
    pub status: SequenceStatus,
    pub elapsed: f32,
}

/// 新请求的元数据
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub key: Option<String>,
    pub category: Option<String>,
    pub audible: Option<PropertyBinding>,
    /// 决策前由调度器采样的发声属性当前值
    pub audible_level: Option<f32>,
}

impl RequestMeta {
    pub fn from_spec(spec: &AnimationSpec) -> Self {
        Self {
            key: spec.key.clone(),
            category: spec.category.clone(),
            audible: spec.audible.clone(),
            audible_level: spec.audible.as_ref().and_then(PropertyBinding::get),
        }
    }
}

impl InterruptPolicy {
    pub fn crossfade(fade_out: f32) -> Self {
        Self::CrossfadeMerge {
            fade_out,
            easing: EasingFunction::Linear,
        }
    }

    /// 计算决策
    pub fn decide(&self, existing: Option<&ActiveSnapshot>, request: &RequestMeta) -> Decision {
        match self {
            Self::ReplaceAlways => Decision::Start,
            Self::IgnoreIfSameKey => match (existing, &request.key) {
                (Some(active), Some(key)) if active.key.as_ref() == Some(key) => Decision::Ignore,
                _ => Decision::Start,
            },
            Self::CrossfadeMerge { fade_out, easing } => {
                let Some(audible) = &request.audible else {
                    return Decision::Start;
                };
                // 读不到音量时按“有序列在跑就在发声”处理
                let sounding = match request.audible_level {
                    Some(level) => level > 0.0,
                    None => existing.is_some(),
                };
                if sounding {
                    let fade = Tween::to(audible.clone(), 0.0, *fade_out).with_easing(*easing);
                    Decision::MergeBefore(vec![SequenceNode::tween(fade)])
                } else {
                    Decision::Start
                }
            }
            Self::CoalesceWhileVisible => match (existing, &request.category) {
                (Some(active), Some(category)) if active.category.as_ref() == Some(category) => {
                    Decision::StartWithoutEntry
                }
                _ => Decision::Start,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::SharedValue;

    fn snapshot(key: Option<&str>, category: Option<&str>) -> ActiveSnapshot {
        ActiveSnapshot {
            handle: HandleId(1),
            key: key.map(str::to_string),
            category: category.map(str::to_string),
            status: SequenceStatus::Running,
            elapsed: 0.2,
        }
    }

    fn request(key: Option<&str>, category: Option<&str>) -> RequestMeta {
        RequestMeta {
            key: key.map(str::to_string),
            category: category.map(str::to_string),
            audible: None,
            audible_level: None,
        }
    }

    #[test]
    fn test_replace_always() {
        let decision = InterruptPolicy::ReplaceAlways
            .decide(Some(&snapshot(Some("a"), None)), &request(Some("a"), None));
        assert!(matches!(decision, Decision::Start));
    }

    #[test]
    fn test_ignore_if_same_key() {
        let policy = InterruptPolicy::IgnoreIfSameKey;
        let active = snapshot(Some("Jump"), None);

        assert!(matches!(
            policy.decide(Some(&active), &request(Some("Jump"), None)),
            Decision::Ignore
        ));
        assert!(matches!(
            policy.decide(Some(&active), &request(Some("Land"), None)),
            Decision::Start
        ));
        assert!(matches!(
            policy.decide(None, &request(Some("Jump"), None)),
            Decision::Start
        ));
    }

    #[test]
    fn test_ignore_if_same_key_none_never_matches() {
        let policy = InterruptPolicy::IgnoreIfSameKey;
        let decision = policy.decide(Some(&snapshot(None, None)), &request(None, None));
        assert!(matches!(decision, Decision::Start));
    }

    #[test]
    fn test_crossfade_merge() {
        let volume = SharedValue::new(0.8);
        let policy = InterruptPolicy::crossfade(1.0);
        let mut meta = request(Some("trackB"), None);
        meta.audible = Some(volume.binding());
        meta.audible_level = Some(0.8);

        match policy.decide(None, &meta) {
            Decision::MergeBefore(extra) => assert_eq!(extra.len(), 1),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_crossfade_silent_layer_starts() {
        let volume = SharedValue::new(0.0);
        let policy = InterruptPolicy::crossfade(1.0);
        let mut meta = request(Some("trackA"), None);
        meta.audible = Some(volume.binding());
        meta.audible_level = Some(0.0);

        assert!(matches!(policy.decide(None, &meta), Decision::Start));
    }

    #[test]
    fn test_coalesce_while_visible() {
        let policy = InterruptPolicy::CoalesceWhileVisible;
        let active = snapshot(None, Some("custom"));

        assert!(matches!(
            policy.decide(Some(&active), &request(None, Some("custom"))),
            Decision::StartWithoutEntry
        ));
        assert!(matches!(
            policy.decide(Some(&snapshot(Some("Jump"), None)), &request(None, Some("custom"))),
            Decision::Start
        ));
    }
}
