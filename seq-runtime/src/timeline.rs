//! # Timeline 模块
//!
//! 把序列树展开为按开始时间排序的线性条目表。
//!
//! 每个序列只有几十个步骤，调度器每帧对条目表做一次线性扫描即可，
//! 不需要区间树之类的结构。

use crate::spec::{GroupMode, Phase, SequenceNode, Step};

/// 展开后的单个条目
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    /// 开始时间（相对序列起点，秒）
    pub start: f32,
    /// 结束时间；瞬时步骤 `end == start`
    pub end: f32,
    pub step: Step,
    /// 所在阶段（取最近的标记）
    pub phase: Option<Phase>,
}

/// 展开后的时间轴
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
    duration: f32,
}

impl Timeline {
    /// 展开序列树
    ///
    /// 纯函数：不读写任何属性，也不执行回调。
    pub fn flatten(root: &SequenceNode) -> Self {
        let mut entries = Vec::new();
        let duration = flatten_node(root, 0.0, None, &mut entries);
        // sort_by 是稳定排序，同一时刻的条目保持声明顺序
        entries.sort_by(|a, b| a.start.total_cmp(&b.start));
        Self { entries, duration }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 序列总时长
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 每个条目一行的可读描述，格式 `start..end label`
    pub fn describe(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| format!("{}..{} {}", entry.start, entry.end, entry.step.label()))
            .collect()
    }
}

/// 递归展开，返回节点时长
fn flatten_node(
    node: &SequenceNode,
    offset: f32,
    phase: Option<Phase>,
    out: &mut Vec<TimelineEntry>,
) -> f32 {
    match node {
        SequenceNode::Leaf(step) => push_step(step.clone(), offset, phase, out),
        SequenceNode::Delay(duration) => push_step(Step::Wait(*duration), offset, phase, out),
        SequenceNode::Callback(f) => push_step(Step::Callback(f.clone()), offset, phase, out),
        SequenceNode::Group {
            children,
            mode: GroupMode::Sequential,
        } => {
            let mut total = 0.0;
            for child in children {
                total += flatten_node(child, offset + total, phase, out);
            }
            total
        }
        SequenceNode::Group {
            children,
            mode: GroupMode::Parallel,
        } => children
            .iter()
            .map(|child| flatten_node(child, offset, phase, out))
            .fold(0.0, f32::max),
        SequenceNode::Marked { phase, node } => flatten_node(node, offset, Some(*phase), out),
    }
}

fn push_step(step: Step, offset: f32, phase: Option<Phase>, out: &mut Vec<TimelineEntry>) -> f32 {
    let duration = step.duration();
    out.push(TimelineEntry {
        start: offset,
        end: offset + duration,
        step,
        phase,
    });
    duration
}
