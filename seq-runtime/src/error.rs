//! # Error 模块
//!
//! 定义 seq-runtime 中使用的错误类型。

use thiserror::Error;

/// 动画描述校验错误
///
/// 在 `Scheduler::play` 时检查，出错时不修改任何状态。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    /// 没有任何步骤
    #[error("动画序列为空")]
    Empty,

    /// 时长不是有限值（NaN / 无穷大）
    #[error("步骤 #{index} 的时长无效: {value}")]
    NonFiniteDuration { index: usize, value: f32 },

    /// 延迟不是有限值
    #[error("延迟时长无效: {0}")]
    NonFiniteDelay(f32),

    /// 插值端点不是有限值
    #[error("步骤 #{index} 的属性 '{property}' 取值无效: {value}")]
    NonFiniteValue {
        index: usize,
        property: String,
        value: f32,
    },
}

/// 调度错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// 动画描述不合法
    #[error("无效的动画序列: {0}")]
    InvalidSpec(#[from] SpecError),

    /// 未注册的打断策略
    #[error("未注册的打断策略 '{0}'")]
    UnknownPolicy(String),
}

/// 回调步骤执行失败
///
/// 调度器会记录该错误，并把所在序列视为提前完成。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<&str> for CallbackError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for CallbackError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// 回调返回值
pub type CallbackResult = Result<(), CallbackError>;

/// Result 类型别名
pub type ScheduleResult<T> = Result<T, ScheduleError>;
