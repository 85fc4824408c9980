//! # Easing 模块
//!
//! 缓动曲线，把线性时间进度映射为插值进度。

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// 缓动函数类型
///
/// 配置文件中使用 snake_case 名称，例如 `"out_back"`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 二次缓入
    InQuad,
    /// 二次缓出
    OutQuad,
    /// 二次缓入缓出
    InOutQuad,
    /// 三次缓入
    InCubic,
    /// 三次缓出
    OutCubic,
    /// 三次缓入缓出
    InOutCubic,
    /// 正弦缓入
    InSine,
    /// 正弦缓出
    OutSine,
    /// 正弦缓入缓出
    InOutSine,
    /// 回拉缓入（起步先反向）
    InBack,
    /// 回弹缓出（越过终点再回落）
    OutBack,
    /// 弹性缓出
    OutElastic,
    /// 弹跳缓出
    OutBounce,
}

/// Back 系列的过冲系数
const BACK_OVERSHOOT: f32 = 1.70158;

impl EasingFunction {
    /// 计算缓动值
    ///
    /// `t` 会先被限制在 `[0, 1]`；`t == 1` 时所有曲线都精确返回 `1.0`。
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return 1.0;
        }

        match self {
            EasingFunction::Linear => t,
            EasingFunction::InQuad => t * t,
            EasingFunction::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::InCubic => t * t * t,
            EasingFunction::OutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::InSine => 1.0 - (t * PI / 2.0).cos(),
            EasingFunction::OutSine => (t * PI / 2.0).sin(),
            EasingFunction::InOutSine => -((PI * t).cos() - 1.0) / 2.0,
            EasingFunction::InBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
            EasingFunction::OutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
            EasingFunction::OutElastic => ease_out_elastic(t),
            EasingFunction::OutBounce => ease_out_bounce(t),
        }
    }
}

/// 冲击曲线（punch）
///
/// 返回相对静止值的偏移系数：以 `vibrato` 次振荡衰减到 0，
/// 反向摆动按 `elasticity` 缩放。`t = 0` 与 `t = 1` 时都为 0。
pub fn punch_curve(t: f32, vibrato: u32, elasticity: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.0 || t >= 1.0 {
        return 0.0;
    }

    let oscillations = vibrato.max(1) as f32;
    let mut wave = (t * oscillations * PI).sin();
    if wave < 0.0 {
        wave *= elasticity.clamp(0.0, 1.0);
    }
    wave * (1.0 - t)
}

fn ease_out_elastic(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        let c4 = (2.0 * PI) / 3.0;
        2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
    }
}

fn ease_out_bounce(t: f32) -> f32 {
    let n1 = 7.5625;
    let d1 = 2.75;

    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}
