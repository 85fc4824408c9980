//! # Property 模块
//!
//! 调度器与外部对象之间的唯一接缝。
//!
//! ## 核心概念
//!
//! - `Animatable`: 可动画对象接口，对象自己决定属性值如何落地
//! - `PropertyBinding`: 对象 + 属性名，一个补间步骤写入的目标
//! - `SharedValue`: 最简单的可动画对象，包装单个 f32

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// 可动画对象接口
///
/// 调度器只通过此 trait 读写属性，不假设对象类型。
/// 实现方使用内部可变性（`Cell` / `RefCell`），因此 setter 接受 `&self`。
///
/// ```rust,ignore
/// struct Panel {
///     alpha: Cell<f32>,
/// }
///
/// impl Animatable for Panel {
///     fn get_property(&self, property_id: &str) -> Option<f32> {
///         match property_id {
///             "alpha" => Some(self.alpha.get()),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, property_id: &str, value: f32) -> bool {
///         match property_id {
///             "alpha" => { self.alpha.set(value); true }
///             _ => false,
///         }
///     }
///
///     fn property_list(&self) -> &'static [&'static str] {
///         &["alpha"]
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 获取属性的当前值，属性不存在时返回 `None`
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值，属性不存在时返回 `false`
    fn set_property(&self, property_id: &str, value: f32) -> bool;

    /// 所有可动画属性的列表（用于调试和校验）
    fn property_list(&self) -> &'static [&'static str];
}

/// 属性绑定
///
/// 把一个补间步骤连接到具体对象的具体属性。
#[derive(Clone)]
pub struct PropertyBinding {
    target: Rc<dyn Animatable>,
    property_id: &'static str,
}

impl PropertyBinding {
    pub fn new(target: Rc<dyn Animatable>, property_id: &'static str) -> Self {
        Self {
            target,
            property_id,
        }
    }

    /// 属性名称
    pub fn property_id(&self) -> &'static str {
        self.property_id
    }

    /// 读取当前值
    pub fn get(&self) -> Option<f32> {
        self.target.get_property(self.property_id)
    }

    /// 写入新值
    pub fn set(&self, value: f32) -> bool {
        let ok = self.target.set_property(self.property_id, value);
        if !ok {
            tracing::warn!(property = self.property_id, "属性写入失败");
        }
        ok
    }

    /// 两个绑定是否指向同一对象的同一属性
    pub fn same_target(&self, other: &PropertyBinding) -> bool {
        Rc::ptr_eq(&self.target, &other.target) && self.property_id == other.property_id
    }
}

impl fmt::Debug for PropertyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("property", &self.property_id)
            .field("value", &self.get())
            .finish()
    }
}

/// 单值可动画对象
///
/// 属性名固定为 `"value"`，克隆后共享同一个值。
#[derive(Debug, Clone, Default)]
pub struct SharedValue {
    value: Rc<Cell<f32>>,
}

impl SharedValue {
    pub const PROPERTY: &'static str = "value";

    pub fn new(initial_value: f32) -> Self {
        Self {
            value: Rc::new(Cell::new(initial_value)),
        }
    }

    pub fn get(&self) -> f32 {
        self.value.get()
    }

    pub fn set(&self, value: f32) {
        self.value.set(value);
    }

    /// 生成指向该值的属性绑定
    pub fn binding(&self) -> PropertyBinding {
        PropertyBinding::new(Rc::new(self.clone()), Self::PROPERTY)
    }
}

impl Animatable for SharedValue {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        (property_id == Self::PROPERTY).then(|| self.value.get())
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        if property_id == Self::PROPERTY {
            self.value.set(value);
            true
        } else {
            false
        }
    }

    fn property_list(&self) -> &'static [&'static str] {
        &[Self::PROPERTY]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestAnimatable {
        alpha: Cell<f32>,
        scale: Cell<f32>,
    }

    impl Animatable for TestAnimatable {
        fn get_property(&self, property_id: &str) -> Option<f32> {
            match property_id {
                "alpha" => Some(self.alpha.get()),
                "scale" => Some(self.scale.get()),
                _ => None,
            }
        }

        fn set_property(&self, property_id: &str, value: f32) -> bool {
            match property_id {
                "alpha" => {
                    self.alpha.set(value);
                    true
                }
                "scale" => {
                    self.scale.set(value);
                    true
                }
                _ => false,
            }
        }

        fn property_list(&self) -> &'static [&'static str] {
            &["alpha", "scale"]
        }
    }

    #[test]
    fn test_binding_reads_and_writes() {
        let obj = Rc::new(TestAnimatable {
            alpha: Cell::new(1.0),
            scale: Cell::new(1.0),
        });
        let alpha = PropertyBinding::new(obj.clone(), "alpha");

        assert_eq!(alpha.get(), Some(1.0));
        assert!(alpha.set(0.25));
        assert_eq!(obj.alpha.get(), 0.25);
        assert_eq!(obj.scale.get(), 1.0);
    }

    #[test]
    fn test_unknown_property() {
        let obj = Rc::new(TestAnimatable {
            alpha: Cell::new(1.0),
            scale: Cell::new(1.0),
        });
        let missing = PropertyBinding::new(obj, "rotation");

        assert_eq!(missing.get(), None);
        assert!(!missing.set(1.0));
    }

    #[test]
    fn test_shared_value_clones_share_state() {
        let value = SharedValue::new(0.5);
        let binding = value.binding();

        binding.set(0.8);
        assert_eq!(value.get(), 0.8);
        assert_eq!(value.property_list(), &["value"]);
    }

    #[test]
    fn test_same_target() {
        let obj: Rc<dyn Animatable> = Rc::new(SharedValue::new(0.0));
        let a = PropertyBinding::new(obj.clone(), SharedValue::PROPERTY);
        let b = PropertyBinding::new(obj, SharedValue::PROPERTY);
        let c = SharedValue::new(0.0).binding();

        assert!(a.same_target(&b));
        assert!(!a.same_target(&c));
    }
}
