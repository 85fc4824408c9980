//! # View 模块
//!
//! 可动画的视图状态，使用 `Animatable` trait。
//!
//! ## 设计说明
//!
//! 视图使用 `Rc<RefCell<T>>` 实现内部可变性：绑定层持有一份克隆，
//! 调度器通过 `PropertyBinding` 持有另一份，两者看到的是同一份数据。
//! 真正的渲染 / 混音由外部读取这些状态完成。

use std::cell::RefCell;
use std::rc::Rc;

use seq_runtime::{Animatable, PropertyBinding};

/// UI 元素的内部数据
#[derive(Debug, Clone, PartialEq)]
pub struct UiNodeData {
    /// 元素名称（调试用）
    pub name: String,
    /// 透明度 (0.0 - 1.0)
    pub alpha: f32,
    /// 锚点 X 坐标
    pub x: f32,
    /// 锚点 Y 坐标
    pub y: f32,
    /// 统一缩放
    pub scale: f32,
    /// 是否激活（SetActive）
    pub active: bool,
    /// 是否接收输入
    pub interactable: bool,
    /// 显示的文字
    pub text: String,
}

impl UiNodeData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alpha: 1.0,
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            active: true,
            interactable: true,
            text: String::new(),
        }
    }
}

/// 可动画 UI 元素
///
/// ## 支持的属性
///
/// - `"alpha"`: 透明度，写入时限制在 `[0, 1]`
/// - `"x"` / `"y"`: 锚点坐标
/// - `"scale"`: 统一缩放
#[derive(Debug, Clone)]
pub struct UiNode {
    data: Rc<RefCell<UiNodeData>>,
}

impl UiNode {
    /// 支持的属性列表
    pub const PROPERTIES: &'static [&'static str] = &["alpha", "x", "y", "scale"];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            data: Rc::new(RefCell::new(UiNodeData::new(name))),
        }
    }

    /// 创建隐藏的元素（透明、未激活、不可交互）
    pub fn hidden(name: impl Into<String>) -> Self {
        let node = Self::new(name);
        {
            let mut data = node.data.borrow_mut();
            data.alpha = 0.0;
            data.active = false;
            data.interactable = false;
        }
        node
    }

    /// 生成指向该元素属性的绑定
    pub fn binding(&self, property_id: &'static str) -> PropertyBinding {
        PropertyBinding::new(Rc::new(self.clone()), property_id)
    }

    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    pub fn alpha(&self) -> f32 {
        self.data.borrow().alpha
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.data.borrow_mut().alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn x(&self) -> f32 {
        self.data.borrow().x
    }

    pub fn set_x(&self, x: f32) {
        self.data.borrow_mut().x = x;
    }

    pub fn y(&self) -> f32 {
        self.data.borrow().y
    }

    pub fn set_y(&self, y: f32) {
        self.data.borrow_mut().y = y;
    }

    pub fn scale(&self) -> f32 {
        self.data.borrow().scale
    }

    pub fn set_scale(&self, scale: f32) {
        self.data.borrow_mut().scale = scale;
    }

    pub fn is_active(&self) -> bool {
        self.data.borrow().active
    }

    pub fn set_active(&self, active: bool) {
        self.data.borrow_mut().active = active;
    }

    pub fn is_interactable(&self) -> bool {
        self.data.borrow().interactable
    }

    pub fn set_interactable(&self, interactable: bool) {
        self.data.borrow_mut().interactable = interactable;
    }

    pub fn text(&self) -> String {
        self.data.borrow().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.data.borrow_mut().text = text.into();
    }

    /// 获取完整数据副本
    pub fn snapshot(&self) -> UiNodeData {
        self.data.borrow().clone()
    }
}

impl Animatable for UiNode {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        let data = self.data.borrow();
        match property_id {
            "alpha" => Some(data.alpha),
            "x" => Some(data.x),
            "y" => Some(data.y),
            "scale" => Some(data.scale),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match property_id {
            "alpha" => self.set_alpha(value),
            "x" => self.set_x(value),
            "y" => self.set_y(value),
            "scale" => self.set_scale(value),
            _ => return false,
        }
        true
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}

/// 音频通道的内部数据
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioChannelData {
    /// 通道音量 (0.0 - 1.0)
    pub volume: f32,
    /// 当前片段
    pub clip: Option<String>,
    pub playing: bool,
}

/// 可动画音频通道（音乐播放器）
///
/// ## 支持的属性
///
/// - `"volume"`: 通道音量
/// - `"level"`: 实际响度；读取时未播放为 0，写入等同于 `"volume"`
///
/// 交叉淡出以 `"level"` 作为发声属性，静音通道不会被多淡出一次。
#[derive(Debug, Clone)]
pub struct AudioChannel {
    data: Rc<RefCell<AudioChannelData>>,
}

impl AudioChannel {
    pub const PROPERTIES: &'static [&'static str] = &["volume", "level"];

    pub fn new(volume: f32) -> Self {
        Self {
            data: Rc::new(RefCell::new(AudioChannelData {
                volume: volume.clamp(0.0, 1.0),
                ..Default::default()
            })),
        }
    }

    pub fn binding(&self, property_id: &'static str) -> PropertyBinding {
        PropertyBinding::new(Rc::new(self.clone()), property_id)
    }

    pub fn volume(&self) -> f32 {
        self.data.borrow().volume
    }

    pub fn set_volume(&self, volume: f32) {
        self.data.borrow_mut().volume = volume.clamp(0.0, 1.0);
    }

    /// 实际响度
    pub fn level(&self) -> f32 {
        let data = self.data.borrow();
        if data.playing { data.volume } else { 0.0 }
    }

    pub fn clip(&self) -> Option<String> {
        self.data.borrow().clip.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.data.borrow().playing
    }

    /// 换上新片段并开始播放
    pub fn play(&self, clip: impl Into<String>) {
        let mut data = self.data.borrow_mut();
        data.clip = Some(clip.into());
        data.playing = true;
    }

    pub fn stop(&self) {
        self.data.borrow_mut().playing = false;
    }

    pub fn snapshot(&self) -> AudioChannelData {
        self.data.borrow().clone()
    }
}

impl Animatable for AudioChannel {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        match property_id {
            "volume" => Some(self.volume()),
            "level" => Some(self.level()),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match property_id {
            "volume" | "level" => {
                self.set_volume(value);
                true
            }
            _ => false,
        }
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}

/// 灯光的内部数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LampData {
    pub intensity: f32,
    /// 外半径
    pub radius: f32,
    /// 初始外半径，闪烁以它为基准
    pub base_radius: f32,
}

/// 可动画灯光
///
/// ## 支持的属性
///
/// - `"intensity"`: 亮度
/// - `"radius"`: 外半径
#[derive(Debug, Clone)]
pub struct Lamp {
    data: Rc<RefCell<LampData>>,
}

impl Lamp {
    pub const PROPERTIES: &'static [&'static str] = &["intensity", "radius"];

    pub fn new(intensity: f32, radius: f32) -> Self {
        Self {
            data: Rc::new(RefCell::new(LampData {
                intensity,
                radius,
                base_radius: radius,
            })),
        }
    }

    pub fn binding(&self, property_id: &'static str) -> PropertyBinding {
        PropertyBinding::new(Rc::new(self.clone()), property_id)
    }

    pub fn intensity(&self) -> f32 {
        self.data.borrow().intensity
    }

    pub fn radius(&self) -> f32 {
        self.data.borrow().radius
    }

    pub fn base_radius(&self) -> f32 {
        self.data.borrow().base_radius
    }
}

impl Animatable for Lamp {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        let data = self.data.borrow();
        match property_id {
            "intensity" => Some(data.intensity),
            "radius" => Some(data.radius),
            _ => None,
        }
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        let mut data = self.data.borrow_mut();
        match property_id {
            "intensity" => data.intensity = value,
            "radius" => data.radius = value,
            _ => return false,
        }
        true
    }

    fn property_list(&self) -> &'static [&'static str] {
        Self::PROPERTIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_node_properties() {
        let node = UiNode::new("notify");
        assert!(node.set_property("alpha", 1.5));
        assert_eq!(node.alpha(), 1.0);
        assert!(node.set_property("y", -50.0));
        assert_eq!(node.get_property("y"), Some(-50.0));
        assert!(node.set_property("x", 12.5));
        assert_eq!(node.x(), 12.5);
        assert!(!node.set_property("rotation", 1.0));
        assert_eq!(node.get_property("rotation"), None);
    }

    #[test]
    fn test_ui_node_binding_shares_state() {
        let node = UiNode::hidden("panel");
        let binding = node.binding("alpha");

        binding.set(0.5);
        assert_eq!(node.alpha(), 0.5);
        assert!(!node.is_active());
    }

    #[test]
    fn test_audio_channel_level() {
        let channel = AudioChannel::new(0.8);
        assert_eq!(channel.level(), 0.0);

        channel.play("music/theme.ogg");
        assert_eq!(channel.get_property("level"), Some(0.8));

        channel.set_property("level", 0.25);
        assert_eq!(channel.volume(), 0.25);

        channel.stop();
        assert_eq!(channel.level(), 0.0);
        assert_eq!(channel.clip().as_deref(), Some("music/theme.ogg"));
    }

    #[test]
    fn test_lamp_properties() {
        let lamp = Lamp::new(1.0, 4.0);
        lamp.set_property("radius", 4.2);
        assert_eq!(lamp.radius(), 4.2);
        assert_eq!(lamp.base_radius(), 4.0);
        assert_eq!(lamp.property_list(), Lamp::PROPERTIES);
    }
}
