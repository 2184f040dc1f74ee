//! One [`Widget`](crate::widget::Widget) implementation per component type.
//!
//! - [`display`]: Text, Image, Icon, Divider
//! - [`layout`]: Card, Row, Column, List, Tabs
//! - [`controls`]: Button, TextField, CheckBox, Slider, MultipleChoice

pub mod controls;
pub mod display;
pub mod layout;
