//! Leaf widgets with no data binding.

use a2ui_core::component::{DividerProps, IconProps, ImageProps, TextProps};

use crate::icons;
use crate::node::{RenderNode, WidgetNode};
use crate::widget::{Capabilities, Widget};

impl Widget for TextProps {
    fn render(&self, _id: &str, _cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Text {
            content: self.content.clone().unwrap_or_default(),
            hint: self.usage_hint.unwrap_or_default(),
        };
        (node, Vec::new())
    }
}

impl Widget for ImageProps {
    fn render(&self, _id: &str, _cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Image {
            url: self.url.clone().unwrap_or_default(),
            alt: self.alt.clone().filter(|a| !a.is_empty()),
            fit: self.fit.unwrap_or_default(),
        };
        (node, Vec::new())
    }
}

impl Widget for IconProps {
    fn render(&self, _id: &str, _cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let name = self.name.clone().unwrap_or_default();
        let glyph = icons::glyph(&name).to_string();
        (WidgetNode::Icon { name, glyph }, Vec::new())
    }
}

impl Widget for DividerProps {
    fn render(&self, _id: &str, _cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Divider {
            direction: self.direction.unwrap_or_default(),
        };
        (node, Vec::new())
    }
}
