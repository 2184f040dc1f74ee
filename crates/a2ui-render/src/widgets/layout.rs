//! Composite widgets that lay out their declared children.

use a2ui_core::component::{CardProps, ColumnProps, ListProps, RowProps, TabsProps};
use tracing::debug;

use crate::node::{RenderNode, WidgetNode};
use crate::widget::{Capabilities, UserInput, Widget};

impl Widget for CardProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Card {
            title: self.title.clone().filter(|t| !t.is_empty()),
        };
        (node, cx.render_children(&self.children))
    }
}

impl Widget for RowProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Row {
            distribution: self.distribution.unwrap_or_default(),
            alignment: self.alignment.unwrap_or_default(),
            gap: self.gap(),
        };
        (node, cx.render_children(&self.children))
    }
}

impl Widget for ColumnProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::Column {
            alignment: self.alignment.unwrap_or_default(),
            gap: self.gap(),
        };
        (node, cx.render_children(&self.children))
    }
}

impl Widget for ListProps {
    fn render(&self, _id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let node = WidgetNode::List {
            max_height: self.max_height.filter(|h| *h > 0.0),
        };
        (node, cx.render_children(&self.children))
    }
}

/// Renders the header labels and only the active tab's content. The active
/// index lives in client-local state, never in the data model.
impl Widget for TabsProps {
    fn render(&self, id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>) {
        let active = cx.active_tab(id);
        let children = match self.tabs.get(active) {
            Some(tab) => cx.render_children(std::slice::from_ref(&tab.content_id)),
            None => Vec::new(),
        };
        let node = WidgetNode::Tabs {
            labels: self.tabs.iter().map(|t| t.label.clone()).collect(),
            active,
        };
        (node, children)
    }

    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        match input {
            UserInput::SelectTab(index) if *index < self.tabs.len() => cx.select_tab(id, *index),
            other => debug!(component_id = id, ?other, "Tabs ignored input"),
        }
    }
}
