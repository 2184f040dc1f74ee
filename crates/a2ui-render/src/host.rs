//! Render host contract.
//!
//! A host receives each rendered node with its depth, parent before
//! children, and decides how to present it. [`OutlineHost`] renders an
//! indented text outline, which is what the CLI prints.

use std::fmt::Write as _;

use crate::node::{RenderNode, WidgetNode};

pub trait RenderHost {
    fn mount(&mut self, node: &RenderNode, depth: usize);
}

/// Mount `root` and all its descendants into `host`, depth first.
pub fn mount_tree<H: RenderHost + ?Sized>(host: &mut H, root: &RenderNode) {
    fn walk<H: RenderHost + ?Sized>(host: &mut H, node: &RenderNode, depth: usize) {
        host.mount(node, depth);
        for child in node.children() {
            walk(host, child, depth + 1);
        }
    }
    walk(host, root, 0);
}

/// Text outline, two spaces of indent per level.
#[derive(Debug, Default)]
pub struct OutlineHost {
    out: String,
}

impl OutlineHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl RenderHost for OutlineHost {
    fn mount(&mut self, node: &RenderNode, depth: usize) {
        let indent = "  ".repeat(depth);
        let line = match node {
            RenderNode::Loading { id } => format!("<loading {id}>"),
            RenderNode::Unknown { id, type_tag } => format!("<unknown {type_tag}#{id}>"),
            RenderNode::Widget { id, widget, .. } => {
                format!("{}#{id}{}", widget.type_tag(), describe(widget))
            }
        };
        let _ = writeln!(self.out, "{indent}{line}");
    }
}

/// Render a tree to an outline string.
pub fn outline(root: &RenderNode) -> String {
    let mut host = OutlineHost::new();
    mount_tree(&mut host, root);
    host.into_string()
}

fn describe(widget: &WidgetNode) -> String {
    match widget {
        WidgetNode::Text { content, hint } => format!(" [{hint:?}] {content:?}"),
        WidgetNode::Image { url, alt, .. } => match alt {
            Some(alt) => format!(" {url} ({alt})"),
            None => format!(" {url}"),
        },
        WidgetNode::Icon { glyph, .. } => format!(" {glyph}"),
        WidgetNode::Card { title } => title.as_ref().map(|t| format!(" {t:?}")).unwrap_or_default(),
        WidgetNode::Row { gap, .. } | WidgetNode::Column { gap, .. } => format!(" gap={gap}"),
        WidgetNode::Button {
            label, action_name, ..
        } => match action_name {
            Some(action) => format!(" {label:?} -> {action}"),
            None => format!(" {label:?}"),
        },
        WidgetNode::TextField {
            label,
            value,
            required,
            ..
        } => {
            let marker = if *required { "*" } else { "" };
            format!(" {}{marker} = {value:?}", label.as_deref().unwrap_or(""))
        }
        WidgetNode::CheckBox { label, checked } => {
            let mark = if *checked { "[x]" } else { "[ ]" };
            format!(" {mark} {}", label.as_deref().unwrap_or(""))
        }
        WidgetNode::Slider {
            label,
            min,
            max,
            value,
            ..
        } => format!(" {} {value} in [{min}, {max}]", label.as_deref().unwrap_or("")),
        WidgetNode::MultipleChoice { label, options, .. } => {
            let picked: Vec<&str> = options
                .iter()
                .filter(|o| o.selected)
                .map(|o| o.value.as_str())
                .collect();
            format!(" {} {picked:?}", label.as_deref().unwrap_or(""))
        }
        WidgetNode::Tabs { labels, active } => {
            let current = labels.get(*active).map(String::as_str).unwrap_or("-");
            format!(" {current} ({}/{})", active + 1, labels.len())
        }
        WidgetNode::Divider { direction } => format!(" {direction:?}"),
        WidgetNode::List { max_height } => max_height
            .map(|h| format!(" max_height={h}"))
            .unwrap_or_default(),
    }
}
