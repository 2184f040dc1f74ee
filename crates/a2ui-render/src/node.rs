//! Rendered output handed to a [`RenderHost`](crate::host::RenderHost).

use a2ui_core::component::{
    Alignment, ButtonVariant, ChoiceMode, Direction, Distribution, ImageFit, InputType, UsageHint,
};

/// One node of a materialized surface tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderNode {
    /// The id is not in the surface yet; its definition may still be streaming.
    Loading { id: String },
    /// The component's type tag has no registered widget.
    Unknown { id: String, type_tag: String },
    /// A resolved widget and its rendered children.
    Widget {
        id: String,
        widget: WidgetNode,
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    pub fn id(&self) -> &str {
        match self {
            Self::Loading { id } | Self::Unknown { id, .. } | Self::Widget { id, .. } => id,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Widget { children, .. } => children,
            _ => &[],
        }
    }

    pub fn widget(&self) -> Option<&WidgetNode> {
        match self {
            Self::Widget { widget, .. } => Some(widget),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Depth-first search for the node with `id`.
    pub fn find(&self, id: &str) -> Option<&RenderNode> {
        if self.id() == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }
}

/// An option of a multiple-choice widget with its resolved selection state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Resolved props for each widget type, with defaults applied and bound
/// values read from the data model.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetNode {
    Text {
        content: String,
        hint: UsageHint,
    },
    Image {
        url: String,
        alt: Option<String>,
        fit: ImageFit,
    },
    Icon {
        name: String,
        glyph: String,
    },
    Card {
        title: Option<String>,
    },
    Row {
        distribution: Distribution,
        alignment: Alignment,
        gap: f64,
    },
    Column {
        alignment: Alignment,
        gap: f64,
    },
    Button {
        label: String,
        variant: ButtonVariant,
        icon: Option<String>,
        action_name: Option<String>,
    },
    TextField {
        label: Option<String>,
        placeholder: String,
        input_type: InputType,
        required: bool,
        value: String,
    },
    CheckBox {
        label: Option<String>,
        checked: bool,
    },
    Slider {
        label: Option<String>,
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    MultipleChoice {
        label: Option<String>,
        mode: ChoiceMode,
        options: Vec<ChoiceView>,
    },
    Tabs {
        labels: Vec<String>,
        active: usize,
    },
    Divider {
        direction: Direction,
    },
    List {
        max_height: Option<f64>,
    },
}

impl WidgetNode {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Text { .. } => "Text",
            Self::Image { .. } => "Image",
            Self::Icon { .. } => "Icon",
            Self::Card { .. } => "Card",
            Self::Row { .. } => "Row",
            Self::Column { .. } => "Column",
            Self::Button { .. } => "Button",
            Self::TextField { .. } => "TextField",
            Self::CheckBox { .. } => "CheckBox",
            Self::Slider { .. } => "Slider",
            Self::MultipleChoice { .. } => "MultipleChoice",
            Self::Tabs { .. } => "Tabs",
            Self::Divider { .. } => "Divider",
            Self::List { .. } => "List",
        }
    }
}
