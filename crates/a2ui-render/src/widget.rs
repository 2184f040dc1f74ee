//! Widget dispatch contract.
//!
//! Every component type has exactly one [`Widget`] implementation, selected
//! by [`widget_for`]. A widget sees only its own attributes and the
//! [`Capabilities`] handed to it; it never talks to the network.

use a2ui_core::component::ComponentKind;
use a2ui_core::data::{DataModel, DataValue};
use a2ui_core::protocol::UserAction;

use crate::node::{RenderNode, WidgetNode};

/// What a widget may do besides reading its own attributes.
pub trait Capabilities {
    /// Render the given component ids, in order.
    fn render_children(&mut self, ids: &[String]) -> Vec<RenderNode>;

    /// Read the value at a bound path of the surface's data model.
    fn get(&self, path: &str) -> Option<DataValue>;

    /// Write a value at a bound path, producing a new data model.
    fn set(&mut self, path: &str, value: DataValue);

    /// Trigger a named action carrying the current data model.
    fn dispatch(&mut self, action_name: &str);

    /// Active tab index of a Tabs widget. Local to this client only.
    fn active_tab(&self, component_id: &str) -> usize;

    fn select_tab(&mut self, component_id: &str, index: usize);
}

/// A host-reported interaction with one component.
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// New text of a text field.
    Text(String),
    /// New state of a checkbox.
    Toggle(bool),
    /// New position of a slider.
    Number(f64),
    /// An option of a multiple-choice widget was picked.
    Select(String),
    /// A button was pressed.
    Activate,
    /// A tab header was clicked.
    SelectTab(usize),
}

/// The outcome of routing a [`UserInput`] to a widget.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// The surface's data model was edited.
    DataModel(DataModel),
    /// An action should be sent upstream.
    Action(UserAction),
    /// Only client-local UI state changed.
    Local,
}

/// Rendering strategy for one component type.
pub trait Widget {
    /// Materialize this widget and its children.
    fn render(&self, id: &str, cx: &mut dyn Capabilities) -> (WidgetNode, Vec<RenderNode>);

    /// React to a user interaction. Widgets that take no input ignore it.
    fn on_input(&self, id: &str, input: &UserInput, cx: &mut dyn Capabilities) {
        let _ = (id, input, cx);
    }
}

/// Select the widget for a component kind. `None` for unknown tags.
pub fn widget_for(kind: &ComponentKind) -> Option<&dyn Widget> {
    let widget: &dyn Widget = match kind {
        ComponentKind::Text(p) => p,
        ComponentKind::Image(p) => p,
        ComponentKind::Icon(p) => p,
        ComponentKind::Card(p) => p,
        ComponentKind::Row(p) => p,
        ComponentKind::Column(p) => p,
        ComponentKind::Button(p) => p,
        ComponentKind::TextField(p) => p,
        ComponentKind::CheckBox(p) => p,
        ComponentKind::Slider(p) => p,
        ComponentKind::MultipleChoice(p) => p,
        ComponentKind::Tabs(p) => p,
        ComponentKind::Divider(p) => p,
        ComponentKind::List(p) => p,
        ComponentKind::Unknown { .. } => return None,
    };
    Some(widget)
}
