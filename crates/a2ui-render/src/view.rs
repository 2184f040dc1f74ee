//! Component graph renderer.
//!
//! A [`SurfaceView`] walks a surface's component graph from its root id and
//! materializes a [`RenderNode`] tree. Missing ids become loading
//! placeholders and unknown tags become unknown markers, so a partial or
//! malformed surface still renders node by node.
//!
//! The walk does not track visited ids: the producer guarantees the
//! children graph is acyclic.

use std::collections::{HashMap, HashSet};

use a2ui_core::component::ComponentKind;
use a2ui_core::data::{DataModel, DataValue};
use a2ui_core::protocol::UserAction;
use a2ui_core::store::Surface;
use tracing::{debug, trace};

use crate::node::RenderNode;
use crate::widget::{widget_for, Capabilities, Effect, UserInput};

/// Client-only UI state for one surface. Never sent to the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState {
    tabs: HashMap<String, usize>,
}

impl LocalState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self, component_id: &str) -> usize {
        self.tabs.get(component_id).copied().unwrap_or(0)
    }
}

/// Renders one surface and routes user input to its widgets.
pub struct SurfaceView<'a> {
    surface: &'a Surface,
    local: &'a mut LocalState,
}

impl<'a> SurfaceView<'a> {
    pub fn new(surface: &'a Surface, local: &'a mut LocalState) -> Self {
        Self { surface, local }
    }

    /// Render the whole surface from its root component.
    ///
    /// Tabs widgets that were not part of this tree lose their selection, so
    /// a Tabs widget mounted again starts on its first tab.
    pub fn render(&mut self) -> RenderNode {
        let mut cx = Cx::new(self.surface, self.local);
        let root = cx.render_node(&self.surface.root_component_id);
        let mounted = cx.mounted_tabs;
        self.local.tabs.retain(|id, _| mounted.contains(id));
        root
    }

    /// Render the subtree rooted at `component_id`.
    pub fn render_component(&mut self, component_id: &str) -> RenderNode {
        Cx::new(self.surface, self.local).render_node(component_id)
    }

    /// Route a user interaction to the widget of `component_id`.
    pub fn handle_input(&mut self, component_id: &str, input: UserInput) -> Effect {
        let surface = self.surface;
        let Some(component) = surface.component(component_id) else {
            debug!(component_id, "Input for missing component");
            return Effect::None;
        };
        let Some(widget) = widget_for(&component.kind) else {
            debug!(component_id, type_tag = component.type_tag(), "Input for unknown widget");
            return Effect::None;
        };

        let mut cx = Cx::new(surface, self.local);
        widget.on_input(component_id, &input, &mut cx);
        cx.into_effect()
    }
}

struct Cx<'a> {
    surface: &'a Surface,
    local: &'a mut LocalState,
    edited: Option<DataModel>,
    action: Option<UserAction>,
    local_changed: bool,
    mounted_tabs: HashSet<String>,
}

impl<'a> Cx<'a> {
    fn new(surface: &'a Surface, local: &'a mut LocalState) -> Self {
        Self {
            surface,
            local,
            edited: None,
            action: None,
            local_changed: false,
            mounted_tabs: HashSet::new(),
        }
    }

    fn model(&self) -> &DataModel {
        self.edited.as_ref().unwrap_or(&self.surface.data_model)
    }

    fn render_node(&mut self, id: &str) -> RenderNode {
        let surface = self.surface;
        let Some(component) = surface.component(id) else {
            trace!(component_id = id, "Component not yet available");
            return RenderNode::Loading { id: id.to_string() };
        };
        let Some(widget) = widget_for(&component.kind) else {
            return RenderNode::Unknown {
                id: id.to_string(),
                type_tag: component.type_tag().to_string(),
            };
        };

        if matches!(component.kind, ComponentKind::Tabs(_)) {
            self.mounted_tabs.insert(id.to_string());
        }

        let (widget, children) = widget.render(id, self);
        RenderNode::Widget {
            id: id.to_string(),
            widget,
            children,
        }
    }

    fn into_effect(self) -> Effect {
        if let Some(action) = self.action {
            Effect::Action(action)
        } else if let Some(model) = self.edited {
            Effect::DataModel(model)
        } else if self.local_changed {
            Effect::Local
        } else {
            Effect::None
        }
    }
}

impl Capabilities for Cx<'_> {
    fn render_children(&mut self, ids: &[String]) -> Vec<RenderNode> {
        ids.iter().map(|id| self.render_node(id)).collect()
    }

    fn get(&self, path: &str) -> Option<DataValue> {
        a2ui_core::path::get(self.model(), path).cloned()
    }

    fn set(&mut self, path: &str, value: DataValue) {
        let next = a2ui_core::path::set(self.model(), path, value);
        self.edited = Some(next);
    }

    fn dispatch(&mut self, action_name: &str) {
        self.action = Some(UserAction::new(
            action_name,
            self.surface.surface_id.as_str(),
            self.model().clone(),
        ));
    }

    fn active_tab(&self, component_id: &str) -> usize {
        self.local.active_tab(component_id)
    }

    fn select_tab(&mut self, component_id: &str, index: usize) {
        self.local.tabs.insert(component_id.to_string(), index);
        self.local_changed = true;
    }
}

/// Render a surface with throwaway local state.
pub fn render_surface(surface: &Surface) -> RenderNode {
    let mut local = LocalState::new();
    SurfaceView::new(surface, &mut local).render()
}
