//! Surface store.
//!
//! [`apply`] folds one [`ServerMessage`] into a [`SurfaceRegistry`] and
//! returns a new registry. The input registry is never modified, so every
//! snapshot taken along the way stays valid and inspectable.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::component::Component;
use crate::data::{DataModel, DataObject};
use crate::merge::deep_merge;
use crate::protocol::ServerMessage;

/// One independently addressable UI region.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub surface_id: String,
    /// May name a component that has not arrived yet.
    pub root_component_id: String,
    pub components: Arc<HashMap<String, Arc<Component>>>,
    pub data_model: DataModel,
    /// Order in which surfaces were begun; used for retention.
    pub generation: u64,
}

impl Surface {
    pub fn new(surface_id: impl Into<String>, root_component_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            root_component_id: root_component_id.into(),
            components: Arc::new(HashMap::new()),
            data_model: DataModel::new(),
            generation: 0,
        }
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id).map(Arc::as_ref)
    }

    pub fn root(&self) -> Option<&Component> {
        self.component(&self.root_component_id)
    }

    fn upsert(&self, incoming: &[Component]) -> Self {
        let mut components = (*self.components).clone();
        for component in incoming {
            components.insert(component.id.clone(), Arc::new(component.clone()));
        }
        Self {
            components: Arc::new(components),
            ..self.clone()
        }
    }

    fn merged(&self, partial: &DataObject) -> Self {
        Self {
            data_model: deep_merge(&self.data_model, partial),
            ..self.clone()
        }
    }
}

/// Immutable map of surfaces keyed by surface id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceRegistry {
    surfaces: Arc<BTreeMap<String, Arc<Surface>>>,
    next_generation: u64,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, surface_id: &str) -> Option<&Arc<Surface>> {
        self.surfaces.get(surface_id)
    }

    pub fn contains(&self, surface_id: &str) -> bool {
        self.surfaces.contains_key(surface_id)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Surfaces in surface-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Surface>> {
        self.surfaces.values()
    }

    /// Whether both registries share the same surface map.
    pub fn ptr_eq(&self, other: &SurfaceRegistry) -> bool {
        Arc::ptr_eq(&self.surfaces, &other.surfaces)
    }

    /// Fold a message into a new registry. See [`apply`].
    pub fn apply(&self, message: &ServerMessage) -> SurfaceRegistry {
        apply(self, message)
    }

    /// Replace one surface's data model, as a two-way bound widget edit does.
    /// Unknown surfaces are left alone.
    pub fn with_data_model(&self, surface_id: &str, data_model: DataModel) -> SurfaceRegistry {
        let Some(surface) = self.surfaces.get(surface_id) else {
            debug!(surface_id, "Dropping local edit for unknown surface");
            return self.clone();
        };
        let updated = Surface {
            data_model,
            ..Surface::clone(surface)
        };
        self.with_surface(updated)
    }

    /// Keep at most `max` surfaces, dropping those begun least recently.
    pub fn retain_newest(&self, max: usize) -> SurfaceRegistry {
        if self.surfaces.len() <= max {
            return self.clone();
        }

        let mut generations: Vec<u64> = self.surfaces.values().map(|s| s.generation).collect();
        generations.sort_unstable_by(|a, b| b.cmp(a));
        let cutoff = generations.get(max.saturating_sub(1)).copied().unwrap_or(u64::MAX);

        let surfaces: BTreeMap<String, Arc<Surface>> = self
            .surfaces
            .iter()
            .filter(|(_, s)| max > 0 && s.generation >= cutoff)
            .map(|(id, s)| (id.clone(), Arc::clone(s)))
            .collect();

        debug!(
            kept = surfaces.len(),
            dropped = self.surfaces.len() - surfaces.len(),
            "Evicted old surfaces"
        );

        Self {
            surfaces: Arc::new(surfaces),
            next_generation: self.next_generation,
        }
    }

    fn with_surface(&self, surface: Surface) -> SurfaceRegistry {
        let mut surfaces = (*self.surfaces).clone();
        surfaces.insert(surface.surface_id.clone(), Arc::new(surface));
        Self {
            surfaces: Arc::new(surfaces),
            next_generation: self.next_generation,
        }
    }
}

/// Fold `message` into `registry`, returning the next registry.
///
/// - `beginRendering` replaces any surface with the same id by an empty one.
/// - `surfaceUpdate` upserts components by id.
/// - `dataModelUpdate` deep-merges into the data model.
/// - Updates for unknown surfaces, `done`, `error`, and unrecognised messages
///   leave the registry as it was.
pub fn apply(registry: &SurfaceRegistry, message: &ServerMessage) -> SurfaceRegistry {
    match message {
        ServerMessage::BeginRendering {
            surface_id,
            root_component_id,
        } => {
            trace!(surface_id = %surface_id, root = %root_component_id, "Begin rendering");
            let mut surface = Surface::new(surface_id.as_str(), root_component_id.as_str());
            surface.generation = registry.next_generation;
            let mut next = registry.with_surface(surface);
            next.next_generation = registry.next_generation + 1;
            next
        }
        ServerMessage::SurfaceUpdate {
            surface_id,
            components,
        } => match registry.get(surface_id) {
            Some(surface) => {
                trace!(surface_id = %surface_id, count = components.len(), "Surface update");
                registry.with_surface(surface.upsert(components))
            }
            None => {
                debug!(surface_id = %surface_id, "Dropping surfaceUpdate for unknown surface");
                registry.clone()
            }
        },
        ServerMessage::DataModelUpdate { surface_id, data } => match registry.get(surface_id) {
            Some(surface) => {
                trace!(surface_id = %surface_id, keys = data.len(), "Data model update");
                registry.with_surface(surface.merged(data))
            }
            None => {
                debug!(surface_id = %surface_id, "Dropping dataModelUpdate for unknown surface");
                registry.clone()
            }
        },
        ServerMessage::Done | ServerMessage::Error { .. } | ServerMessage::Unknown => {
            registry.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use crate::data::DataValue;
    use crate::path;
    use serde_json::json;

    fn msg(value: serde_json::Value) -> ServerMessage {
        serde_json::from_value(value).unwrap()
    }

    fn begin(surface: &str, root: &str) -> ServerMessage {
        msg(json!({"type": "beginRendering", "surfaceId": surface, "rootComponentId": root}))
    }

    #[test]
    fn test_end_to_end_sequence() {
        let registry = SurfaceRegistry::new()
            .apply(&begin("s1", "r1"))
            .apply(&msg(json!({
                "type": "surfaceUpdate",
                "surfaceId": "s1",
                "components": [{"id": "r1", "type": "Text", "content": "Hi"}]
            })))
            .apply(&msg(json!({
                "type": "dataModelUpdate",
                "surfaceId": "s1",
                "data": {"name": "Jo"}
            })));

        let surface = registry.get("s1").unwrap();
        assert_eq!(surface.components.len(), 1);
        assert_eq!(
            surface.data_model.get_key("name"),
            Some(&DataValue::from("Jo"))
        );
        assert!(matches!(surface.root().unwrap().kind, ComponentKind::Text(_)));
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let s0 = SurfaceRegistry::new().apply(&begin("s1", "r1"));
        let s1 = s0.apply(&msg(json!({
            "type": "surfaceUpdate",
            "surfaceId": "s1",
            "components": [{"id": "r1", "type": "Divider"}]
        })));
        let s2 = s1.apply(&msg(json!({
            "type": "dataModelUpdate",
            "surfaceId": "s1",
            "data": {"a": 1}
        })));

        assert!(s0.get("s1").unwrap().components.is_empty());
        assert!(s1.get("s1").unwrap().data_model.is_empty());
        assert_eq!(s2.get("s1").unwrap().components.len(), 1);
        assert!(!s1.ptr_eq(&s2));
    }

    #[test]
    fn test_begin_rendering_resets_surface() {
        let populated = SurfaceRegistry::new()
            .apply(&begin("s1", "r1"))
            .apply(&msg(json!({
                "type": "surfaceUpdate",
                "surfaceId": "s1",
                "components": [{"id": "r1", "type": "Text"}]
            })))
            .apply(&msg(json!({
                "type": "dataModelUpdate",
                "surfaceId": "s1",
                "data": {"a": 1}
            })));

        let reset = populated.apply(&begin("s1", "r"));
        let surface = reset.get("s1").unwrap();
        assert!(surface.components.is_empty());
        assert!(surface.data_model.is_empty());
        assert_eq!(surface.root_component_id, "r");
    }

    #[test]
    fn test_updates_for_unknown_surface_are_dropped() {
        let registry = SurfaceRegistry::new();
        let after = registry.apply(&msg(json!({
            "type": "surfaceUpdate",
            "surfaceId": "ghost",
            "components": [{"id": "r1", "type": "Text"}]
        })));
        assert!(after.is_empty());
        assert!(!after.contains("ghost"));

        let after = registry.apply(&msg(json!({
            "type": "dataModelUpdate",
            "surfaceId": "ghost",
            "data": {"a": 1}
        })));
        assert!(after.is_empty());
    }

    #[test]
    fn test_non_mutating_messages_keep_state() {
        let registry = SurfaceRegistry::new().apply(&begin("s1", "r1"));
        for message in [
            ServerMessage::Done,
            ServerMessage::Error {
                message: "boom".into(),
            },
            ServerMessage::Unknown,
        ] {
            let after = registry.apply(&message);
            assert!(after.ptr_eq(&registry));
        }
    }

    #[test]
    fn test_upsert_replaces_component_by_id() {
        let registry = SurfaceRegistry::new()
            .apply(&begin("s1", "r1"))
            .apply(&msg(json!({
                "type": "surfaceUpdate",
                "surfaceId": "s1",
                "components": [{"id": "r1", "type": "Text", "content": "old"}, {"id": "b", "type": "Divider"}]
            })))
            .apply(&msg(json!({
                "type": "surfaceUpdate",
                "surfaceId": "s1",
                "components": [{"id": "r1", "type": "Text", "content": "new"}]
            })));

        let surface = registry.get("s1").unwrap();
        assert_eq!(surface.components.len(), 2);
        let ComponentKind::Text(props) = &surface.root().unwrap().kind else {
            panic!("expected text");
        };
        assert_eq!(props.content.as_deref(), Some("new"));
    }

    #[test]
    fn test_local_edit_replaces_data_model() {
        let registry = SurfaceRegistry::new().apply(&begin("s1", "r1"));
        let dm = path::set(
            &registry.get("s1").unwrap().data_model,
            "/contact/name",
            DataValue::from("Al"),
        );
        let edited = registry.with_data_model("s1", dm);
        assert_eq!(
            edited.get("s1").unwrap().data_model.to_json(),
            json!({"contact": {"name": "Al"}})
        );
        assert!(registry.get("s1").unwrap().data_model.is_empty());

        let untouched = registry.with_data_model("ghost", DataModel::new());
        assert!(untouched.ptr_eq(&registry));
    }

    #[test]
    fn test_retain_newest_evicts_oldest() {
        let registry = SurfaceRegistry::new()
            .apply(&begin("b", "r"))
            .apply(&begin("a", "r"))
            .apply(&begin("c", "r"));

        let kept = registry.retain_newest(2);
        assert_eq!(kept.len(), 2);
        assert!(!kept.contains("b"));
        assert!(kept.contains("a") && kept.contains("c"));

        let restarted = kept.apply(&begin("a", "r")).apply(&begin("d", "r")).retain_newest(2);
        assert!(restarted.contains("a") && restarted.contains("d"));
        assert!(!restarted.contains("c"));

        assert!(registry.retain_newest(0).is_empty());
        assert!(registry.retain_newest(5).ptr_eq(&registry));
    }
}
