//! A2UI wire protocol.
//!
//! The server streams [`ServerMessage`]s; the client answers with a single
//! [`ClientRequest`] per interaction. Field names are part of the wire
//! format and are kept verbatim.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::component::Component;
use crate::data::{DataModel, DataObject};
use crate::error::{A2uiError, Result};

/// Prefix that marks a frame line carrying a message.
pub const FRAME_PREFIX: &str = "data: ";

/// A server-to-client protocol message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Create (or fully reset) a surface.
    #[serde(rename = "beginRendering")]
    BeginRendering {
        #[serde(rename = "surfaceId")]
        surface_id: String,
        #[serde(rename = "rootComponentId")]
        root_component_id: String,
    },

    /// Upsert components into an existing surface.
    #[serde(rename = "surfaceUpdate")]
    SurfaceUpdate {
        #[serde(rename = "surfaceId")]
        surface_id: String,
        #[serde(default, deserialize_with = "components_lenient")]
        components: Vec<Component>,
    },

    /// Deep-merge a partial document into a surface's data model.
    #[serde(rename = "dataModelUpdate")]
    DataModelUpdate {
        #[serde(rename = "surfaceId")]
        surface_id: String,
        #[serde(default)]
        data: DataObject,
    },

    #[serde(rename = "done")]
    Done,

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        message: String,
    },

    /// Any other `type`; ignored by the store.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// The wire `type` of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeginRendering { .. } => "beginRendering",
            Self::SurfaceUpdate { .. } => "surfaceUpdate",
            Self::DataModelUpdate { .. } => "dataModelUpdate",
            Self::Done => "done",
            Self::Error { .. } => "error",
            Self::Unknown => "unknown",
        }
    }

    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Self::BeginRendering { surface_id, .. }
            | Self::SurfaceUpdate { surface_id, .. }
            | Self::DataModelUpdate { surface_id, .. } => Some(surface_id),
            _ => None,
        }
    }

    /// Whether applying this message can change the registry.
    pub fn is_mutation(&self) -> bool {
        self.surface_id().is_some()
    }

    /// Parse one frame line. `None` when the line is not a `data: ` frame.
    pub fn from_frame(line: &str) -> Option<Result<Self>> {
        let payload = line.trim_end_matches('\r').strip_prefix(FRAME_PREFIX)?.trim();
        Some(
            serde_json::from_str(payload)
                .map_err(|e| A2uiError::Protocol(format!("malformed frame: {e}"))),
        )
    }
}

/// A user-triggered action with a full snapshot of the surface's data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    pub name: String,
    pub surface_id: String,
    pub form_data: DataModel,
}

impl UserAction {
    /// Package an action with a snapshot of the surface's data model.
    pub fn new(
        name: impl Into<String>,
        surface_id: impl Into<String>,
        form_data: DataModel,
    ) -> Self {
        Self {
            name: name.into(),
            surface_id: surface_id.into(),
            form_data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRef {
    pub name: String,
}

/// The single POST body sent to the agent server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_data: Option<DataModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,
}

impl ClientRequest {
    /// A free-text prompt, optionally targeting an existing surface.
    pub fn prompt(message: impl Into<String>, surface_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            action: None,
            form_data: None,
            surface_id,
        }
    }

    /// A follow-up request reporting a user action.
    pub fn action(action: UserAction) -> Self {
        Self {
            message: format!("Action: {}", action.name),
            action: Some(ActionRef { name: action.name }),
            form_data: Some(action.form_data),
            surface_id: Some(action.surface_id),
        }
    }
}

/// Parse each entry on its own and drop the ones without a usable `id` and
/// `type`, so one bad component leaves its siblings intact.
fn components_lenient<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<Component>, D::Error> {
    let Value::Array(entries) = Value::deserialize(d)? else {
        return Ok(Vec::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<Component>(entry) {
            Ok(component) => Some(component),
            Err(e) => {
                debug!(error = %e, "Skipping malformed component");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_begin_rendering() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "type": "beginRendering",
            "surfaceId": "s1",
            "rootComponentId": "r1"
        }))
        .unwrap();
        assert_eq!(
            msg,
            ServerMessage::BeginRendering {
                surface_id: "s1".into(),
                root_component_id: "r1".into(),
            }
        );
        assert_eq!(msg.surface_id(), Some("s1"));
        assert!(msg.is_mutation());
    }

    #[test]
    fn test_decodes_surface_update_components() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "type": "surfaceUpdate",
            "surfaceId": "s1",
            "components": [
                {"id": "r1", "type": "Text", "content": "Hi"},
                {"id": "x", "type": "Marquee"}
            ]
        }))
        .unwrap();
        let ServerMessage::SurfaceUpdate { components, .. } = msg else {
            panic!("expected surfaceUpdate");
        };
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].type_tag(), "Marquee");
    }

    #[test]
    fn test_bad_component_does_not_drop_siblings() {
        let msg: ServerMessage = serde_json::from_value(json!({
            "type": "surfaceUpdate",
            "surfaceId": "s1",
            "components": [
                {"id": "root", "type": "Text", "content": "Hi"},
                {"type": "Text"},
                {"id": 7, "type": "Text"}
            ]
        }))
        .unwrap();
        let ServerMessage::SurfaceUpdate { components, .. } = msg else {
            panic!("expected surfaceUpdate");
        };
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].id, "root");
    }

    #[test]
    fn test_data_update_requires_object() {
        let bad = serde_json::from_value::<ServerMessage>(json!({
            "type": "dataModelUpdate",
            "surfaceId": "s1",
            "data": [1, 2]
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_done_error_and_unknown() {
        let done: ServerMessage = serde_json::from_value(json!({"type": "done"})).unwrap();
        assert_eq!(done, ServerMessage::Done);
        assert!(!done.is_mutation());

        let err: ServerMessage =
            serde_json::from_value(json!({"type": "error", "message": "boom"})).unwrap();
        assert_eq!(err, ServerMessage::Error { message: "boom".into() });

        let unknown: ServerMessage =
            serde_json::from_value(json!({"type": "deleteSurface", "surfaceId": "s1"})).unwrap();
        assert_eq!(unknown, ServerMessage::Unknown);
    }

    #[test]
    fn test_from_frame() {
        assert!(ServerMessage::from_frame("event: ping").is_none());
        assert!(matches!(
            ServerMessage::from_frame("data: {\"type\":\"done\"}  \r"),
            Some(Ok(ServerMessage::Done))
        ));
        assert!(matches!(
            ServerMessage::from_frame("data: {oops"),
            Some(Err(A2uiError::Protocol(_)))
        ));
    }

    #[test]
    fn test_action_request_wire_shape() {
        let form_data: DataModel = serde_json::from_value(json!({"contact": {"name": "Jo"}})).unwrap();
        let request = ClientRequest::action(UserAction {
            name: "submitContact".into(),
            surface_id: "s1".into(),
            form_data,
        });
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "message": "Action: submitContact",
                "action": {"name": "submitContact"},
                "formData": {"contact": {"name": "Jo"}},
                "surfaceId": "s1"
            })
        );
    }

    #[test]
    fn test_prompt_request_omits_empty_fields() {
        let value = serde_json::to_value(ClientRequest::prompt("Build a form", None)).unwrap();
        assert_eq!(value, json!({"message": "Build a form"}));
    }
}
