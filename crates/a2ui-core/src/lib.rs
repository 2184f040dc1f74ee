//! Core types for the A2UI client runtime: protocol messages, components,
//! the per-surface data model, bound-path resolution, and the surface store.

pub mod component;
pub mod config;
pub mod data;
pub mod error;
pub mod merge;
pub mod path;
pub mod protocol;
pub mod store;

pub use component::{Component, ComponentKind, ComponentType};
pub use data::{DataModel, DataObject, DataValue};
pub use error::{A2uiError, Result};
pub use protocol::{ClientRequest, ServerMessage, UserAction};
pub use store::{Surface, SurfaceRegistry};
