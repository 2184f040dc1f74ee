//! Rendering for A2UI surfaces.
//!
//! [`SurfaceView`] turns a surface's component graph into a [`RenderNode`]
//! tree through the per-type [`Widget`] implementations, and routes user
//! input back to them. A [`RenderHost`] presents the result.

pub mod host;
pub mod icons;
pub mod node;
pub mod view;
pub mod widget;
pub mod widgets;

pub use host::{mount_tree, outline, OutlineHost, RenderHost};
pub use node::{ChoiceView, RenderNode, WidgetNode};
pub use view::{render_surface, LocalState, SurfaceView};
pub use widget::{widget_for, Capabilities, Effect, UserInput, Widget};
