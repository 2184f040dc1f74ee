//! Action dispatcher.
//!
//! Turns a [`UserAction`] into the follow-up request and hands it to the
//! transport. Required fields are not checked here; the server validates.

use std::sync::Arc;

use a2ui_core::error::Result;
use a2ui_core::protocol::{ClientRequest, UserAction};
use tracing::info;

use crate::transport::{ChunkSource, RequestTransport};

#[derive(Clone)]
pub struct ActionDispatcher {
    transport: Arc<dyn RequestTransport>,
}

impl ActionDispatcher {
    pub fn new(transport: Arc<dyn RequestTransport>) -> Self {
        Self { transport }
    }

    pub async fn dispatch(&self, action: UserAction) -> Result<Box<dyn ChunkSource>> {
        info!(
            action = %action.name,
            surface_id = %action.surface_id,
            fields = action.form_data.root().len(),
            "Dispatching action"
        );
        self.send(&ClientRequest::action(action)).await
    }

    /// Send any request through the same transport.
    pub async fn send(&self, request: &ClientRequest) -> Result<Box<dyn ChunkSource>> {
        self.transport.send(request).await
    }
}
