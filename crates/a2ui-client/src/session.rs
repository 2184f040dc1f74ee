//! Client session.
//!
//! A [`Session`] owns the current [`SurfaceRegistry`] snapshot, the local UI
//! state of each surface, and an inspector log of every applied message.
//! Each request gets its own cancellation token; starting a new request
//! cancels the previous one so late messages from a stale stream are
//! discarded instead of racing into the registry.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::pin::pin;
use std::sync::Arc;

use a2ui_core::config::{Config, DEFAULT_HISTORY_LIMIT};
use a2ui_core::error::{A2uiError, Result};
use a2ui_core::protocol::{ClientRequest, ServerMessage, UserAction};
use a2ui_core::store::SurfaceRegistry;
use a2ui_render::{Effect, LocalState, RenderNode, SurfaceView, UserInput};
use chrono::{DateTime, Utc};
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::decoder::decode_stream;
use crate::dispatcher::ActionDispatcher;
use crate::transport::{ChunkSource, RequestTransport};

/// How a stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// The server sent `done` before closing.
    Done,
    /// The server sent `error` before closing. A later `done` does not
    /// replace it.
    ServerError(String),
    /// The connection closed without a terminal message.
    Closed,
    /// A newer request or an explicit cancel stopped this stream.
    Cancelled,
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => f.write_str("done"),
            Self::ServerError(message) => write!(f, "error: {message}"),
            Self::Closed => f.write_str("closed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub request_id: Uuid,
    /// Messages applied from this stream.
    pub messages: usize,
    pub finished: Finish,
    /// Surface ids begun by this stream, in order. A request sent without a
    /// surface id learns the server-assigned one from here.
    pub surfaces: Vec<String>,
}

/// One inspector log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub request_id: Uuid,
    pub message: ServerMessage,
    /// The registry produced by applying `message`.
    pub registry: SurfaceRegistry,
}

/// A response stream that has been opened but not consumed yet.
pub struct PendingStream {
    pub request_id: Uuid,
    source: Box<dyn ChunkSource>,
    token: CancellationToken,
}

impl PendingStream {
    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

pub struct Session {
    registry: SurfaceRegistry,
    local: HashMap<String, LocalState>,
    log: VecDeque<LogEntry>,
    history_limit: usize,
    max_surfaces: Option<usize>,
    dispatcher: Option<ActionDispatcher>,
    active: Option<CancellationToken>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with no transport. Streams can still be replayed into it.
    pub fn new() -> Self {
        Self {
            registry: SurfaceRegistry::new(),
            local: HashMap::new(),
            log: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_surfaces: None,
            dispatcher: None,
            active: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn RequestTransport>) -> Self {
        self.dispatcher = Some(ActionDispatcher::new(transport));
        self
    }

    /// Apply the `store` section of the config.
    pub fn with_config(mut self, config: &Config) -> Self {
        self.history_limit = config.history_limit();
        self.max_surfaces = config.max_surfaces();
        self
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    /// Applied messages, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    /// Fold one message into the registry and record it.
    pub fn apply(&mut self, request_id: Uuid, message: ServerMessage) {
        let mut next = self.registry.apply(&message);

        if let ServerMessage::BeginRendering { surface_id, .. } = &message {
            // A reset surface mounts fresh, so its local state goes too.
            self.local.remove(surface_id);
        }
        if let Some(max) = self.max_surfaces {
            next = next.retain_newest(max);
            self.local.retain(|id, _| next.contains(id));
        }

        match &message {
            ServerMessage::Error { message: text } => {
                warn!(%request_id, error = %text, "Server reported error")
            }
            ServerMessage::Unknown => debug!(%request_id, "Ignoring unknown message type"),
            other => debug!(
                %request_id,
                kind = other.kind(),
                surface_id = ?other.surface_id(),
                "Applied message"
            ),
        }

        self.registry = next;
        if self.history_limit > 0 {
            if self.log.len() == self.history_limit {
                self.log.pop_front();
            }
            self.log.push_back(LogEntry {
                at: Utc::now(),
                request_id,
                message,
                registry: self.registry.clone(),
            });
        }
    }

    /// Open a stream for `request`, cancelling any stream still in flight.
    pub async fn send(&mut self, request: &ClientRequest) -> Result<PendingStream> {
        let dispatcher = self.dispatcher()?.clone();
        let token = self.begin_request();
        let source = dispatcher.send(request).await?;
        Ok(self.pending(source, token))
    }

    /// Send a free-text prompt and apply the response stream.
    pub async fn prompt(&mut self, message: &str, surface_id: Option<String>) -> Result<StreamOutcome> {
        let pending = self.send(&ClientRequest::prompt(message, surface_id)).await?;
        self.run_stream(pending).await
    }

    /// Send an action and apply the response stream.
    pub async fn dispatch_action(&mut self, action: UserAction) -> Result<StreamOutcome> {
        let dispatcher = self.dispatcher()?.clone();
        let token = self.begin_request();
        let source = dispatcher.dispatch(action).await?;
        let pending = self.pending(source, token);
        self.run_stream(pending).await
    }

    /// Apply a captured stream as if it were a live response.
    pub async fn replay(&mut self, source: impl ChunkSource + 'static) -> Result<StreamOutcome> {
        let token = self.begin_request();
        let pending = self.pending(Box::new(source), token);
        self.run_stream(pending).await
    }

    /// Decode and apply a stream until it closes or is cancelled.
    ///
    /// A transport error aborts the stream; messages applied before it stay
    /// applied.
    pub async fn run_stream(&mut self, pending: PendingStream) -> Result<StreamOutcome> {
        let PendingStream {
            request_id,
            source,
            token,
        } = pending;
        let mut frames = pin!(decode_stream(source));
        let mut outcome = StreamOutcome {
            request_id,
            messages: 0,
            finished: Finish::Closed,
            surfaces: Vec::new(),
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!(%request_id, applied = outcome.messages, "Stream cancelled");
                    outcome.finished = Finish::Cancelled;
                    return Ok(outcome);
                }
                next = frames.next() => next,
            };

            let message = match next {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    warn!(%request_id, error = %e, applied = outcome.messages, "Stream aborted");
                    return Err(e);
                }
                None => break,
            };

            match &message {
                ServerMessage::Done => {
                    if !matches!(outcome.finished, Finish::ServerError(_)) {
                        outcome.finished = Finish::Done;
                    }
                }
                ServerMessage::Error { message } => {
                    outcome.finished = Finish::ServerError(message.clone());
                }
                ServerMessage::BeginRendering { surface_id, .. } => {
                    if !outcome.surfaces.contains(surface_id) {
                        outcome.surfaces.push(surface_id.clone());
                    }
                }
                _ => {}
            }
            self.apply(request_id, message);
            outcome.messages += 1;
        }

        info!(%request_id, applied = outcome.messages, finished = ?outcome.finished, "Stream closed");
        Ok(outcome)
    }

    /// Cancel the stream in flight, if any.
    pub fn cancel(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }

    /// Render a surface with its local UI state.
    pub fn render(&mut self, surface_id: &str) -> Option<RenderNode> {
        let surface = self.registry.get(surface_id)?;
        let local = self.local.entry(surface_id.to_string()).or_default();
        Some(SurfaceView::new(surface, local).render())
    }

    /// Route a user interaction to a component and apply local effects.
    ///
    /// Data model edits and tab switches take effect immediately. An
    /// [`Effect::Action`] is returned for the caller to send, typically via
    /// [`Session::dispatch_action`].
    pub fn route_input(&mut self, surface_id: &str, component_id: &str, input: UserInput) -> Effect {
        let Some(surface) = self.registry.get(surface_id) else {
            debug!(surface_id, component_id, "Input for unknown surface");
            return Effect::None;
        };
        let local = self.local.entry(surface_id.to_string()).or_default();
        let effect = SurfaceView::new(surface, local).handle_input(component_id, input);

        if let Effect::DataModel(model) = &effect {
            self.registry = self.registry.with_data_model(surface_id, model.clone());
        }
        effect
    }

    /// Route a user interaction and, if it triggers an action, send it and
    /// apply the response.
    pub async fn handle_input(
        &mut self,
        surface_id: &str,
        component_id: &str,
        input: UserInput,
    ) -> Result<Option<StreamOutcome>> {
        match self.route_input(surface_id, component_id, input) {
            Effect::Action(action) => Ok(Some(self.dispatch_action(action).await?)),
            _ => Ok(None),
        }
    }

    fn dispatcher(&self) -> Result<&ActionDispatcher> {
        self.dispatcher
            .as_ref()
            .ok_or_else(|| A2uiError::Transport("session has no transport".into()))
    }

    fn begin_request(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.active = Some(token.clone());
        token
    }

    fn pending(&self, source: Box<dyn ChunkSource>, token: CancellationToken) -> PendingStream {
        let request_id = Uuid::new_v4();
        debug!(%request_id, "Request started");
        PendingStream {
            request_id,
            source,
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use a2ui_core::data::DataValue;
    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::transport::MemorySource;

    const FORM: &str = concat!(
        "data: {\"type\":\"beginRendering\",\"surfaceId\":\"s1\",\"rootComponentId\":\"root\"}\n",
        "data: {\"type\":\"surfaceUpdate\",\"surfaceId\":\"s1\",\"components\":[",
        "{\"id\":\"root\",\"type\":\"Column\",\"children\":[\"name\",\"send\"]},",
        "{\"id\":\"name\",\"type\":\"TextField\",\"boundPath\":\"/contact/name\"},",
        "{\"id\":\"send\",\"type\":\"Button\",\"label\":\"Send\",\"actionName\":\"submit\"}]}\n",
        "data: {\"type\":\"dataModelUpdate\",\"surfaceId\":\"s1\",\"data\":{\"contact\":{\"name\":\"\"}}}\n",
        "data: {\"type\":\"done\"}\n",
    );

    /// Replies to every request with the next canned body.
    #[derive(Default)]
    struct Scripted {
        sent: Mutex<Vec<ClientRequest>>,
        replies: Mutex<VecDeque<&'static str>>,
    }

    impl Scripted {
        fn replying(replies: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.iter().copied().collect()),
            })
        }
    }

    #[async_trait]
    impl RequestTransport for Scripted {
        async fn send(&self, request: &ClientRequest) -> Result<Box<dyn ChunkSource>> {
            self.sent.lock().unwrap().push(request.clone());
            let body = self.replies.lock().unwrap().pop_front().unwrap_or("");
            Ok(Box::new(MemorySource::split(body.as_bytes(), 16)))
        }
    }

    /// Fails after yielding its chunks.
    struct Broken(MemorySource);

    #[async_trait]
    impl ChunkSource for Broken {
        async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
            match self.0.next_chunk().await? {
                Some(chunk) => Ok(Some(chunk)),
                None => Err(A2uiError::Transport("connection reset".into())),
            }
        }
    }

    #[tokio::test]
    async fn test_replay_builds_surface() {
        let mut session = Session::new();
        let outcome = session.replay(MemorySource::split(FORM.as_bytes(), 5)).await.unwrap();

        assert_eq!(outcome.messages, 4);
        assert_eq!(outcome.finished, Finish::Done);
        assert_eq!(outcome.surfaces, ["s1"]);
        assert_eq!(session.registry().get("s1").unwrap().components.len(), 3);
        assert_eq!(session.log().count(), 4);
    }

    #[tokio::test]
    async fn test_error_message_is_reported() {
        let mut session = Session::new();
        let body = "data: {\"type\":\"error\",\"message\":\"agent failed\"}\n";
        let outcome = session.replay(MemorySource::from_chunks([body])).await.unwrap();
        assert_eq!(outcome.finished, Finish::ServerError("agent failed".into()));
        assert!(session.registry().is_empty());
    }

    #[tokio::test]
    async fn test_error_then_done_keeps_error() {
        let mut session = Session::new();
        let body = concat!(
            "data: {\"type\":\"error\",\"message\":\"agent failed\"}\n\n",
            "data: {\"type\":\"done\"}\n\n",
        );
        let outcome = session.replay(MemorySource::from_chunks([body])).await.unwrap();
        assert_eq!(outcome.messages, 2);
        assert_eq!(outcome.finished, Finish::ServerError("agent failed".into()));
    }

    #[tokio::test]
    async fn test_transport_error_keeps_applied_messages() {
        let mut session = Session::new();
        let result = session.replay(Broken(MemorySource::split(FORM.as_bytes(), 64))).await;
        assert!(matches!(result, Err(A2uiError::Transport(_))));
        assert!(session.registry().contains("s1"));
    }

    #[tokio::test]
    async fn test_new_request_cancels_previous_stream() {
        let transport = Scripted::replying(&[FORM, ""]);
        let mut session = Session::new().with_transport(transport.clone());

        let stale = session.send(&ClientRequest::prompt("first", None)).await.unwrap();
        let fresh = session.send(&ClientRequest::prompt("second", None)).await.unwrap();
        assert!(stale.cancel_token().is_cancelled());

        let outcome = session.run_stream(stale).await.unwrap();
        assert_eq!(outcome.finished, Finish::Cancelled);
        assert_eq!(outcome.messages, 0);
        assert!(session.registry().is_empty());

        let outcome = session.run_stream(fresh).await.unwrap();
        assert_eq!(outcome.finished, Finish::Closed);
        assert_eq!(transport.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_edit_then_button_sends_snapshot() {
        let transport = Scripted::replying(&[FORM, "data: {\"type\":\"done\"}\n"]);
        let mut session = Session::new().with_transport(transport.clone());
        session.prompt("Build a contact form", None).await.unwrap();

        let effect = session.route_input("s1", "name", UserInput::Text("Jo".into()));
        assert!(matches!(effect, Effect::DataModel(_)));
        let model = &session.registry().get("s1").unwrap().data_model;
        assert_eq!(
            a2ui_core::path::get(model, "/contact/name"),
            Some(&DataValue::from("Jo"))
        );

        let outcome = session
            .handle_input("s1", "send", UserInput::Activate)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome.finished, Finish::Done);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[1].message, "Action: submit");
        assert_eq!(
            sent[1].form_data.as_ref().map(|m| m.to_json()),
            Some(serde_json::json!({"contact": {"name": "Jo"}}))
        );
    }

    #[tokio::test]
    async fn test_send_without_transport_fails() {
        let mut session = Session::new();
        let result = session.prompt("hi", None).await;
        assert!(matches!(result, Err(A2uiError::Transport(_))));
    }

    #[tokio::test]
    async fn test_history_limit_and_surface_cap() {
        let config = Config::parse("{ store: { max_surfaces: 1, history_limit: 2 } }").unwrap();
        let mut session = Session::new().with_config(&config);
        let body = concat!(
            "data: {\"type\":\"beginRendering\",\"surfaceId\":\"a\",\"rootComponentId\":\"r\"}\n",
            "data: {\"type\":\"beginRendering\",\"surfaceId\":\"b\",\"rootComponentId\":\"r\"}\n",
            "data: {\"type\":\"done\"}\n",
        );
        session.replay(MemorySource::from_chunks([body])).await.unwrap();

        assert!(!session.registry().contains("a"));
        assert!(session.registry().contains("b"));
        let kinds: Vec<&str> = session.log().map(|e| e.message.kind()).collect();
        assert_eq!(kinds, ["beginRendering", "done"]);
    }

    #[tokio::test]
    async fn test_inspector_snapshots_stay_valid() {
        let mut session = Session::new();
        session.replay(MemorySource::from_chunks([FORM])).await.unwrap();

        let snapshots: Vec<&SurfaceRegistry> = session.log().map(|e| &e.registry).collect();
        let first = snapshots[0].get("s1").unwrap();
        assert!(first.components.is_empty());
        assert!(first.data_model.is_empty());
        assert_eq!(snapshots[1].get("s1").unwrap().components.len(), 3);
    }
}
