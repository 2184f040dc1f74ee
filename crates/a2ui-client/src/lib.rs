//! Network side of the A2UI client runtime: frame decoding, transports, the
//! action dispatcher, and the [`Session`] that ties them to the surface store.

pub mod decoder;
pub mod dispatcher;
pub mod session;
pub mod transport;

pub use decoder::{decode_stream, FrameDecoder};
pub use dispatcher::ActionDispatcher;
pub use session::{Finish, LogEntry, PendingStream, Session, StreamOutcome};
pub use transport::{ChunkSource, HttpTransport, MemorySource, RequestTransport};
