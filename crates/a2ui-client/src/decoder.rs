//! Frame decoder for the A2UI event stream.
//!
//! Bytes arrive in arbitrary chunks. Complete lines that start with
//! `data: ` carry one JSON message each; everything else is ignored. A
//! line that is not a valid message is skipped and decoding carries on.

use std::collections::VecDeque;

use a2ui_core::error::Result;
use a2ui_core::protocol::ServerMessage;
use futures::Stream;
use tracing::{debug, trace};

use crate::transport::ChunkSource;

/// Incremental line decoder. Keeps the unterminated tail of the last chunk
/// until the rest of the line arrives.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every message completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ServerMessage> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(decode_line)
            .collect()
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// End of stream. An unterminated trailing line is dropped, never parsed.
    /// Returns how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }
}

fn decode_line(line: &[u8]) -> Option<ServerMessage> {
    match ServerMessage::from_frame(&String::from_utf8_lossy(line))? {
        Ok(message) => {
            trace!(kind = message.kind(), "Decoded frame");
            Some(message)
        }
        Err(e) => {
            debug!(error = %e, "Skipping frame");
            None
        }
    }
}

struct DecodeState {
    source: Box<dyn ChunkSource>,
    decoder: FrameDecoder,
    ready: VecDeque<ServerMessage>,
    ended: bool,
}

/// Decode a chunk source into a stream of messages.
///
/// A transport error is yielded once and ends the stream; messages decoded
/// before it have already been yielded.
pub fn decode_stream(source: Box<dyn ChunkSource>) -> impl Stream<Item = Result<ServerMessage>> + Send {
    futures::stream::unfold(
        DecodeState {
            source,
            decoder: FrameDecoder::new(),
            ready: VecDeque::new(),
            ended: false,
        },
        |mut state| async move {
            loop {
                if let Some(message) = state.ready.pop_front() {
                    return Some((Ok(message), state));
                }
                if state.ended {
                    return None;
                }

                match state.source.next_chunk().await {
                    Ok(Some(chunk)) => {
                        let decoded = state.decoder.push(&chunk);
                        state.ready.extend(decoded);
                    }
                    Ok(None) => {
                        let dropped = state.decoder.finish();
                        if dropped > 0 {
                            debug!(bytes = dropped, "Discarding unterminated trailing frame");
                        }
                        state.ended = true;
                    }
                    Err(e) => {
                        state.ended = true;
                        return Some((Err(e), state));
                    }
                }
            }
        },
    )
}
