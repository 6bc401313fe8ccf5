//! Server-sent events decoding
//!
//! Turns a chunked HTTP body into [`Order`]s. Lines end in LF or CRLF;
//! `data:` lines accumulate until a blank line dispatches the event.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use contracts::{ContractError, Order};
use futures::stream::{self, Stream, StreamExt};
use tracing::trace;

/// Order events of one feed session
pub type OrderStream = Pin<Box<dyn Stream<Item = Result<Order, ContractError>> + Send>>;

/// One dispatched server-sent event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if any
    pub event: Option<String>,
    /// `id:` field, if any
    pub id: Option<String>,
    /// Concatenated `data:` lines
    pub data: String,
}

/// Incremental SSE line decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    current: SseEvent,
    has_data: bool,
}

impl SseDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every event it completes
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let mut line = self.buf.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                if self.has_data {
                    self.current.data.push('\n');
                }
                self.current.data.push_str(value);
                self.has_data = true;
            }
            "event" => self.current.event = Some(value.to_string()),
            "id" => self.current.id = Some(value.to_string()),
            _ => trace!(field, "ignoring sse field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.current);
        let had_data = std::mem::replace(&mut self.has_data, false);
        had_data.then_some(event)
    }
}

/// Decode an HTTP body stream into order events
///
/// Transport errors are mapped through `map_err`; event payloads that are
/// not valid orders surface as `MalformedEvent` items without ending the
/// stream.
pub fn order_events<S, E, F>(body: S, map_err: F) -> OrderStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    F: Fn(E) -> ContractError + Send + 'static,
{
    let state = (Box::pin(body), SseDecoder::new(), VecDeque::new(), map_err);

    Box::pin(stream::unfold(
        state,
        |(mut body, mut decoder, mut queue, map_err)| async move {
            loop {
                if let Some(item) = queue.pop_front() {
                    return Some((item, (body, decoder, queue, map_err)));
                }
                match body.next().await {
                    Some(Ok(chunk)) => {
                        let events = decoder.push(&chunk);
                        queue.extend(events.iter().map(|ev| Order::from_json(&ev.data)));
                    }
                    Some(Err(e)) => {
                        let err = map_err(e);
                        return Some((Err(err), (body, decoder, queue, map_err)));
                    }
                    None => return None,
                }
            }
        },
    ))
}
