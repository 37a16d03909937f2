use std::collections::VecDeque;

use futures_util::{Stream, StreamExt};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Splits a byte stream into Server-Sent Event `data` payloads.
///
/// Bytes are buffered until a blank line closes the event, so multi-byte
/// characters split across chunks survive intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Prefix of `buffer` already known to hold no event delimiter.
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the data payload of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        loop {
            // A delimiter may straddle the old and new bytes, so back up by its length minus one.
            let from = self.scanned.saturating_sub(3);
            let Some((end, delimiter_len)) = find_event_end(&self.buffer[from..]) else {
                self.scanned = self.buffer.len();
                break;
            };
            let end = from + end;
            let raw: Vec<u8> = self.buffer.drain(..end + delimiter_len).collect();
            self.scanned = 0;
            let event = String::from_utf8_lossy(&raw[..end]);

            let data: Vec<&str> = event
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();

            if !data.is_empty() {
                payloads.push(data.join("\n"));
            }
        }
        payloads
    }
}

fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// Events of the Anthropic Messages streaming protocol we act on.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    MessageStop,
    Error { error: StreamError },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct StreamError {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

struct FragmentState<S> {
    body: std::pin::Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    stopped: bool,
    finished: bool,
}

impl<S> FragmentState<S> {
    fn accept(&mut self, payload: &str) {
        match serde_json::from_str::<StreamEvent>(payload) {
            Ok(StreamEvent::ContentBlockDelta {
                delta: Delta::TextDelta { text },
            }) => self.pending.push_back(Ok(text)),
            Ok(StreamEvent::MessageStop) => {
                self.stopped = true;
                self.finished = true;
            }
            Ok(StreamEvent::Error { error }) => {
                self.pending.push_back(Err(AppError::ModelApi(format!(
                    "{}: {}",
                    error.kind, error.message
                ))));
                self.finished = true;
            }
            Ok(_) => {}
            Err(e) => {
                self.pending.push_back(Err(e.into()));
                self.finished = true;
            }
        }
    }
}

/// Turn a raw SSE body into the text fragments the model produced, in order.
///
/// The stream ends after `message_stop` or after the first error. A body that
/// runs out before `message_stop` yields a final error.
pub fn text_fragments<S, B, E>(body: S) -> impl Stream<Item = Result<String>> + Send + 'static
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    let state = FragmentState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        stopped: false,
        finished: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for payload in state.decoder.push(chunk.as_ref()) {
                        state.accept(&payload);
                        if state.finished {
                            break;
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    if !state.stopped {
                        state.pending.push_back(Err(AppError::ModelApi(
                            "stream ended before message_stop".to_string(),
                        )));
                    }
                }
            }
        }
    })
}
