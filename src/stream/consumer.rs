//! Per-flow HTTP message extraction.
//!
//! # States
//! ```text
//! Start ──first line recognized──▶ Headers ──blank line──▶ Body ──EOF──▶ Done
//!   │                                                                    ▲
//!   └──────────────────────── not HTTP (stream abandoned) ───────────────┘
//! ```
//!
//! The output mode is chosen once, at the blank line ending the head:
//! - `Buffered`: the message is emitted when the stream ends
//! - `Live` (`Upgrade: websocket`): the head is emitted at once, every body line
//!   is emitted as a frame record, and nothing is emitted at stream end
//!
//! With `Transfer-Encoding: chunked`, only odd-indexed body lines are kept. This
//! assumes one chunk-size line followed by one data line, repeating, and is not
//! a chunk decoder.

use std::sync::Arc;

use tokio::io::AsyncBufRead;

use crate::http::{Direction, Endpoints, HttpMessage, MessageId, SequenceAllocator};
use crate::observability::metrics;
use crate::render::MessagePresenter;
use crate::stream::lines::LineReader;

/// Bytes read at most before the first line is classified. A flow without a
/// newline in its first 4 KiB is judged on that prefix.
pub const MAX_FIRST_LINE_BYTES: usize = 4096;

/// Method tokens that mark a first line as a request-line.
pub const HTTP_METHODS: [&str; 9] = [
    "GET", "POST", "HEAD", "OPTIONS", "PUT", "PATCH", "DELETE", "TRACE", "CONNECT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Start,
    Headers,
    Body,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Buffered,
    Live,
}

/// What the caller must do after feeding a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Nothing to emit yet.
    Pending,
    /// The first line is neither a request-line nor a status-line; stop reading.
    NotHttp,
    /// WebSocket head complete; present `message()` now.
    LiveHead,
    /// A WebSocket body line to present immediately.
    LiveFrame { id: MessageId, line: String },
}

/// State machine turning one directional line stream into an HTTP message.
pub struct FlowStreamConsumer {
    endpoints: Endpoints,
    ids: Arc<SequenceAllocator>,
    state: ParseState,
    mode: OutputMode,
    message: Option<HttpMessage>,
    body_index: usize,
}

impl FlowStreamConsumer {
    pub fn new(endpoints: Endpoints, ids: Arc<SequenceAllocator>) -> Self {
        Self {
            endpoints,
            ids,
            state: ParseState::Start,
            mode: OutputMode::Buffered,
            message: None,
            body_index: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Message under construction, once the first line was recognized.
    pub fn message(&self) -> Option<&HttpMessage> {
        self.message.as_ref()
    }

    /// Advance by one line (delimiter already stripped).
    ///
    /// Lines pushed after the consumer is done are ignored.
    pub fn push_line(&mut self, line: &str) -> Progress {
        match self.state {
            ParseState::Start => self.read_head_line(line),
            ParseState::Headers => self.read_header_line(line),
            ParseState::Body => self.read_body_line(line),
            ParseState::Done => Progress::Pending,
        }
    }

    /// End of stream. Returns the message to emit, if any.
    ///
    /// Incomplete messages are returned as they are. Live messages were already
    /// emitted piecewise and yield `None`.
    pub fn finish(&mut self) -> Option<HttpMessage> {
        self.state = ParseState::Done;
        match self.mode {
            OutputMode::Buffered => self.message.take(),
            OutputMode::Live => None,
        }
    }

    fn read_head_line(&mut self, line: &str) -> Progress {
        let upper = line.to_ascii_uppercase();
        let direction = if upper.starts_with("HTTP") {
            Direction::Response
        } else if HTTP_METHODS.iter().any(|method| upper.contains(method)) {
            Direction::Request
        } else {
            self.state = ParseState::Done;
            return Progress::NotHttp;
        };

        self.message = Some(HttpMessage::new(
            self.ids.next(),
            direction,
            self.endpoints.clone(),
            line.to_string(),
        ));
        self.state = ParseState::Headers;
        Progress::Pending
    }

    fn read_header_line(&mut self, line: &str) -> Progress {
        let Some(message) = self.message.as_mut() else {
            return Progress::Pending;
        };

        if line.is_empty() {
            self.state = ParseState::Body;
            if message.is_websocket() {
                self.mode = OutputMode::Live;
                return Progress::LiveHead;
            }
            return Progress::Pending;
        }

        // First colon only: `Host: example.com:8080` keeps its port.
        if let Some((name, value)) = line.split_once(':') {
            message.add_header(name.trim().to_string(), value.trim().to_string());
        }
        Progress::Pending
    }

    fn read_body_line(&mut self, line: &str) -> Progress {
        let Some(message) = self.message.as_mut() else {
            return Progress::Pending;
        };

        let index = self.body_index;
        self.body_index += 1;

        if !message.is_chunked() || index % 2 == 1 {
            message.append_body_line(line);
        }

        match self.mode {
            OutputMode::Buffered => Progress::Pending,
            OutputMode::Live => Progress::LiveFrame {
                id: message.id(),
                line: line.to_string(),
            },
        }
    }

    /// Drive the consumer from `reader` until the stream ends.
    ///
    /// A read error ends the stream like EOF does.
    pub async fn run<R>(mut self, reader: R, presenter: &MessagePresenter)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = LineReader::new(reader);

        loop {
            let read = match self.state {
                ParseState::Start => lines.next_line_limited(MAX_FIRST_LINE_BYTES).await,
                _ => lines.next_line().await,
            };
            let line = match read {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(flow = %self.endpoints, error = %e, "Flow read failed, finishing message");
                    break;
                }
            };

            match self.push_line(&line) {
                Progress::Pending => {}
                Progress::NotHttp => {
                    tracing::debug!(flow = %self.endpoints, "First line is not HTTP, abandoning flow");
                    metrics::record_flow_discarded();
                    return;
                }
                Progress::LiveHead => {
                    if let Some(message) = self.message() {
                        tracing::debug!(message_id = %message.id(), flow = %self.endpoints, "WebSocket upgrade, streaming frames");
                        presenter.present_head(message);
                    }
                }
                Progress::LiveFrame { id, line } => presenter.present_frame(id, &line),
            }
        }

        if let Some(message) = self.finish() {
            presenter.present_message(&message);
        }
    }
}
