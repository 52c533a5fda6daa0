//! The record accumulated for one HTTP message.
//!
//! # Design Decisions
//! - Headers are an ordered list so rendered output is reproducible
//! - Control flags (chunked, websocket) are sticky once set
//! - Body format follows the last classifiable Content-Type, never the body itself

use std::net::SocketAddr;

use crate::http::format::BodyFormat;
use crate::http::sequence::MessageId;

/// Delimiter reinserted between body lines and used in rendered records.
pub const LINE_BREAK: &str = "\r\n";

pub const HEADER_TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_UPGRADE: &str = "Upgrade";

const CHUNKED: &str = "chunked";
const WEBSOCKET: &str = "websocket";

/// Whether a message travels client to server or back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Request,
    Response,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Request => "Request",
            Direction::Response => "Response",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network and transport endpoints of the flow a message was read from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoints {
    pub src_host: String,
    pub src_port: String,
    pub dst_host: String,
    pub dst_port: String,
}

impl Endpoints {
    pub fn new(
        src_host: impl Into<String>,
        src_port: impl Into<String>,
        dst_host: impl Into<String>,
        dst_port: impl Into<String>,
    ) -> Self {
        Self {
            src_host: src_host.into(),
            src_port: src_port.into(),
            dst_host: dst_host.into(),
            dst_port: dst_port.into(),
        }
    }

    pub fn from_addrs(src: SocketAddr, dst: SocketAddr) -> Self {
        Self::new(
            src.ip().to_string(),
            src.port().to_string(),
            dst.ip().to_string(),
            dst.port().to_string(),
        )
    }

    /// Build from two `host:port` strings. A missing port is left empty.
    pub fn parse(src: &str, dst: &str) -> Self {
        let (src_host, src_port) = split_host_port(src);
        let (dst_host, dst_port) = split_host_port(dst);
        Self::new(src_host, src_port, dst_host, dst_port)
    }

    /// The same endpoints seen from the other direction.
    pub fn reversed(&self) -> Self {
        Self {
            src_host: self.dst_host.clone(),
            src_port: self.dst_port.clone(),
            dst_host: self.src_host.clone(),
            dst_port: self.src_port.clone(),
        }
    }
}

fn split_host_port(addr: &str) -> (&str, &str) {
    match addr.rsplit_once(':') {
        Some((host, port)) => (host.trim_start_matches('[').trim_end_matches(']'), port),
        None => (addr, ""),
    }
}

impl std::fmt::Display for Endpoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.src_host, self.src_port, self.dst_host, self.dst_port
        )
    }
}

/// Ordered header list with case-sensitive storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. An exact duplicate name keeps its position and takes
    /// the new value.
    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive lookup; the last matching entry wins.
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One request or response reconstructed from a flow.
#[derive(Debug, Clone)]
pub struct HttpMessage {
    id: MessageId,
    direction: Direction,
    endpoints: Endpoints,
    head_line: String,
    headers: Headers,
    body: String,
    body_lines: usize,
    chunked: bool,
    websocket: bool,
    body_format: BodyFormat,
}

impl HttpMessage {
    /// Start a message from its classified first line.
    pub fn new(id: MessageId, direction: Direction, endpoints: Endpoints, head_line: String) -> Self {
        Self {
            id,
            direction,
            endpoints,
            head_line,
            headers: Headers::new(),
            body: String::new(),
            body_lines: 0,
            chunked: false,
            websocket: false,
            body_format: BodyFormat::None,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn head_line(&self) -> &str {
        &self.head_line
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// True when `Transfer-Encoding: chunked` was seen.
    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    /// True when `Upgrade: websocket` was seen.
    pub fn is_websocket(&self) -> bool {
        self.websocket
    }

    pub fn body_format(&self) -> BodyFormat {
        self.body_format
    }

    /// Record a header and update the control flags it drives.
    pub(crate) fn add_header(&mut self, name: String, value: String) {
        if name.eq_ignore_ascii_case(HEADER_TRANSFER_ENCODING) {
            if value.eq_ignore_ascii_case(CHUNKED) {
                self.chunked = true;
            }
        } else if name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE) {
            let format = BodyFormat::detect(&value);
            if format != BodyFormat::None {
                self.body_format = format;
            }
        } else if name.eq_ignore_ascii_case(HEADER_UPGRADE) && value.eq_ignore_ascii_case(WEBSOCKET) {
            self.websocket = true;
        }
        self.headers.insert(name, value);
    }

    /// Append one body line, delimiter first unless it is the first line.
    pub(crate) fn append_body_line(&mut self, line: &str) {
        if self.body_lines > 0 {
            self.body.push_str(LINE_BREAK);
        }
        self.body.push_str(line);
        self.body_lines += 1;
    }
}
