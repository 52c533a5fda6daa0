//! Rendering of messages into output records.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::RenderConfig;
use crate::http::{BodyFormat, HttpMessage, MessageId, LINE_BREAK};
use crate::observability::metrics;
use crate::output::OutputSink;
use crate::render::{prettify_json, prettify_xml};

const BANNER_RULE: &str = "----------------------";

/// Renders messages and writes them to the output sink.
///
/// Cheap to clone; every flow task holds its own copy.
#[derive(Clone)]
pub struct MessagePresenter {
    sink: Arc<dyn OutputSink>,
    settings: Arc<ArcSwap<RenderConfig>>,
}

impl MessagePresenter {
    /// Create a presenter whose settings can be swapped at runtime.
    pub fn new(sink: Arc<dyn OutputSink>, settings: Arc<ArcSwap<RenderConfig>>) -> Self {
        Self { sink, settings }
    }

    /// Create a presenter with fixed settings.
    pub fn with_config(sink: Arc<dyn OutputSink>, config: RenderConfig) -> Self {
        Self::new(sink, Arc::new(ArcSwap::from_pointee(config)))
    }

    /// Shared handle to the render settings.
    pub fn settings(&self) -> Arc<ArcSwap<RenderConfig>> {
        Arc::clone(&self.settings)
    }

    /// Write a finished message: head, body and trailing delimiter.
    pub fn present_message(&self, message: &HttpMessage) {
        let pretty = self.settings.load().pretty;
        self.sink.append(&render_message(message, pretty));
        metrics::record_message(message.direction());
    }

    /// Write the head of a message whose body is streamed as frames.
    pub fn present_head(&self, message: &HttpMessage) {
        self.sink.append(&render_head(message));
        metrics::record_message(message.direction());
    }

    /// Write one live frame line.
    pub fn present_frame(&self, id: MessageId, line: &str) {
        self.sink.append(&render_frame(id, line));
        metrics::record_websocket_frame();
    }
}

/// Banner, endpoints, head line and headers, followed by a blank line.
pub fn render_head(message: &HttpMessage) -> String {
    let mut out = String::with_capacity(256);

    out.push_str(BANNER_RULE);
    out.push_str(&format!(" [{}] {} ", message.id(), message.direction()));
    out.push_str(BANNER_RULE);
    out.push_str(LINE_BREAK);

    out.push_str(&message.endpoints().to_string());
    out.push_str(LINE_BREAK);
    out.push_str(LINE_BREAK);

    out.push_str(message.head_line());
    out.push_str(LINE_BREAK);

    for (name, value) in message.headers().iter() {
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str(LINE_BREAK);
    }

    out.push_str(LINE_BREAK);
    out
}

/// Full record for a buffered message.
pub fn render_message(message: &HttpMessage, pretty: bool) -> String {
    let mut out = render_head(message);
    out.push_str(&render_body(message, pretty));
    out.push_str(LINE_BREAK);
    out
}

/// Body block, pretty-printed according to the message's body format.
///
/// Falls back to the raw body when pretty-printing is disabled or fails.
pub fn render_body(message: &HttpMessage, pretty: bool) -> String {
    let body = message.body();
    let format = message.body_format();

    let formatted = match format {
        BodyFormat::None => return body.to_string(),
        _ if !pretty => return body.to_string(),
        BodyFormat::Json => prettify_json(body),
        BodyFormat::Xml => prettify_xml(body),
    };

    match formatted {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                message_id = %message.id(),
                format = format.as_str(),
                error = %e,
                "Pretty-print failed, emitting raw body"
            );
            metrics::record_pretty_failure(format);
            body.to_string()
        }
    }
}

/// `[id] line` record for a live frame.
pub fn render_frame(id: MessageId, line: &str) -> String {
    format!("[{}] {}", id, line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Direction, Endpoints, SequenceAllocator};
    use crate::output::MemorySink;

    fn json_request(body: &str) -> HttpMessage {
        let ids = SequenceAllocator::new();
        let mut msg = HttpMessage::new(
            ids.next(),
            Direction::Request,
            Endpoints::parse("10.0.0.1:51000", "10.0.0.2:80"),
            "POST /api HTTP/1.1".to_string(),
        );
        msg.add_header("Host".into(), "example.com".into());
        msg.add_header("Content-Type".into(), "application/json".into());
        msg.append_body_line(body);
        msg
    }

    #[test]
    fn test_head_layout() {
        let msg = json_request("{}");
        let expected = "---------------------- [1] Request ----------------------\r\n\
                        10.0.0.1:51000 -> 10.0.0.2:80\r\n\
                        \r\n\
                        POST /api HTTP/1.1\r\n\
                        Host: example.com\r\n\
                        Content-Type: application/json\r\n\
                        \r\n";
        assert_eq!(render_head(&msg), expected);
    }

    #[test]
    fn test_message_pretty_json() {
        let msg = json_request(r#"{"a":1}"#);
        let rendered = render_message(&msg, true);
        assert!(rendered.ends_with("\r\n\r\n{\n    \"a\": 1\n}\r\n"));
    }

    #[test]
    fn test_pretty_disabled_emits_raw() {
        let msg = json_request(r#"{"a":1}"#);
        assert_eq!(render_body(&msg, false), r#"{"a":1}"#);
    }

    #[test]
    fn test_invalid_json_emits_raw() {
        let msg = json_request(r#"{"a":"#);
        assert_eq!(render_body(&msg, true), r#"{"a":"#);
    }

    #[test]
    fn test_frame_record() {
        let ids = SequenceAllocator::new();
        assert_eq!(render_frame(ids.next(), "hello"), "[1] hello");
    }

    #[test]
    fn test_presenter_writes_to_sink() {
        let sink = Arc::new(MemorySink::new());
        let presenter = MessagePresenter::with_config(sink.clone(), RenderConfig { pretty: false });

        let msg = json_request(r#"{"a":1}"#);
        presenter.present_message(&msg);
        presenter.present_frame(msg.id(), "ping");

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert!(records[0].ends_with("{\"a\":1}\r\n"));
        assert_eq!(records[1], "[1] ping");
    }

    #[test]
    fn test_settings_swap_applies_to_next_message() {
        let sink = Arc::new(MemorySink::new());
        let presenter = MessagePresenter::with_config(sink.clone(), RenderConfig { pretty: true });
        let msg = json_request(r#"{"a":1}"#);

        presenter.present_message(&msg);
        presenter.settings().store(Arc::new(RenderConfig { pretty: false }));
        presenter.present_message(&msg);

        let records = sink.records();
        assert!(records[0].contains("    \"a\": 1"));
        assert!(records[1].contains("{\"a\":1}"));
    }
}
