//! XML pretty-printing.
//!
//! Tokens are decoded and re-encoded with indentation. Encoding only starts at
//! the first processing instruction (the `<?xml ...?>` declaration or any other
//! `<?...?>`): anything before it is dropped, and a document without one
//! formats to an empty string. A document that ends with elements still open
//! is an error.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::render::{PrettyError, INDENT_WIDTH};

/// Re-indent an XML document with four spaces per nesting level.
///
/// Whitespace-only input is returned unchanged.
pub fn prettify_xml(src: &str) -> Result<String, PrettyError> {
    if src.trim().is_empty() {
        return Ok(src.to_string());
    }

    let mut reader = Reader::from_str(src);
    reader.config_mut().trim_text(true);

    let mut writer = Writer::new_with_indent(Vec::with_capacity(src.len() * 2), b' ', INDENT_WIDTH);
    let mut encoding = false;
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PrettyError::Xml(e.to_string()))?;

        match event {
            Event::Eof if depth > 0 => {
                return Err(PrettyError::Xml(format!(
                    "unexpected end of document with {} unclosed element(s)",
                    depth
                )));
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) => encoding = true,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        if encoding {
            writer
                .write_event(event)
                .map_err(|e| PrettyError::Xml(e.to_string()))?;
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}
