//! JSON pretty-printing.
//!
//! The document is validated with `serde_json`, then re-indented token by
//! token. Strings, numbers and duplicate keys are copied exactly as they
//! appear in the body; only whitespace between tokens changes.

use serde::de::IgnoredAny;

use crate::render::{PrettyError, INDENT_WIDTH};

/// Re-indent a JSON document with four spaces per level.
///
/// Empty objects and arrays stay on one line (`{}`, `[]`). Whitespace-only
/// input is returned unchanged.
pub fn prettify_json(src: &str) -> Result<String, PrettyError> {
    if src.trim().is_empty() {
        return Ok(src.to_string());
    }

    serde_json::from_str::<IgnoredAny>(src)?;

    Ok(String::from_utf8(reindent(src.trim().as_bytes()))?)
}

fn reindent(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < src.len() {
        let byte = src[i];

        if in_string {
            out.push(byte);
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        match byte {
            b'"' => {
                in_string = true;
                out.push(byte);
            }
            b'{' | b'[' => {
                out.push(byte);
                let close = if byte == b'{' { b'}' } else { b']' };
                match next_token(src, i + 1) {
                    Some(j) if src[j] == close => {
                        out.push(close);
                        i = j;
                    }
                    _ => {
                        depth += 1;
                        line_break(&mut out, depth);
                    }
                }
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                line_break(&mut out, depth);
                out.push(byte);
            }
            b',' => {
                out.push(byte);
                line_break(&mut out, depth);
            }
            b':' => out.extend_from_slice(b": "),
            b' ' | b'\t' | b'\r' | b'\n' => {}
            _ => out.push(byte),
        }
        i += 1;
    }

    out
}

/// Index of the next non-whitespace byte at or after `from`.
fn next_token(src: &[u8], from: usize) -> Option<usize> {
    (from..src.len()).find(|&j| !matches!(src[j], b' ' | b'\t' | b'\r' | b'\n'))
}

fn line_break(out: &mut Vec<u8>, depth: usize) {
    out.push(b'\n');
    out.resize(out.len() + depth * INDENT_WIDTH, b' ');
}
