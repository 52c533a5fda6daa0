//! Line-oriented reading of a flow.

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads `\n`-terminated lines, stripping `\n` or `\r\n`.
///
/// Unlike `tokio::io::Lines`, invalid UTF-8 is replaced rather than treated
/// as an error, since captured payloads are not guaranteed to be text.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(1024),
        }
    }

    /// Next line, or `None` at end of stream. A final unterminated line is
    /// returned before `None`.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.read_line(usize::MAX).await
    }

    /// Like [`next_line`](Self::next_line), but returns after at most `limit`
    /// bytes. A longer line comes back as an unterminated piece and the rest
    /// stays unread.
    pub async fn next_line_limited(&mut self, limit: usize) -> io::Result<Option<String>> {
        self.read_line(limit).await
    }

    async fn read_line(&mut self, limit: usize) -> io::Result<Option<String>> {
        self.buf.clear();
        let mut terminated = false;

        while !terminated && self.buf.len() < limit {
            let available = self.inner.fill_buf().await?;
            if available.is_empty() {
                break;
            }

            let window = &available[..available.len().min(limit - self.buf.len())];
            let used = match window.iter().position(|&b| b == b'\n') {
                Some(newline) => {
                    terminated = true;
                    newline + 1
                }
                None => window.len(),
            };
            self.buf.extend_from_slice(&window[..used]);
            self.inner.consume(used);
        }

        if self.buf.is_empty() {
            return Ok(None);
        }

        if terminated {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> Vec<String> {
        let mut reader = LineReader::new(input);
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_crlf_and_lf() {
        let lines = collect(b"GET / HTTP/1.1\r\nHost: a\n\r\nbody").await;
        assert_eq!(lines, vec!["GET / HTTP/1.1", "Host: a", "", "body"]);
    }

    #[tokio::test]
    async fn test_trailing_newline_gives_no_extra_line() {
        assert_eq!(collect(b"a\r\nb\r\n").await, vec!["a", "b"]);
        assert!(collect(b"").await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_replaced() {
        let lines = collect(b"ok\xff\r\n").await;
        assert_eq!(lines, vec!["ok\u{fffd}"]);
    }

    #[tokio::test]
    async fn test_long_line_unsplit_without_limit() {
        let mut input = vec![b'x'; 10_000];
        input.extend_from_slice(b"\r\nnext");
        let lines = collect(&input).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 10_000);
        assert_eq!(lines[1], "next");
    }

    #[tokio::test]
    async fn test_limited_read_stops_at_limit() {
        let input = vec![b'x'; 1 << 20];
        let mut reader = LineReader::new(&input[..]);

        let piece = reader.next_line_limited(4096).await.unwrap().unwrap();
        assert_eq!(piece.len(), 4096);

        let mut short = LineReader::new(&b"GET / HTTP/1.1\r\nHost: a\r\n"[..]);
        assert_eq!(short.next_line_limited(4096).await.unwrap().unwrap(), "GET / HTTP/1.1");
        assert_eq!(short.next_line().await.unwrap().unwrap(), "Host: a");
    }
}
