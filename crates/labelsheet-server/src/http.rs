// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Minimal HTTP/1.1 framing over raw TCP.
//
// Only what the sheet server needs: one request per connection, the request
// line, headers, and a `Content-Length` body. Responses always close the
// connection.

use labelsheet_core::error::{LabelsheetError, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Largest accepted request line plus headers.
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

const READ_CHUNK: usize = 8192;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A fully read HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Request target without the query string.
    pub path: String,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Request line and headers, before the body is read.
#[derive(Debug)]
struct RequestHead {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
}

impl RequestHead {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared body length. Bodies must be framed by `Content-Length`;
    /// any transfer coding other than `identity` is refused.
    fn content_length(&self) -> Result<usize> {
        if let Some(coding) = self.header("transfer-encoding") {
            if !coding.eq_ignore_ascii_case("identity") {
                return Err(LabelsheetError::InvalidRequest(format!(
                    "Transfer-Encoding {coding:?} is not supported; send a Content-Length body"
                )));
            }
        }
        match self.header("content-length") {
            None => Ok(0),
            Some(value) => value.trim().parse::<usize>().map_err(|_| {
                LabelsheetError::InvalidRequest(format!("bad Content-Length: {value:?}"))
            }),
        }
    }
}

/// Parse the request line and headers (everything before the blank line).
fn parse_head(head: &[u8]) -> Result<RequestHead> {
    let text = std::str::from_utf8(head)
        .map_err(|_| LabelsheetError::InvalidRequest("request head is not UTF-8".into()))?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(LabelsheetError::InvalidRequest(format!(
            "malformed request line: {request_line:?}"
        )));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(LabelsheetError::InvalidRequest(format!(
            "unsupported protocol {version}"
        )));
    }

    let mut headers = Vec::new();
    for line in lines.filter(|l| !l.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            return Err(LabelsheetError::InvalidRequest(format!(
                "malformed header line: {line:?}"
            )));
        };
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    let path = target.split('?').next().unwrap_or(target).to_string();
    Ok(RequestHead {
        method: method.to_ascii_uppercase(),
        path,
        headers,
    })
}

/// Find the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Read one request from `reader`.
///
/// Returns `Ok(None)` when the peer closes the connection without sending
/// anything. A declared body larger than `max_body` fails with
/// `PayloadTooLarge` before any of the body is read.
pub async fn read_request<R>(reader: &mut R, max_body: usize) -> Result<Option<HttpRequest>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let header_end = loop {
        if let Some(pos) = find_subsequence(&buf, b"\r\n\r\n") {
            break pos;
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(LabelsheetError::InvalidRequest(
                "header section too large".into(),
            ));
        }
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| LabelsheetError::Server(format!("read request head: {e}")))?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            return Err(LabelsheetError::InvalidRequest(
                "connection closed before end of headers".into(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = parse_head(&buf[..header_end])?;
    let content_length = head.content_length()?;
    if content_length > max_body {
        return Err(LabelsheetError::PayloadTooLarge { limit: max_body });
    }

    let mut body = buf.split_off(header_end + 4);
    while body.len() < content_length {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| LabelsheetError::Server(format!("read request body: {e}")))?;
        if n == 0 {
            return Err(LabelsheetError::InvalidRequest(format!(
                "body truncated at {} of {content_length} bytes",
                body.len()
            )));
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(Some(HttpRequest {
        method: head.method,
        path: head.path,
        headers: head.headers,
        body,
    }))
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// An HTTP response. `Content-Length` and `Connection: close` are added on
/// serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// A response with no body.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: value.to_string().into_bytes(),
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.headers.push(("Content-Type".into(), content_type.into()));
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Status line and headers, terminated by the blank line.
    fn head_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason_phrase(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");
        head.into_bytes()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.head_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Write `response` and flush.
pub async fn write_response<W>(writer: &mut W, response: &HttpResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(&response.head_bytes())
        .await
        .map_err(|e| LabelsheetError::Server(format!("write HTTP headers: {e}")))?;

    writer
        .write_all(&response.body)
        .await
        .map_err(|e| LabelsheetError::Server(format!("write HTTP body: {e}")))?;

    writer
        .flush()
        .await
        .map_err(|e| LabelsheetError::Server(format!("flush: {e}")))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn read(raw: &[u8], max_body: usize) -> Result<Option<HttpRequest>> {
        let mut reader = raw;
        read_request(&mut reader, max_body).await
    }

    #[tokio::test]
    async fn reads_post_with_body() {
        let raw = b"POST /generate HTTP/1.1\r\n\
                    Host: localhost:5000\r\n\
                    Content-Type: application/json\r\n\
                    Content-Length: 13\r\n\
                    \r\n\
                    {\"codes\":\"\"}X";
        let req = read(raw, 1024).await.expect("read").expect("request");
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/generate");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body, b"{\"codes\":\"\"}X");
    }

    #[tokio::test]
    async fn query_string_is_dropped_from_path() {
        let raw = b"GET /health?verbose=1 HTTP/1.1\r\n\r\n";
        let req = read(raw, 1024).await.expect("read").expect("request");
        assert_eq!(req.path, "/health");
        assert!(req.body.is_empty());
    }

    #[tokio::test]
    async fn closed_connection_yields_none() {
        assert!(read(b"", 1024).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_reading() {
        let raw = b"POST /generate HTTP/1.1\r\nContent-Length: 5000\r\n\r\n";
        match read(raw, 1024).await {
            Err(LabelsheetError::PayloadTooLarge { limit }) => assert_eq!(limit, 1024),
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_body_is_invalid() {
        let raw = b"POST /generate HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert!(matches!(
            read(raw, 1024).await,
            Err(LabelsheetError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn chunked_body_is_refused() {
        let raw = b"POST /generate HTTP/1.1\r\n\
                    Transfer-Encoding: chunked\r\n\
                    \r\n\
                    d\r\n{\"codes\":\"\"}X\r\n0\r\n\r\n";
        match read(raw, 1024).await {
            Err(LabelsheetError::InvalidRequest(msg)) => {
                assert!(msg.contains("Transfer-Encoding"));
                assert!(msg.contains("Content-Length"));
            }
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn identity_transfer_encoding_is_plain_length() {
        let raw = b"POST /generate HTTP/1.1\r\nTransfer-Encoding: identity\r\nContent-Length: 2\r\n\r\n{}";
        let req = read(raw, 1024).await.expect("read").expect("request");
        assert_eq!(req.body, b"{}");
    }

    #[tokio::test]
    async fn garbage_request_line_is_invalid() {
        assert!(matches!(
            read(b"hello\r\n\r\n", 1024).await,
            Err(LabelsheetError::InvalidRequest(_))
        ));
    }

    #[test]
    fn response_carries_length_and_close() {
        let resp = HttpResponse::error(400, "No valid codes").with_header("X-Test", "1");
        let text = String::from_utf8(resp.to_bytes()).expect("utf8");
        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Content-Type: application/json\r\n"));
        assert!(text.contains("X-Test: 1\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", resp.body.len())));
        assert!(text.contains("Connection: close\r\n\r\n"));
        assert!(text.ends_with(r#"{"error":"No valid codes"}"#));
    }

    #[test]
    fn find_subsequence_locates_header_end() {
        assert_eq!(find_subsequence(b"ab\r\n\r\ncd", b"\r\n\r\n"), Some(2));
        assert_eq!(find_subsequence(b"abcd", b"\r\n\r\n"), None);
    }
}
