//! Hand written HTTP/1.x framing of the JSON-RPC connections.
//!
//! The request head and body are read from the raw stream, and the response bytes are written
//! directly, the connection being closed afterwards.

use std::collections::HashMap;
use std::io;

use axum::http::StatusCode;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound of a request head plus body.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

const READ_CHUNK_SIZE: usize = 4096;
const DEFAULT_HTTP_VERSION: &str = "HTTP/1.1";
const CONTINUE_RESPONSE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Request framing errors.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The stream failed.
    #[error("connection error")]
    Io(#[from] io::Error),

    /// The bytes received are not an HTTP request.
    #[error("invalid http request: {0}")]
    Malformed(String),

    /// The request exceeds [MAX_REQUEST_BYTES].
    #[error("request too large")]
    TooLarge,

    /// The peer left before sending a full request head.
    #[error("connection closed before a full request was received")]
    ConnectionClosed,
}

/// A request read from a raw connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHttpRequest {
    /// Verb, as sent
    pub method: String,

    /// Request target
    pub path: String,

    /// Protocol of the request line, `HTTP/1.0` or `HTTP/1.1`
    pub version: String,

    /// Headers, names lowercased
    pub headers: HashMap<String, String>,

    /// Body, truncated to its `content-length`
    pub body: Vec<u8>,
}

impl RawHttpRequest {
    /// Protocol to mirror in the response status line.
    pub fn response_version(&self) -> &str {
        match self.version.as_str() {
            "HTTP/1.0" => "HTTP/1.0",
            _ => DEFAULT_HTTP_VERSION,
        }
    }
}

/// Read one request head and its body.
///
/// A client waiting on `Expect: 100-continue` is told to go on through `writer` before its body
/// is read.
pub async fn read_http_request<R: AsyncRead + Unpin, W: AsyncWrite + Unpin>(
    reader: &mut R,
    writer: &mut W,
) -> Result<RawHttpRequest, FramingError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let header_end = loop {
        if let Some(position) = find_header_end(&buffer) {
            break position;
        }
        if buffer.len() >= MAX_REQUEST_BYTES {
            return Err(FramingError::TooLarge);
        }
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Err(if buffer.is_empty() {
                FramingError::ConnectionClosed
            } else {
                FramingError::Malformed("truncated request head".to_string())
            });
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = std::str::from_utf8(&buffer[..header_end])
        .map_err(|_| FramingError::Malformed("request head is not utf-8".to_string()))?;
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let (method, path, version) = match (parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version)) if version.starts_with("HTTP/1.") => {
            (method.to_string(), path.to_string(), version.to_string())
        }
        _ => {
            return Err(FramingError::Malformed(format!(
                "bad request line '{request_line}'"
            )));
        }
    };

    let mut headers = HashMap::new();
    for line in lines.filter(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| FramingError::Malformed(format!("bad header line '{line}'")))?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    let content_length = match headers.get("content-length") {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| FramingError::Malformed(format!("bad content-length '{value}'")))?,
        None => 0,
    };
    if header_end
        .checked_add(content_length)
        .is_none_or(|request_length| request_length > MAX_REQUEST_BYTES)
    {
        return Err(FramingError::TooLarge);
    }

    let mut body = buffer[header_end..].to_vec();
    if body.len() < content_length && expects_continue(&version, &headers) {
        writer.write_all(CONTINUE_RESPONSE).await?;
        writer.flush().await?;
    }
    while body.len() < content_length {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Err(FramingError::Malformed("truncated request body".to_string()));
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(RawHttpRequest {
        method,
        path,
        version,
        headers,
        body,
    })
}

fn expects_continue(version: &str, headers: &HashMap<String, String>) -> bool {
    version == "HTTP/1.1"
        && headers
            .get("expect")
            .is_some_and(|expect| expect.eq_ignore_ascii_case("100-continue"))
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|position| position + 4)
}

/// Bytes of a JSON-RPC answer: status line, headers, body and a trailing newline.
pub fn build_json_response(version: &str, body: &[u8]) -> Vec<u8> {
    build_response(version, StatusCode::OK, "application/json", body)
}

/// Bytes of a plain text error answer sent before any JSON-RPC processing.
pub fn build_text_response(version: &str, status: StatusCode, text: &str) -> Vec<u8> {
    build_response(version, status, "text/plain; charset=utf-8", text.as_bytes())
}

fn build_response(
    version: &str,
    status: StatusCode,
    content_type: &str,
    body: &[u8],
) -> Vec<u8> {
    let content_length = body.len() + 1;
    let mut response = format!(
        "{version} {} {}\r\nConnection: close\r\nContent-Type: {content_type}\r\nContent-Length: {content_length}\r\n\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default(),
    )
    .into_bytes();
    response.extend_from_slice(body);
    response.push(b'\n');

    response
}

/// Write the answer bytes then shut the write side down.
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &[u8],
) -> io::Result<()> {
    writer.write_all(response).await?;
    writer.flush().await?;
    writer.shutdown().await
}
