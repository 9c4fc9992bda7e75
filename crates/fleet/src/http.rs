// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for tenant management endpoints.
//!
//! Sends HTTP/1.1 requests over TCP with bearer-token authentication and
//! reads responses using Content-Length framing (does not depend on
//! connection close for EOF). Every call takes an explicit timeout covering
//! the entire operation — connect, write, and read — so a hung remote node
//! costs at most that budget and never hangs the controller.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("io error: {0}")]
    Io(String),
    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {code}: {body}")]
    Status { code: u16, body: String },
}

impl HttpError {
    /// Transport-level failures: the endpoint could not be reached at all.
    /// Distinct from [`HttpError::Status`], where it answered but refused.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, HttpError::Timeout | HttpError::Connect(_) | HttpError::Io(_))
    }
}

pub async fn get(addr: &str, path: &str, timeout: Duration) -> Result<String, HttpError> {
    let request = format!("GET {} HTTP/1.1\r\nHost: {}\r\n\r\n", path, addr);
    timed_request(addr, &request, timeout).await
}

pub async fn get_authed(
    addr: &str,
    path: &str,
    token: &str,
    timeout: Duration,
) -> Result<String, HttpError> {
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nAuthorization: Bearer {}\r\n\r\n",
        path, addr, token
    );
    timed_request(addr, &request, timeout).await
}

pub async fn put_authed(
    addr: &str,
    path: &str,
    body: &str,
    token: &str,
    timeout: Duration,
) -> Result<String, HttpError> {
    timed_request(addr, &authed_with_body("PUT", addr, path, body, token), timeout).await
}

pub async fn post_authed(
    addr: &str,
    path: &str,
    body: &str,
    token: &str,
    timeout: Duration,
) -> Result<String, HttpError> {
    timed_request(addr, &authed_with_body("POST", addr, path, body, token), timeout).await
}

fn authed_with_body(method: &str, addr: &str, path: &str, body: &str, token: &str) -> String {
    format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nAuthorization: Bearer {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        method,
        path,
        addr,
        token,
        body.len(),
        body
    )
}

async fn timed_request(addr: &str, request: &str, timeout: Duration) -> Result<String, HttpError> {
    tokio::time::timeout(timeout, send_request(addr, request))
        .await
        .map_err(|_| HttpError::Timeout)?
}

async fn send_request(addr: &str, request: &str) -> Result<String, HttpError> {
    let mut stream =
        TcpStream::connect(addr).await.map_err(|e| HttpError::Connect(e.to_string()))?;
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| HttpError::Io(format!("write failed: {e}")))?;

    let mut reader = BufReader::new(&mut stream);
    read_response(&mut reader).await
}

/// Read and parse an HTTP/1.1 response from a buffered stream.
async fn read_response<R: tokio::io::AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> Result<String, HttpError> {
    let mut status_line = String::new();
    reader
        .read_line(&mut status_line)
        .await
        .map_err(|e| HttpError::Io(format!("read status failed: {e}")))?;

    let status_code =
        status_line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

    // Headers: only Content-Length matters (case-insensitive).
    let mut content_length: usize = 0;
    loop {
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .await
            .map_err(|e| HttpError::Io(format!("read header failed: {e}")))?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let line_lower = line.to_ascii_lowercase();
        if let Some(val) = line_lower.strip_prefix("content-length:") {
            content_length = val.trim().parse().unwrap_or(0);
        }
    }

    let body = if content_length > 0 {
        let mut buf = vec![0u8; content_length];
        reader
            .read_exact(&mut buf)
            .await
            .map_err(|e| HttpError::Io(format!("read body failed: {e}")))?;
        String::from_utf8_lossy(&buf).into_owned()
    } else {
        String::new()
    };

    if !(200..300).contains(&status_code) {
        return Err(HttpError::Status { code: status_code, body: body.trim().to_string() });
    }

    Ok(body)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
