use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use std::fmt::Write;
use std::time::Instant;

use crate::api::error_response;

/// Per-request trace id, stored in request extensions and echoed back as
/// `X-Trace-Id`. Handlers copy it into the response envelope.
#[derive(Clone)]
pub struct TraceId(pub String);

impl std::ops::Deref for TraceId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

pub const TRACE_ID_HEADER: &str = "X-Trace-Id";

/// Maximum number of bytes logged from a request or response body.
const MAX_BODY_LOG_CHARS: usize = 200;

/// Request bodies are buffered up to axum's default `Json` extractor limit;
/// anything larger is answered with 413 here.
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// 16 hex chars from 8 random bytes.
fn generate_trace_id() -> String {
    let bytes: [u8; 8] = rand::thread_rng().gen();
    let mut s = String::with_capacity(16);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Cuts a UTF-8 body to at most `max` bytes on a char boundary.
fn truncate_body(bytes: &[u8], max: usize) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if s.len() > max => {
            let mut end = max;
            while end > 0 && !s.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &s[..end])
        }
        Ok(s) => s.to_string(),
        Err(_) => "<non-utf8 body>".to_string(),
    }
}

fn format_elapsed(elapsed_us: u128) -> String {
    if elapsed_us < 1000 {
        format!("{elapsed_us}µs")
    } else if elapsed_us < 1_000_000 {
        format!("{}ms", elapsed_us / 1000)
    } else {
        format!("{:.1}s", elapsed_us as f64 / 1_000_000.0)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

fn body_snippet(bytes: &Bytes) -> String {
    if bytes.is_empty() {
        String::new()
    } else {
        truncate_body(bytes, MAX_BODY_LOG_CHARS)
    }
}

fn log_response(trace_id: &str, status: StatusCode, elapsed: &str, body: &str) {
    let code = status.as_u16();
    if status.is_server_error() {
        tracing::error!(trace_id = %trace_id, status = code, elapsed = %elapsed, body = %body, "<-- response");
    } else if status.is_client_error() {
        tracing::warn!(trace_id = %trace_id, status = code, elapsed = %elapsed, body = %body, "<-- response");
    } else {
        tracing::info!(trace_id = %trace_id, status = code, elapsed = %elapsed, body = %body, "<-- response");
    }
}

/// Request/response logging middleware.
///
/// Assigns the trace id, logs one `-->` line per request (with a body snippet
/// for write methods) and one `<--` line per response, and sets
/// `X-Trace-Id` on the way out.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let trace_id = generate_trace_id();
    req.extensions_mut().insert(TraceId(trace_id.clone()));

    let method = req.method().clone();
    let uri = req.uri().clone();

    // Swagger UI 静态资源不记录
    if uri.path().starts_with("/docs") {
        return next.run(req).await;
    }

    let has_body = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let (req, req_body) = if has_body {
        let (parts, body) = req.into_parts();
        match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => {
                let snippet = body_snippet(&bytes);
                (Some(Request::from_parts(parts, Body::from(bytes))), snippet)
            }
            Err(_) => (None, "<too large>".to_string()),
        }
    } else {
        (Some(req), String::new())
    };

    tracing::info!(
        trace_id = %trace_id,
        method = %method,
        path = %uri,
        body = %req_body,
        "--> request"
    );

    let start = Instant::now();
    let response = match req {
        Some(req) => next.run(req).await,
        None => error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            &trace_id,
            "payload_too_large",
            "request body exceeds 2 MiB",
        ),
    };
    let elapsed = format_elapsed(start.elapsed().as_micros());

    let (mut parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let resp_body = if is_json(&parts.headers) {
        body_snippet(&bytes)
    } else {
        String::new()
    };
    log_response(&trace_id, parts.status, &elapsed, &resp_body);

    if let Ok(val) = HeaderValue::from_str(&trace_id) {
        parts.headers.insert(TRACE_ID_HEADER, val);
    }
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_id_is_sixteen_hex_chars() {
        let id = generate_trace_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "告警".repeat(100);
        let out = truncate_body(body.as_bytes(), 10);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 13);
        assert_eq!(truncate_body(b"short", 10), "short");
        assert_eq!(truncate_body(&[0xff, 0xfe], 10), "<non-utf8 body>");
    }

    #[test]
    fn elapsed_formatting_picks_unit() {
        assert_eq!(format_elapsed(250), "250µs");
        assert_eq!(format_elapsed(4_500), "4ms");
        assert_eq!(format_elapsed(2_500_000), "2.5s");
    }
}
