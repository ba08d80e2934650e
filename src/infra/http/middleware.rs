use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const METRIC_HTTP_REQUEST_MS: &str = "folio_http_request_ms";

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_FORWARDED_ID_LEN: usize = 64;

/// Reuse a forwarded request id when it is short printable ASCII.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_FORWARDED_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Tag the request with an id, run it inside a span and log the outcome.
///
/// Error responses carry an [`ErrorReport`] extension; it is consumed here so
/// the chain of causes lands in the log rather than in the page.
pub async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or("").to_string();
    let span = info_span!(
        target: "folio::http",
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let start = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    metrics::histogram!(METRIC_HTTP_REQUEST_MS).record(elapsed.as_secs_f64() * 1_000.0);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let _entered = span.enter();
    let status = response.status();
    let elapsed_ms = elapsed.as_millis();

    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target: "folio::http::response",
            status = status.as_u16(),
            elapsed_ms,
            "request served",
        );
        return response;
    }

    let (source, messages) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");

    if status.is_server_error() {
        error!(
            target: "folio::http::response",
            status = status.as_u16(),
            query = %query,
            elapsed_ms,
            source,
            detail = %detail,
            chain = ?messages,
            "request failed",
        );
    } else {
        warn!(
            target: "folio::http::response",
            status = status.as_u16(),
            query = %query,
            elapsed_ms,
            source,
            detail = %detail,
            "client request error",
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwarded_ids_are_reused_when_sane() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("edge-42"));
        assert_eq!(request_id(&headers), "edge-42");
    }

    #[test]
    fn oversized_or_missing_ids_are_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert(
            REQUEST_ID_HEADER,
            HeaderValue::from_str(&"x".repeat(MAX_FORWARDED_ID_LEN + 1)).expect("header"),
        );
        assert!(Uuid::parse_str(&request_id(&headers)).is_ok());
        assert!(Uuid::parse_str(&request_id(&HeaderMap::new())).is_ok());
    }
}
