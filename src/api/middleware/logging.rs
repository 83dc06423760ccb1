//! Request logging middleware.
//!
//! Logs every API request with method, path, caller and response status.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::caller_id;

pub async fn log_access(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let caller = caller_id(req.headers()).unwrap_or("-").to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, %caller, status, elapsed_ms, "API request failed");
    } else {
        tracing::info!(%method, %path, %caller, status, elapsed_ms, "API request");
    }

    response
}
