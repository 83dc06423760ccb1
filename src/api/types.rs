//! Shared types for the API layer: router state and request extractors.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::db::Storage;

/// Header carrying the caller identity. Trusted as-is.
pub const CALLER_HEADER: &str = "user-id";

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    pub fn storage(&self) -> &Storage {
        self.core.storage()
    }
}

// ═══════════════════════════════════════════════════════════
// Caller identity
// ═══════════════════════════════════════════════════════════

/// Identity of the calling user, taken from the `user-id` header.
///
/// Extraction fails with 401 when the header is missing or blank, before
/// the handler body (and so the store) runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
}

/// Read the caller id from request headers, if present and non-blank.
pub fn caller_id(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller_id(&parts.headers)
            .map(|id| Caller {
                user_id: id.to_string(),
            })
            .ok_or(ApiError::Unauthorized)
    }
}

// ═══════════════════════════════════════════════════════════
// JSON body
// ═══════════════════════════════════════════════════════════

/// `Json` extractor whose rejection is an `ApiError` (400 with `{ error }`).
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn caller_id_requires_non_blank_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_id(&headers), None);

        headers.insert(CALLER_HEADER, HeaderValue::from_static("   "));
        assert_eq!(caller_id(&headers), None);

        headers.insert(CALLER_HEADER, HeaderValue::from_static(" u1 "));
        assert_eq!(caller_id(&headers), Some("u1"));
    }
}
