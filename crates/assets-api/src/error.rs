//! API error type, extractor wrappers, and [`axum::response::IntoResponse`]
//! implementation.

use axum::{
  Json,
  extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<assets_service::Error> for ApiError {
  fn from(e: assets_service::Error) -> Self {
    use assets_service::Error;
    match e {
      Error::Validation(_) => ApiError::BadRequest(e.to_string()),
      Error::NotFound(_) => ApiError::NotFound(e.to_string()),
      Error::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
      Error::Authentication => ApiError::Unauthorized(e.to_string()),
      Error::Processing(source) => ApiError::Internal(source),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(e: PathRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { ApiError::BadRequest(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

// ─── Extractors ───────────────────────────────────────────────────────────────

// The stock extractors answer malformed input with plain-text bodies and, for
// JSON, a 422. These wrappers route every rejection through `ApiError`.

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Take the single record a one-element batch produced.
pub(crate) fn single<T>(mut items: Vec<T>, what: &str) -> Result<T, ApiError> {
  match (items.pop(), items.is_empty()) {
    (Some(item), true) => Ok(item),
    _ => Err(ApiError::NotFound(what.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn internal_errors_hide_their_source() {
    let err = ApiError::Internal(Box::new(std::io::Error::other(
      "UNIQUE constraint failed: users.email",
    )));
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "internal error" }));
  }

  #[test]
  fn single_rejects_empty_and_oversized_batches() {
    assert_eq!(single(vec![7], "x").unwrap(), 7);
    assert!(matches!(single(Vec::<u8>::new(), "x"), Err(ApiError::NotFound(_))));
    assert!(matches!(single(vec![1, 2], "x"), Err(ApiError::NotFound(_))));
  }
}
