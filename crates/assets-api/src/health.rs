//! `GET /health`: liveness plus the count of compensation steps that failed
//! since startup. A non-zero count means orphaned records may exist.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::AppState;

/// `GET /health`
pub async fn handler<S>(State(state): State<AppState<S>>) -> Json<Value> {
  Json(json!({
    "status": "ok",
    "rollback_failures": state.observer.failures(),
  }))
}
