//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users/register` | Body: `{"email":"…","password":"…"}`. 409 if taken |
//! | `POST` | `/users/login` | Same body. 401 on bad credentials |
//!
//! Both answer `{"user": …, "token": "…"}` and set the session cookie.

use assets_core::{
  params::{LoginUser, RegisterUser},
  store::Storage,
  user::User,
};
use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
  AppState,
  error::{ApiError, JsonBody},
};

#[derive(Debug, Serialize)]
pub struct Session {
  pub user:  User,
  pub token: String,
}

fn open_session<S>(
  state: &AppState<S>,
  status: StatusCode,
  user: User,
) -> Result<Response, ApiError> {
  let token = state.tokens.issue(&user)?;
  let cookie = state.tokens.cookie(&token);
  Ok((status, [(header::SET_COOKIE, cookie)], Json(Session { user, token })).into_response())
}

/// `POST /users/register`
pub async fn register<S: Storage>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<RegisterUser>,
) -> Result<Response, ApiError> {
  let user = state.users.register(body).await?;
  tracing::info!(user = %user.id, "user registered");
  open_session(&state, StatusCode::CREATED, user)
}

/// `POST /users/login`
pub async fn login<S: Storage>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginUser>,
) -> Result<Response, ApiError> {
  let user = state.users.login(body).await?;
  open_session(&state, StatusCode::OK, user)
}
