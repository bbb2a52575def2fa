//! Session tokens and the [`Authenticated`] extractor.
//!
//! A session is an HS256 JWT carrying the user's id and email. It is handed
//! out in the JSON body of `/users/register` and `/users/login` and also set
//! as an `HttpOnly` `session` cookie, so both API clients and browsers work.

use assets_core::user::User;
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// User id.
  pub sub:   Uuid,
  pub email: String,
  /// Expiry as a Unix timestamp.
  pub exp:   i64,
}

// ─── Token issuing ────────────────────────────────────────────────────────────

pub struct SessionTokens {
  encoding: EncodingKey,
  decoding: DecodingKey,
  ttl:      Duration,
}

impl SessionTokens {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      ttl,
    }
  }

  /// Sign a fresh token for `user`.
  pub fn issue(&self, user: &User) -> Result<String, ApiError> {
    let claims = Claims {
      sub:   user.id,
      email: user.email.clone(),
      exp:   (Utc::now() + self.ttl).timestamp(),
    };
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|e| ApiError::Internal(Box::new(e)))
  }

  /// Check the signature and expiry of `token`.
  pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
    jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
      .map(|data| data.claims)
      .map_err(|_| ApiError::Unauthorized("invalid or expired session".into()))
  }

  /// `Set-Cookie` value carrying `token`.
  pub fn cookie(&self, token: &str) -> String {
    format!(
      "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
      self.ttl.num_seconds()
    )
  }
}

// ─── Extractor ────────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried a valid session.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Find a token in `Authorization: Bearer …`, falling back to the session
/// cookie.
fn session_token(headers: &HeaderMap) -> Option<&str> {
  if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
    return value.strip_prefix("Bearer ").map(str::trim);
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find_map(|(name, value)| (name == SESSION_COOKIE).then_some(value))
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = session_token(&parts.headers)
      .ok_or_else(|| ApiError::Unauthorized("missing session".into()))?;
    let claims = state.tokens.verify(token)?;
    Ok(Authenticated(claims))
  }
}
