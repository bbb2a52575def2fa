//! JSON REST API for the assets service.
//!
//! Exposes an axum [`Router`] backed by any [`Storage`] implementation.
//! Mutating routes require a session token issued by `/users/register` or
//! `/users/login`; TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", assets_api::api_router(state))
//! ```

pub mod assets;
pub mod auth;
pub mod error;
pub mod favourites;
pub mod health;
pub mod users;

use std::sync::Arc;

use assets_core::store::Storage;
use assets_service::{
  AssetsService, FavouritesService, UsersService, hasher::CredentialHasher,
  observer::TracingObserver,
};
use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;

pub use auth::{Authenticated, Claims, SessionTokens};
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub assets:     AssetsService<S>,
  pub favourites: FavouritesService<S>,
  pub users:      UsersService<S>,
  pub tokens:     Arc<SessionTokens>,
  pub observer:   Arc<TracingObserver>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      assets:     self.assets.clone(),
      favourites: self.favourites.clone(),
      users:      self.users.clone(),
      tokens:     Arc::clone(&self.tokens),
      observer:   Arc::clone(&self.observer),
    }
  }
}

impl<S: Storage> AppState<S> {
  /// Wire the three orchestrators over one shared `store`.
  pub fn new(store: Arc<S>, hasher: Arc<dyn CredentialHasher>, tokens: SessionTokens) -> Self {
    let observer = Arc::new(TracingObserver::new());
    Self {
      assets: AssetsService::new(Arc::clone(&store), observer.clone()),
      favourites: FavouritesService::new(Arc::clone(&store)),
      users: UsersService::new(store, hasher),
      tokens: Arc::new(tokens),
      observer,
    }
  }
}

// ─── Shared query parameters ──────────────────────────────────────────────────

/// `?cursor=<opaque>&limit=<n>` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub cursor: Option<String>,
  #[serde(default)]
  pub limit:  u32,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Storage + 'static,
{
  Router::new()
    // Assets
    .route("/assets", get(assets::list::<S>).post(assets::create::<S>))
    .route(
      "/assets/{id}",
      get(assets::get_one::<S>)
        .patch(assets::update_one::<S>)
        .delete(assets::delete_one::<S>),
    )
    // Favourites
    .route("/favourites", post(favourites::create::<S>))
    .route(
      "/favourites/{id}",
      get(favourites::get_one::<S>).delete(favourites::delete_one::<S>),
    )
    .route("/users/{user_id}/favourites", get(favourites::list_for_user::<S>))
    // Users
    .route("/users/register", post(users::register::<S>))
    .route("/users/login", post(users::login::<S>))
    // Health
    .route("/health", get(health::handler::<S>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
