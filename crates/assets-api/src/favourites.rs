//! Handlers for `/favourites` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/favourites` | Session required. Body: `{"user_id":"…","asset_id":"…"}` |
//! | `GET`    | `/favourites/:id` | 404 if not found |
//! | `DELETE` | `/favourites/:id` | Session required |
//! | `GET`    | `/users/:user_id/favourites` | Optional `?cursor=&limit=` |

use assets_core::{
  favourite::Favourite,
  params::{DeleteFavourite, InsertFavourite, SelectFavourites},
  store::Storage,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::Authenticated,
  error::{ApiError, ApiPath, ApiQuery, JsonBody, single},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /favourites`
pub async fn create<S: Storage>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  JsonBody(body): JsonBody<InsertFavourite>,
) -> Result<impl IntoResponse, ApiError> {
  tracing::debug!(user = %claims.sub, asset = %body.asset_id, "adding favourite");
  let created = state.favourites.insert(vec![body]).await?;
  Ok((StatusCode::CREATED, Json(single(created, "created favourite")?)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /favourites/:id`
pub async fn get_one<S: Storage>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Favourite>, ApiError> {
  let page = state
    .favourites
    .select(SelectFavourites { ids: vec![id], limit: 1, ..SelectFavourites::default() })
    .await?;
  Ok(Json(single(page.items, &format!("favourite {id} not found"))?))
}

// ─── List for user ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct FavouritePage {
  pub favourites: Vec<Favourite>,
  pub cursor:     Option<String>,
}

/// `GET /users/:user_id/favourites[?cursor=<cursor>&limit=<n>]`
pub async fn list_for_user<S: Storage>(
  State(state): State<AppState<S>>,
  ApiPath(user_id): ApiPath<Uuid>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<FavouritePage>, ApiError> {
  let page = state
    .favourites
    .select(SelectFavourites {
      user_ids: vec![user_id],
      cursor: params.cursor,
      limit: params.limit,
      ..SelectFavourites::default()
    })
    .await?;
  Ok(Json(FavouritePage { favourites: page.items, cursor: page.cursor }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /favourites/:id`
pub async fn delete_one<S: Storage>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Favourite>, ApiError> {
  tracing::debug!(user = %claims.sub, %id, "removing favourite");
  let deleted = state.favourites.delete(vec![DeleteFavourite { id }]).await?;
  Ok(Json(single(deleted, "deleted favourite")?))
}
