//! Handlers for `/assets` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/assets` | Optional `?cursor=&limit=` |
//! | `POST`   | `/assets` | Session required. Body: an asset with its `asset_data` |
//! | `GET`    | `/assets/:id` | 404 if not found |
//! | `PATCH`  | `/assets/:id` | Session required. Body: `{"description":"..."}` |
//! | `DELETE` | `/assets/:id` | Session required. Also drops its favourites |

use assets_core::{
  asset::Asset,
  params::{DeleteAsset, InsertAsset, SelectAssets, UpdateAsset},
  store::Storage,
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState, PageParams,
  auth::Authenticated,
  error::{ApiError, ApiPath, ApiQuery, JsonBody, single},
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AssetPage {
  pub assets: Vec<Asset>,
  pub cursor: Option<String>,
}

/// `GET /assets[?cursor=<cursor>&limit=<n>]`
pub async fn list<S: Storage>(
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<AssetPage>, ApiError> {
  let page = state
    .assets
    .select(SelectAssets { ids: Vec::new(), cursor: params.cursor, limit: params.limit })
    .await?;
  Ok(Json(AssetPage { assets: page.items, cursor: page.cursor }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /assets/:id`
pub async fn get_one<S: Storage>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Asset>, ApiError> {
  let page = state
    .assets
    .select(SelectAssets { ids: vec![id], cursor: None, limit: 1 })
    .await?;
  Ok(Json(single(page.items, &format!("asset {id} not found"))?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /assets`
pub async fn create<S: Storage>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  JsonBody(body): JsonBody<InsertAsset>,
) -> Result<impl IntoResponse, ApiError> {
  tracing::debug!(user = %claims.sub, kind = %body.asset_type, "creating asset");
  let created = state.assets.insert(vec![body]).await?;
  Ok((StatusCode::CREATED, Json(single(created, "created asset")?)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub description: Option<String>,
}

/// `PATCH /assets/:id`, body: `{"description":"..."}`
pub async fn update_one<S: Storage>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  ApiPath(id): ApiPath<Uuid>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<Json<Asset>, ApiError> {
  tracing::debug!(user = %claims.sub, %id, "updating asset");
  let updated = state
    .assets
    .update(vec![UpdateAsset { id, description: body.description }])
    .await?;
  Ok(Json(single(updated, "updated asset")?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /assets/:id`
pub async fn delete_one<S: Storage>(
  State(state): State<AppState<S>>,
  Authenticated(claims): Authenticated,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Asset>, ApiError> {
  tracing::debug!(user = %claims.sub, %id, "deleting asset");
  let deleted = state.assets.delete(vec![DeleteAsset { id }]).await?;
  Ok(Json(single(deleted, "deleted asset")?))
}
