//! Storage port traits and their query types.
//!
//! Each collection (assets, charts, insights, audiences, favourites, users)
//! has its own trait so that callers state exactly which collections they
//! touch. Backends (e.g. `assets-store-sqlite`) implement all of them; the
//! service layer depends only on these abstractions.
//!
//! Contract shared by every collection:
//!
//! - filters combine with AND, and an empty id list means "no restriction";
//! - a `limit` of zero means [`STORE_MAX_LIMIT`];
//! - the cursor is opaque and must be echoed back verbatim to continue;
//! - inserting an existing id fails, updating a missing id fails;
//! - deletes are idempotent and return the records actually removed.
//!
//! There are no transactions across collections.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  asset::{Asset, AudienceEntity, ChartEntity, InsightEntity},
  favourite::Favourite,
  user::User,
};

/// Page-size ceiling applied when a filter asks for `limit == 0`.
pub const STORE_MAX_LIMIT: usize = 10_000;

/// Resolve a requested page size against [`STORE_MAX_LIMIT`].
pub fn effective_limit(limit: usize) -> usize {
  if limit == 0 || limit > STORE_MAX_LIMIT { STORE_MAX_LIMIT } else { limit }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filter for collections addressed by id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdFilter {
  pub ids:    Vec<Uuid>,
  pub cursor: Option<String>,
  pub limit:  usize,
}

impl IdFilter {
  /// Every record whose id is in `ids`, up to the store ceiling.
  pub fn ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
    Self { ids: ids.into_iter().collect(), ..Self::default() }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavouriteFilter {
  pub ids:       Vec<Uuid>,
  pub user_ids:  Vec<Uuid>,
  pub asset_ids: Vec<Uuid>,
  pub cursor:    Option<String>,
  pub limit:     usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
  pub ids:    Vec<Uuid>,
  pub emails: Vec<String>,
  pub cursor: Option<String>,
  pub limit:  usize,
}

/// One page of results plus the cursor for the next page, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
  pub items:  Vec<T>,
  pub cursor: Option<String>,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, cursor: Option<String>) -> Self {
    Self { items, cursor }
  }
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Common supertrait carrying the backend's error type.
///
/// All collection traits return `Send` futures so they can be driven from a
/// multi-threaded runtime (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: StoreError;
}

/// What went wrong in a store call, as far as callers need to tell apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// The cursor was not one this store handed out.
  InvalidCursor,
  /// A uniqueness rule (id, or a unique field such as a user's email) was
  /// violated.
  Conflict,
  Other,
}

pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind { StoreErrorKind::Other }
}

pub trait AssetStore: Store {
  /// Select asset envelopes. Returned assets never carry a payload.
  fn select_assets(
    &self,
    filter: IdFilter,
  ) -> impl Future<Output = Result<Page<Asset>, Self::Error>> + Send + '_;

  fn insert_assets(
    &self,
    assets: Vec<Asset>,
  ) -> impl Future<Output = Result<Vec<Asset>, Self::Error>> + Send + '_;

  /// Persist the mutable fields (`description`, `update_time`) of existing
  /// envelopes. Fails without writing anything if any id is unknown.
  fn update_assets(
    &self,
    assets: Vec<Asset>,
  ) -> impl Future<Output = Result<Vec<Asset>, Self::Error>> + Send + '_;

  fn delete_assets(
    &self,
    assets: Vec<Asset>,
  ) -> impl Future<Output = Result<Vec<Asset>, Self::Error>> + Send + '_;
}

pub trait ChartStore: Store {
  fn select_charts(
    &self,
    filter: IdFilter,
  ) -> impl Future<Output = Result<Page<ChartEntity>, Self::Error>> + Send + '_;

  fn insert_charts(
    &self,
    charts: Vec<ChartEntity>,
  ) -> impl Future<Output = Result<Vec<ChartEntity>, Self::Error>> + Send + '_;

  fn delete_charts(
    &self,
    charts: Vec<ChartEntity>,
  ) -> impl Future<Output = Result<Vec<ChartEntity>, Self::Error>> + Send + '_;
}

pub trait InsightStore: Store {
  fn select_insights(
    &self,
    filter: IdFilter,
  ) -> impl Future<Output = Result<Page<InsightEntity>, Self::Error>> + Send + '_;

  fn insert_insights(
    &self,
    insights: Vec<InsightEntity>,
  ) -> impl Future<Output = Result<Vec<InsightEntity>, Self::Error>> + Send + '_;

  fn delete_insights(
    &self,
    insights: Vec<InsightEntity>,
  ) -> impl Future<Output = Result<Vec<InsightEntity>, Self::Error>> + Send + '_;
}

pub trait AudienceStore: Store {
  fn select_audiences(
    &self,
    filter: IdFilter,
  ) -> impl Future<Output = Result<Page<AudienceEntity>, Self::Error>> + Send + '_;

  fn insert_audiences(
    &self,
    audiences: Vec<AudienceEntity>,
  ) -> impl Future<Output = Result<Vec<AudienceEntity>, Self::Error>> + Send + '_;

  fn delete_audiences(
    &self,
    audiences: Vec<AudienceEntity>,
  ) -> impl Future<Output = Result<Vec<AudienceEntity>, Self::Error>> + Send + '_;
}

pub trait FavouriteStore: Store {
  fn select_favourites(
    &self,
    filter: FavouriteFilter,
  ) -> impl Future<Output = Result<Page<Favourite>, Self::Error>> + Send + '_;

  fn insert_favourites(
    &self,
    favourites: Vec<Favourite>,
  ) -> impl Future<Output = Result<Vec<Favourite>, Self::Error>> + Send + '_;

  fn delete_favourites(
    &self,
    favourites: Vec<Favourite>,
  ) -> impl Future<Output = Result<Vec<Favourite>, Self::Error>> + Send + '_;
}

pub trait UserStore: Store {
  fn select_users(
    &self,
    filter: UserFilter,
  ) -> impl Future<Output = Result<Page<User>, Self::Error>> + Send + '_;

  fn insert_users(
    &self,
    users: Vec<User>,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;
}

/// A backend implementing every collection.
pub trait Storage:
  AssetStore + ChartStore + InsightStore + AudienceStore + FavouriteStore + UserStore
{
}

impl<T> Storage for T where
  T: AssetStore + ChartStore + InsightStore + AudienceStore + FavouriteStore + UserStore
{
}
