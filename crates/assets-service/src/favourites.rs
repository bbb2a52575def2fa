//! [`FavouritesService`]: per-user favourite lists.

use std::{collections::HashSet, sync::Arc};

use assets_core::{
  favourite::Favourite,
  params::{DeleteFavourite, InsertFavourite, SelectFavourites, validate_batch},
  store::{AssetStore, FavouriteFilter, FavouriteStore, IdFilter, Page, UserFilter, UserStore},
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Result,
  paging::{collect_all, distinct, non_empty},
};

pub struct FavouritesService<S> {
  store: Arc<S>,
}

impl<S> Clone for FavouritesService<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

/// First of `wanted` that is not in `found`.
fn first_missing(wanted: &[Uuid], found: impl IntoIterator<Item = Uuid>) -> Option<Uuid> {
  let found: HashSet<Uuid> = found.into_iter().collect();
  wanted.iter().copied().find(|id| !found.contains(id))
}

impl<S> FavouritesService<S>
where
  S: FavouriteStore + UserStore + AssetStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  pub async fn select(&self, params: SelectFavourites) -> Result<Page<Favourite>> {
    params.validate()?;
    self.store.select_favourites(params.into()).await.map_err(Error::store)
  }

  /// Add favourites after checking that every user and asset exists and that
  /// no `(user, asset)` pair is already taken, in the store or in the batch.
  pub async fn insert(&self, requests: Vec<InsertFavourite>) -> Result<Vec<Favourite>> {
    non_empty(&requests)?;
    validate_batch(&requests)?;
    debug!(count = requests.len(), "inserting favourites");

    let user_ids = distinct(requests.iter().map(|r| r.user_id));
    let asset_ids = distinct(requests.iter().map(|r| r.asset_id));
    let store = &*self.store;

    let users = {
      let ids = &user_ids;
      collect_all(move |cursor| {
        store.select_users(UserFilter { ids: ids.clone(), cursor, ..UserFilter::default() })
      })
      .await?
    };
    if let Some(id) = first_missing(&user_ids, users.iter().map(|u| u.id)) {
      return Err(Error::NotFound(format!("user {id}")));
    }

    let assets = {
      let ids = &asset_ids;
      collect_all(move |cursor| {
        store.select_assets(IdFilter { ids: ids.clone(), cursor, limit: 0 })
      })
      .await?
    };
    if let Some(id) = first_missing(&asset_ids, assets.iter().map(|a| a.id)) {
      return Err(Error::NotFound(format!("asset {id}")));
    }

    let existing = {
      let (uids, aids) = (&user_ids, &asset_ids);
      collect_all(move |cursor| {
        store.select_favourites(FavouriteFilter {
          user_ids: uids.clone(),
          asset_ids: aids.clone(),
          cursor,
          ..FavouriteFilter::default()
        })
      })
      .await?
    };

    let mut taken: HashSet<(Uuid, Uuid)> =
      existing.iter().map(|f| (f.user_id, f.asset_id)).collect();
    for req in &requests {
      if !taken.insert((req.user_id, req.asset_id)) {
        return Err(Error::AlreadyExists("provided asset is already on favourites list".into()));
      }
    }

    let favourites: Vec<Favourite> =
      requests.iter().map(|r| Favourite::new(r.user_id, r.asset_id)).collect();
    self.store.insert_favourites(favourites.clone()).await.map_err(Error::processing)?;
    Ok(favourites)
  }

  pub async fn delete(&self, requests: Vec<DeleteFavourite>) -> Result<Vec<Favourite>> {
    non_empty(&requests)?;
    validate_batch(&requests)?;
    debug!(count = requests.len(), "deleting favourites");

    let ids = distinct(requests.iter().map(|r| r.id));
    let store = &*self.store;
    let wanted = &ids;
    let found = collect_all(move |cursor| {
      store.select_favourites(FavouriteFilter {
        ids: wanted.clone(),
        cursor,
        ..FavouriteFilter::default()
      })
    })
    .await?;
    if let Some(id) = first_missing(&ids, found.iter().map(|f| f.id)) {
      return Err(Error::NotFound(format!("favourite {id}")));
    }

    self.store.delete_favourites(found.clone()).await.map_err(Error::processing)?;

    let mut found = found;
    found.sort_by_key(|f| ids.iter().position(|id| *id == f.id));
    Ok(found)
  }
}
