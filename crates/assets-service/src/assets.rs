//! [`AssetsService`]: create, read, update and delete of hydrated assets.

use std::{collections::HashMap, sync::Arc};

use assets_core::{
  asset::{Asset, Payload},
  params::{DeleteAsset, InsertAsset, SelectAssets, UpdateAsset, validate_batch},
  store::{
    AssetStore, AudienceStore, ChartStore, FavouriteFilter, FavouriteStore, IdFilter,
    InsightStore, Page,
  },
};
use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
  Error, Result,
  compose::{self, Composer, Dependents},
  observer::{CompensationObserver, RollbackScope},
  paging::{collect_all, distinct, non_empty},
};

/// Orchestrates assets across the envelope, payload and favourite stores.
pub struct AssetsService<S> {
  store:    Arc<S>,
  composer: Composer<S>,
  observer: Arc<dyn CompensationObserver>,
}

impl<S> Clone for AssetsService<S> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      composer: self.composer.clone(),
      observer: Arc::clone(&self.observer),
    }
  }
}

/// Every create request carries exactly one payload, of its declared type.
fn check_payload(index: usize, req: &InsertAsset) -> Result<()> {
  match req.asset_data.kinds().as_slice() {
    [] => Err(Error::Validation("asset data cannot be empty".into())),
    [kind] if *kind == req.asset_type => Ok(()),
    [kind] => Err(Error::Validation(format!(
      "request {index}: {kind} data supplied for a {} asset",
      req.asset_type
    ))),
    _ => Err(Error::Validation(format!(
      "request {index}: exactly one of chart, insight or audience must be set"
    ))),
  }
}

fn not_found(id: Uuid) -> Error { Error::NotFound(format!("asset {id}")) }

impl<S> AssetsService<S>
where
  S: AssetStore + ChartStore + InsightStore + AudienceStore + FavouriteStore,
{
  pub fn new(store: Arc<S>, observer: Arc<dyn CompensationObserver>) -> Self {
    let composer = Composer::new(Arc::clone(&store));
    Self { store, composer, observer }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  pub async fn select(&self, params: SelectAssets) -> Result<Page<Asset>> {
    params.validate()?;
    debug!(ids = params.ids.len(), limit = params.limit, "selecting assets");

    let page = self.store.select_assets(params.into()).await.map_err(Error::store)?;
    let items = self.composer.hydrate(page.items).await?;
    Ok(Page::new(items, page.cursor))
  }

  /// Stored envelopes for `ids`, keyed by id. Missing ids are simply absent.
  async fn envelopes(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Asset>> {
    let store = &*self.store;
    let found = collect_all(move |cursor| {
      store.select_assets(IdFilter { ids: ids.to_vec(), cursor, limit: 0 })
    })
    .await?;
    Ok(found.into_iter().map(|a| (a.id, a)).collect())
  }

  // ── Create ────────────────────────────────────────────────────────────────

  /// Create one asset per request, each with a fresh payload record.
  ///
  /// Payloads are written first, then envelopes. If either step fails, every
  /// prepared payload is deleted again before the error is returned.
  pub async fn insert(&self, requests: Vec<InsertAsset>) -> Result<Vec<Asset>> {
    non_empty(&requests)?;
    validate_batch(&requests)?;
    for (index, req) in requests.iter().enumerate() {
      check_payload(index, req)?;
    }
    debug!(count = requests.len(), "inserting assets");

    let payloads = compose::prepare(&requests)?;
    let deps = Dependents::from_payloads(&payloads);

    if let Err(e) = self.composer.insert_dependents(&deps).await {
      warn!(error = %e, "payload insert failed; discarding prepared payloads");
      self.discard(&deps).await;
      return Err(e.into());
    }

    let assets: Vec<Asset> = requests
      .into_iter()
      .zip(&payloads)
      .map(|(req, payload)| Asset::new(req.asset_type, req.name, req.description, payload.id()))
      .collect();

    if let Err(e) = self.store.insert_assets(assets.clone()).await {
      warn!(error = %e, "envelope insert failed; discarding payloads");
      self.discard(&deps).await;
      return Err(Error::processing(e));
    }

    Ok(
      assets
        .into_iter()
        .zip(payloads)
        .map(|(mut asset, payload)| {
          asset.asset_data = Some(payload);
          asset
        })
        .collect(),
    )
  }

  // ── Update ────────────────────────────────────────────────────────────────

  /// Apply sparse description updates. Any unknown id aborts the batch
  /// before anything is written.
  pub async fn update(&self, requests: Vec<UpdateAsset>) -> Result<Vec<Asset>> {
    non_empty(&requests)?;
    validate_batch(&requests)?;
    debug!(count = requests.len(), "updating assets");

    let ids = distinct(requests.iter().map(|r| r.id));
    let mut found = self.envelopes(&ids).await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
      return Err(not_found(*missing));
    }

    let now = Utc::now();
    for req in &requests {
      let Some(asset) = found.get_mut(&req.id) else { continue };
      if let Some(description) = &req.description {
        asset.description = description.clone();
      }
      asset.update_time = now;
    }

    let changed: Vec<Asset> = ids.iter().filter_map(|id| found.get(id).cloned()).collect();
    self.store.update_assets(changed).await.map_err(Error::processing)?;

    let ordered = requests.iter().filter_map(|r| found.get(&r.id).cloned()).collect();
    Ok(self.composer.hydrate(ordered).await?)
  }

  // ── Delete ────────────────────────────────────────────────────────────────

  /// Delete assets together with their payloads and every favourite that
  /// references them. Returns the deleted assets, hydrated.
  ///
  /// Favourites go first. If a later step fails they are re-inserted, and if
  /// the envelope delete fails the payloads are re-inserted too.
  pub async fn delete(&self, requests: Vec<DeleteAsset>) -> Result<Vec<Asset>> {
    non_empty(&requests)?;
    validate_batch(&requests)?;
    debug!(count = requests.len(), "deleting assets");

    let ids = distinct(requests.iter().map(|r| r.id));

    let store = &*self.store;
    let asset_ids = &ids;
    let favourites = collect_all(move |cursor| {
      store.select_favourites(FavouriteFilter {
        asset_ids: asset_ids.clone(),
        cursor,
        ..FavouriteFilter::default()
      })
    })
    .await?;

    if !favourites.is_empty() {
      self.store.delete_favourites(favourites.clone()).await.map_err(Error::processing)?;
    }

    match self.delete_with_payloads(&ids).await {
      Ok(deleted) => Ok(deleted),
      Err(e) => {
        if !favourites.is_empty() {
          warn!(error = %e, count = favourites.len(), "asset delete failed; restoring favourites");
          if let Err(re) = self.store.insert_favourites(favourites).await {
            self.observer.rollback_failed(RollbackScope::RestoreFavourites, &re);
          }
        }
        Err(e)
      }
    }
  }

  async fn delete_with_payloads(&self, ids: &[Uuid]) -> Result<Vec<Asset>> {
    let found = self.envelopes(ids).await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains_key(id)) {
      return Err(not_found(*missing));
    }

    let envelopes = ids.iter().filter_map(|id| found.get(id).cloned()).collect();
    let targets = self.composer.hydrate(envelopes).await?;

    let deps = match self.composer.delete_dependents(&targets).await {
      Ok(deps) => deps,
      Err(e) => {
        warn!(error = %e, "payload delete failed; restoring payloads");
        let payloads: Vec<&Payload> = targets.iter().filter_map(|a| a.asset_data.as_ref()).collect();
        self.restore(&Dependents::from_payloads(payloads)).await;
        return Err(e.into());
      }
    };

    let envelopes = targets.iter().map(Asset::envelope).collect();
    if let Err(e) = self.store.delete_assets(envelopes).await {
      warn!(error = %e, "envelope delete failed; restoring payloads");
      self.restore(&deps).await;
      return Err(Error::processing(e));
    }

    Ok(targets)
  }

  // ── Compensation ──────────────────────────────────────────────────────────

  async fn discard(&self, deps: &Dependents) {
    for (kind, e) in self.composer.discard(deps).await {
      self.observer.rollback_failed(RollbackScope::DiscardPayloads(kind), &e);
    }
  }

  async fn restore(&self, deps: &Dependents) {
    for (kind, e) in self.composer.restore(deps).await {
      self.observer.rollback_failed(RollbackScope::RestorePayloads(kind), &e);
    }
  }
}
