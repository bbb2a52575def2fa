//! The composition engine: attaching, creating and removing the payload
//! records that asset envelopes point at.
//!
//! Every multi-kind operation issues exactly one store call per payload kind,
//! runs the three calls concurrently, waits for all of them and then reports
//! the first failure in chart, insight, audience order. The engine never
//! undoes a sibling leg that succeeded; compensation belongs to the caller,
//! which can use [`Composer::discard`] and [`Composer::restore`].

use std::{collections::HashMap, future::Future, sync::Arc};

use assets_core::{
  asset::{Asset, AssetType, AudienceEntity, ChartEntity, InsightEntity, Payload},
  params::InsertAsset,
  store::{AudienceStore, ChartStore, IdFilter, InsightStore, Page},
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CompositionError {
  /// An envelope's `content_id` has no record in its payload collection.
  #[error("failed to populate data: asset {asset_id} points at missing {kind} {content_id}")]
  MissingPayload { asset_id: Uuid, content_id: Uuid, kind: AssetType },

  #[error("{kind} store error: {source}")]
  Store {
    kind:   AssetType,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// A create request carried no payload for its declared type.
  #[error("failed to map data: request {index} has no payload for its type")]
  Unmapped { index: usize },
}

impl CompositionError {
  fn store(kind: AssetType, e: impl std::error::Error + Send + Sync + 'static) -> Self {
    CompositionError::Store { kind, source: Box::new(e) }
  }
}

// ─── Dependents ──────────────────────────────────────────────────────────────

/// Payload records grouped by kind, as the three payload stores take them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dependents {
  pub charts:    Vec<ChartEntity>,
  pub insights:  Vec<InsightEntity>,
  pub audiences: Vec<AudienceEntity>,
}

impl Dependents {
  pub fn from_payloads<'a>(payloads: impl IntoIterator<Item = &'a Payload>) -> Self {
    let mut deps = Dependents::default();
    for payload in payloads {
      match payload {
        Payload::Chart(c) => deps.charts.push(c.clone()),
        Payload::Insight(i) => deps.insights.push(i.clone()),
        Payload::Audience(a) => deps.audiences.push(a.clone()),
      }
    }
    deps
  }

  pub fn len(&self) -> usize {
    self.charts.len() + self.insights.len() + self.audiences.len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Build one fresh payload record per create request.
///
/// The result is positional: `payloads[i]` belongs to `requests[i]`, so two
/// identical requests still get two distinct records.
pub fn prepare(requests: &[InsertAsset]) -> Result<Vec<Payload>, CompositionError> {
  requests
    .iter()
    .enumerate()
    .map(|(index, req)| {
      let data = &req.asset_data;
      let payload = match req.asset_type {
        AssetType::Chart => data.chart.clone().map(|c| Payload::Chart(ChartEntity::new(c))),
        AssetType::Insight => {
          data.insight.clone().map(|i| Payload::Insight(InsightEntity::new(i)))
        }
        AssetType::Audience => {
          data.audience.clone().map(|a| Payload::Audience(AudienceEntity::new(a)))
        }
      };
      payload.ok_or(CompositionError::Unmapped { index })
    })
    .collect()
}

// ─── Legs ────────────────────────────────────────────────────────────────────

/// Select every record with one of `ids`, following cursors to the end.
///
/// An empty id set short-circuits: stores read it as "no restriction".
async fn select_leg<T, E, F, Fut>(
  kind:   AssetType,
  ids:    Vec<Uuid>,
  mut op: F,
) -> Result<Vec<T>, CompositionError>
where
  F: FnMut(IdFilter) -> Fut,
  Fut: Future<Output = Result<Page<T>, E>>,
  E: std::error::Error + Send + Sync + 'static,
{
  if ids.is_empty() {
    return Ok(Vec::new());
  }

  let mut filter = IdFilter::ids(ids);
  let mut out = Vec::new();
  loop {
    let page = op(filter.clone()).await.map_err(|e| CompositionError::store(kind, e))?;
    out.extend(page.items);
    match page.cursor {
      Some(cursor) => filter.cursor = Some(cursor),
      None => return Ok(out),
    }
  }
}

/// Run one insert or delete call, skipping it when there is nothing to do.
async fn write_leg<T, E, F, Fut>(
  kind:  AssetType,
  items: Vec<T>,
  op:    F,
) -> Result<Vec<T>, CompositionError>
where
  F: FnOnce(Vec<T>) -> Fut,
  Fut: Future<Output = Result<Vec<T>, E>>,
  E: std::error::Error + Send + Sync + 'static,
{
  if items.is_empty() {
    return Ok(items);
  }
  op(items).await.map_err(|e| CompositionError::store(kind, e))
}

fn by_id<T>(items: Vec<T>, id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, T> {
  items.into_iter().map(|item| (id(&item), item)).collect()
}

// ─── Composer ────────────────────────────────────────────────────────────────

pub struct Composer<S> {
  store: Arc<S>,
}

impl<S> Clone for Composer<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S> Composer<S>
where
  S: ChartStore + InsightStore + AudienceStore,
{
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Attach each envelope's payload, preserving envelope order.
  pub async fn hydrate(&self, envelopes: Vec<Asset>) -> Result<Vec<Asset>, CompositionError> {
    let mut chart_ids = Vec::new();
    let mut insight_ids = Vec::new();
    let mut audience_ids = Vec::new();
    for asset in &envelopes {
      match asset.asset_type {
        AssetType::Chart => chart_ids.push(asset.content_id),
        AssetType::Insight => insight_ids.push(asset.content_id),
        AssetType::Audience => audience_ids.push(asset.content_id),
      }
    }

    let store = &*self.store;
    let (charts, insights, audiences) = tokio::join!(
      select_leg(AssetType::Chart, chart_ids, move |f| store.select_charts(f)),
      select_leg(AssetType::Insight, insight_ids, move |f| store.select_insights(f)),
      select_leg(AssetType::Audience, audience_ids, move |f| store.select_audiences(f)),
    );
    let charts = by_id(charts?, |c| c.id);
    let insights = by_id(insights?, |i| i.id);
    let audiences = by_id(audiences?, |a| a.id);

    envelopes
      .into_iter()
      .map(|mut asset| {
        let payload = match asset.asset_type {
          AssetType::Chart => charts.get(&asset.content_id).cloned().map(Payload::Chart),
          AssetType::Insight => insights.get(&asset.content_id).cloned().map(Payload::Insight),
          AssetType::Audience => {
            audiences.get(&asset.content_id).cloned().map(Payload::Audience)
          }
        };
        let payload = payload.ok_or(CompositionError::MissingPayload {
          asset_id:   asset.id,
          content_id: asset.content_id,
          kind:       asset.asset_type,
        })?;
        asset.asset_data = Some(payload);
        Ok(asset)
      })
      .collect()
  }

  /// Insert each kind's subset of `deps` concurrently.
  pub async fn insert_dependents(&self, deps: &Dependents) -> Result<(), CompositionError> {
    let store = &*self.store;
    let (charts, insights, audiences) = tokio::join!(
      write_leg(AssetType::Chart, deps.charts.clone(), move |v| store.insert_charts(v)),
      write_leg(AssetType::Insight, deps.insights.clone(), move |v| store.insert_insights(v)),
      write_leg(AssetType::Audience, deps.audiences.clone(), move |v| store.insert_audiences(v)),
    );
    charts?;
    insights?;
    audiences?;
    Ok(())
  }

  /// Delete the payloads attached to hydrated `assets`, concurrently per
  /// kind. Returns the records that were targeted, for use with
  /// [`Composer::restore`].
  pub async fn delete_dependents(&self, assets: &[Asset]) -> Result<Dependents, CompositionError> {
    let deps = Dependents::from_payloads(assets.iter().filter_map(|a| a.asset_data.as_ref()));

    let store = &*self.store;
    let (charts, insights, audiences) = tokio::join!(
      write_leg(AssetType::Chart, deps.charts.clone(), move |v| store.delete_charts(v)),
      write_leg(AssetType::Insight, deps.insights.clone(), move |v| store.delete_insights(v)),
      write_leg(AssetType::Audience, deps.audiences.clone(), move |v| store.delete_audiences(v)),
    );
    charts?;
    insights?;
    audiences?;
    Ok(deps)
  }

  // ── Compensation ──────────────────────────────────────────────────────────

  /// Best-effort delete of every record in `deps`, one call per kind.
  ///
  /// Deletes are idempotent, so records that were never written are fine.
  /// Every failing call is returned; none stops the others.
  pub async fn discard(&self, deps: &Dependents) -> Vec<(AssetType, CompositionError)> {
    let store = &*self.store;
    let mut failures = Vec::new();

    let charts = write_leg(AssetType::Chart, deps.charts.clone(), move |v| store.delete_charts(v));
    if let Err(e) = charts.await {
      failures.push((AssetType::Chart, e));
    }
    let insights =
      write_leg(AssetType::Insight, deps.insights.clone(), move |v| store.delete_insights(v));
    if let Err(e) = insights.await {
      failures.push((AssetType::Insight, e));
    }
    let audiences =
      write_leg(AssetType::Audience, deps.audiences.clone(), move |v| store.delete_audiences(v));
    if let Err(e) = audiences.await {
      failures.push((AssetType::Audience, e));
    }

    failures
  }

  /// Best-effort re-insert of the records in `deps` that are no longer
  /// stored, one select and one insert per kind.
  pub async fn restore(&self, deps: &Dependents) -> Vec<(AssetType, CompositionError)> {
    let store = &*self.store;
    let mut failures = Vec::new();

    let charts = async {
      let ids = deps.charts.iter().map(|c| c.id).collect();
      let present = select_leg(AssetType::Chart, ids, move |f| store.select_charts(f)).await?;
      let present = by_id(present, |c| c.id);
      let missing: Vec<ChartEntity> =
        deps.charts.iter().filter(|c| !present.contains_key(&c.id)).cloned().collect();
      write_leg(AssetType::Chart, missing, move |v| store.insert_charts(v)).await
    };
    if let Err(e) = charts.await {
      failures.push((AssetType::Chart, e));
    }

    let insights = async {
      let ids = deps.insights.iter().map(|i| i.id).collect();
      let present =
        select_leg(AssetType::Insight, ids, move |f| store.select_insights(f)).await?;
      let present = by_id(present, |i| i.id);
      let missing: Vec<InsightEntity> =
        deps.insights.iter().filter(|i| !present.contains_key(&i.id)).cloned().collect();
      write_leg(AssetType::Insight, missing, move |v| store.insert_insights(v)).await
    };
    if let Err(e) = insights.await {
      failures.push((AssetType::Insight, e));
    }

    let audiences = async {
      let ids = deps.audiences.iter().map(|a| a.id).collect();
      let present =
        select_leg(AssetType::Audience, ids, move |f| store.select_audiences(f)).await?;
      let present = by_id(present, |a| a.id);
      let missing: Vec<AudienceEntity> =
        deps.audiences.iter().filter(|a| !present.contains_key(&a.id)).cloned().collect();
      write_leg(AssetType::Audience, missing, move |v| store.insert_audiences(v)).await
    };
    if let Err(e) = audiences.await {
      failures.push((AssetType::Audience, e));
    }

    failures
  }
}
