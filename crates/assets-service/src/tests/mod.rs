//! Service tests against the in-memory store.


use std::sync::{Arc, Mutex};

use assets_core::{
  asset::{AgeGroup, AssetData, AssetType, Audience, Chart, Gender, Insight},
  params::InsertAsset,
};

use crate::{
  hasher::{CredentialHasher, HashError},
  observer::{CompensationObserver, RollbackScope},
};

pub(crate) use memory::{Collection, MemoryStore, Op};

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub(crate) fn chart_request() -> InsertAsset {
  InsertAsset {
    asset_type:  AssetType::Chart,
    name:        "Revenue".into(),
    description: "Quarterly revenue".into(),
    asset_data:  AssetData {
      chart: Some(Chart {
        title:        "Revenue".into(),
        x_axis_title: "Quarter".into(),
        y_axis_title: "EUR".into(),
        data:         serde_json::json!([[1, 10], [2, 12], [3, 9]]),
      }),
      ..AssetData::default()
    },
  }
}

pub(crate) fn insight_request() -> InsertAsset {
  InsertAsset {
    asset_type:  AssetType::Insight,
    name:        "Nice Name".into(),
    description: "Nice Description".into(),
    asset_data:  AssetData {
      insight: Some(Insight { text: "Nice Insight".into() }),
      ..AssetData::default()
    },
  }
}

pub(crate) fn audience_request() -> InsertAsset {
  InsertAsset {
    asset_type:  AssetType::Audience,
    name:        "Young buyers".into(),
    description: "Heavy social media users".into(),
    asset_data:  AssetData {
      audience: Some(Audience {
        gender:               Gender::Male,
        birth_country:        "Greece".into(),
        age_group:            AgeGroup::From18To23,
        social_media_hours:   5,
        purchases_last_month: 2,
      }),
      ..AssetData::default()
    },
  }
}

// ─── Test doubles ────────────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct RecordingObserver {
  scopes: Mutex<Vec<RollbackScope>>,
}

impl RecordingObserver {
  pub(crate) fn scopes(&self) -> Vec<RollbackScope> { self.scopes.lock().unwrap().clone() }
}

impl CompensationObserver for RecordingObserver {
  fn rollback_failed(&self, scope: RollbackScope, _error: &(dyn std::error::Error + 'static)) {
    self.scopes.lock().unwrap().push(scope);
  }
}

/// Reversible "hash" so user tests stay fast.
pub(crate) struct PlainHasher;

impl CredentialHasher for PlainHasher {
  fn hash(&self, password: &str) -> Result<String, HashError> { Ok(format!("plain:{password}")) }

  fn verify(&self, password: &str, hash: &str) -> Result<bool, HashError> {
    Ok(hash.strip_prefix("plain:") == Some(password))
  }
}

pub(crate) fn store() -> Arc<MemoryStore> { Arc::new(MemoryStore::new()) }

pub(crate) fn observer() -> Arc<RecordingObserver> { Arc::new(RecordingObserver::default()) }
