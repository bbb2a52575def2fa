//! Favourites: join records between a user and an asset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marks `asset_id` as a favourite of `user_id`.
///
/// Both sides are weak references: deleting a user or an asset does not
/// cascade here, so the service layer removes favourites explicitly. At most
/// one favourite exists per `(user_id, asset_id)` pair; the store does not
/// enforce this, the favourites service does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub asset_id:    Uuid,
  pub create_time: DateTime<Utc>,
  pub update_time: DateTime<Utc>,
}

impl Favourite {
  pub fn new(user_id: Uuid, asset_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      asset_id,
      create_time: now,
      update_time: now,
    }
  }
}
