//! Request parameters accepted by the service layer, with their field rules.
//!
//! Identifiers and enumerations are typed, so "must be a valid id" and "must
//! be one of" hold by construction; what remains (lengths, ranges, required
//! ids) is declared with `validator` attributes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
  asset::{AssetData, AssetType},
  store::{FavouriteFilter, IdFilter},
};

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

// ─── Custom rules ────────────────────────────────────────────────────────────

/// Reject the nil UUID, which is what a missing id deserialises to in
/// permissive clients.
pub fn not_nil(id: &Uuid) -> Result<(), ValidationError> {
  if id.is_nil() {
    return Err(ValidationError::new("required"));
  }
  Ok(())
}

pub fn present(value: &serde_json::Value) -> Result<(), ValidationError> {
  if value.is_null() {
    return Err(ValidationError::new("required"));
  }
  Ok(())
}

/// Validate every element of a batch, stopping at the first failure.
pub fn validate_batch<T: Validate>(batch: &[T]) -> Result<(), ValidationErrors> {
  batch.iter().try_for_each(Validate::validate)
}

// ─── Assets ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct SelectAssets {
  #[serde(default)]
  pub ids:    Vec<Uuid>,
  pub cursor: Option<String>,
  #[serde(default)]
  #[validate(range(max = 100))]
  pub limit:  u32,
}

impl From<SelectAssets> for IdFilter {
  fn from(p: SelectAssets) -> Self {
    IdFilter { ids: p.ids, cursor: p.cursor, limit: p.limit as usize }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InsertAsset {
  #[serde(rename = "type")]
  pub asset_type:  AssetType,
  #[validate(length(min = 1, max = 128))]
  pub name:        String,
  #[validate(length(min = 1, max = 8192))]
  pub description: String,
  #[serde(default)]
  #[validate(nested)]
  pub asset_data:  AssetData,
}

/// Sparse update of an asset; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct UpdateAsset {
  #[validate(custom(function = "not_nil"))]
  pub id:          Uuid,
  #[validate(length(min = 1, max = 8192))]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct DeleteAsset {
  #[validate(custom(function = "not_nil"))]
  pub id: Uuid,
}

// ─── Favourites ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct SelectFavourites {
  #[serde(default)]
  pub ids:       Vec<Uuid>,
  #[serde(default)]
  pub user_ids:  Vec<Uuid>,
  #[serde(default)]
  pub asset_ids: Vec<Uuid>,
  pub cursor:    Option<String>,
  #[serde(default)]
  #[validate(range(max = 100))]
  pub limit:     u32,
}

impl From<SelectFavourites> for FavouriteFilter {
  fn from(p: SelectFavourites) -> Self {
    FavouriteFilter {
      ids:       p.ids,
      user_ids:  p.user_ids,
      asset_ids: p.asset_ids,
      cursor:    p.cursor,
      limit:     p.limit as usize,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct InsertFavourite {
  #[validate(custom(function = "not_nil"))]
  pub user_id:  Uuid,
  #[validate(custom(function = "not_nil"))]
  pub asset_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct DeleteFavourite {
  #[validate(custom(function = "not_nil"))]
  pub id: Uuid,
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct RegisterUser {
  #[validate(email, length(max = 64))]
  pub email:    String,
  #[validate(length(min = 1, max = 64))]
  pub password: String,
}

#[derive(Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct LoginUser {
  #[validate(email, length(max = 64))]
  pub email:    String,
  #[validate(length(min = 1, max = 64))]
  pub password: String,
}

// Passwords stay out of logs.
impl std::fmt::Debug for RegisterUser {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("RegisterUser").field("email", &self.email).finish_non_exhaustive()
  }
}

impl std::fmt::Debug for LoginUser {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LoginUser").field("email", &self.email).finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::asset::{Audience, AgeGroup, Chart, Gender, Insight};

  fn insight_request(text: &str) -> InsertAsset {
    InsertAsset {
      asset_type:  AssetType::Insight,
      name:        "Nice Name".into(),
      description: "Nice Description".into(),
      asset_data:  AssetData {
        insight: Some(Insight { text: text.into() }),
        ..AssetData::default()
      },
    }
  }

  #[test]
  fn valid_insert_passes() {
    assert!(insight_request("Nice Insight").validate().is_ok());
  }

  #[test]
  fn name_over_128_chars_fails() {
    let mut req = insight_request("Nice Insight");
    req.name = "n".repeat(129);
    assert!(req.validate().is_err());
    req.name = "n".repeat(128);
    assert!(req.validate().is_ok());
  }

  #[test]
  fn empty_description_fails() {
    let mut req = insight_request("Nice Insight");
    req.description.clear();
    assert!(req.validate().is_err());
  }

  #[test]
  fn nested_payload_rules_apply() {
    let req = insight_request(&"x".repeat(1025));
    assert!(req.validate().is_err());

    let mut chart_req = insight_request("unused");
    chart_req.asset_type = AssetType::Chart;
    chart_req.asset_data = AssetData {
      chart: Some(Chart {
        title:        "t".repeat(33),
        x_axis_title: "x".into(),
        y_axis_title: "y".into(),
        data:         serde_json::json!([1, 2, 3]),
      }),
      ..AssetData::default()
    };
    assert!(chart_req.validate().is_err());
  }

  #[test]
  fn chart_data_is_required() {
    let chart = Chart {
      title:        "t".into(),
      x_axis_title: "x".into(),
      y_axis_title: "y".into(),
      data:         serde_json::Value::Null,
    };
    assert!(chart.validate().is_err());
  }

  #[test]
  fn audience_counts_must_not_be_negative() {
    let mut audience = Audience {
      gender:               Gender::Female,
      birth_country:        "Greece".into(),
      age_group:            AgeGroup::From24To35,
      social_media_hours:   3,
      purchases_last_month: 0,
    };
    assert!(audience.validate().is_ok());
    audience.social_media_hours = -1;
    assert!(audience.validate().is_err());
  }

  #[test]
  fn select_limit_capped_at_100() {
    let mut p = SelectAssets { limit: MAX_PAGE_LIMIT, ..SelectAssets::default() };
    assert!(p.validate().is_ok());
    p.limit = 101;
    assert!(p.validate().is_err());
  }

  #[test]
  fn nil_ids_are_rejected() {
    assert!(DeleteAsset { id: Uuid::nil() }.validate().is_err());
    assert!(DeleteAsset { id: Uuid::new_v4() }.validate().is_ok());
  }

  #[test]
  fn user_email_must_be_valid() {
    let bad = RegisterUser { email: "not-an-email".into(), password: "secret".into() };
    assert!(bad.validate().is_err());
    let good = RegisterUser { email: "user@example.com".into(), password: "secret".into() };
    assert!(good.validate().is_ok());
  }

  #[test]
  fn unknown_enum_values_fail_to_deserialise() {
    let json = serde_json::json!({
      "type": "FooBar",
      "name": "n",
      "description": "d",
      "asset_data": { "insight": { "text": "t" } }
    });
    assert!(serde_json::from_value::<InsertAsset>(json).is_err());
  }

  #[test]
  fn batch_validation_stops_at_first_failure() {
    let mut bad = insight_request("ok");
    bad.name.clear();
    assert!(validate_batch(&[insight_request("ok"), bad]).is_err());
    assert!(validate_batch(&[insight_request("ok")]).is_ok());
  }
}
