//! Asset types: the envelope and its three payload kinds.
//!
//! An [`Asset`] holds only metadata and a `content_id` pointing at exactly one
//! payload record (a chart, an insight or an audience). Payloads live in their
//! own collections and are attached to the envelope on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;
use validator::Validate;

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Which payload collection an asset's `content_id` points into.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum AssetType {
  Chart,
  Insight,
  Audience,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Gender {
  Male,
  Female,
}

/// Age band of an audience profile.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum AgeGroup {
  #[serde(rename = "18-23")]
  #[strum(serialize = "18-23")]
  From18To23,
  #[serde(rename = "24-35")]
  #[strum(serialize = "24-35")]
  From24To35,
  #[serde(rename = "36-45")]
  #[strum(serialize = "36-45")]
  From36To45,
  #[serde(rename = "46+")]
  #[strum(serialize = "46+")]
  From46,
}

// ─── Payload values ──────────────────────────────────────────────────────────

/// A chart definition. `data` is opaque to the service and stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Chart {
  #[validate(length(min = 1, max = 32))]
  pub title:        String,
  #[validate(length(min = 1, max = 32))]
  pub x_axis_title: String,
  #[validate(length(min = 1, max = 32))]
  pub y_axis_title: String,
  #[validate(custom(function = "crate::params::present"))]
  pub data:         serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Insight {
  #[validate(length(min = 1, max = 1024))]
  pub text: String,
}

/// A demographic audience profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Audience {
  pub gender:               Gender,
  #[validate(length(min = 1, max = 32))]
  pub birth_country:        String,
  pub age_group:            AgeGroup,
  #[validate(range(min = 0))]
  pub social_media_hours:   i64,
  #[validate(range(min = 0))]
  pub purchases_last_month: i64,
}

// ─── Payload entities ────────────────────────────────────────────────────────

/// A persisted [`Chart`] with its own identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntity {
  pub id:          Uuid,
  #[serde(flatten)]
  pub chart:       Chart,
  pub create_time: DateTime<Utc>,
  pub update_time: DateTime<Utc>,
}

impl ChartEntity {
  pub fn new(chart: Chart) -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(), chart, create_time: now, update_time: now }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightEntity {
  pub id:          Uuid,
  #[serde(flatten)]
  pub insight:     Insight,
  pub create_time: DateTime<Utc>,
  pub update_time: DateTime<Utc>,
}

impl InsightEntity {
  pub fn new(insight: Insight) -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(), insight, create_time: now, update_time: now }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceEntity {
  pub id:          Uuid,
  #[serde(flatten)]
  pub audience:    Audience,
  pub create_time: DateTime<Utc>,
  pub update_time: DateTime<Utc>,
}

impl AudienceEntity {
  pub fn new(audience: Audience) -> Self {
    let now = Utc::now();
    Self { id: Uuid::new_v4(), audience, create_time: now, update_time: now }
  }
}

/// The typed content attached to a hydrated asset. Serialises as
/// `{"chart": {...}}`, `{"insight": {...}}` or `{"audience": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
  Chart(ChartEntity),
  Insight(InsightEntity),
  Audience(AudienceEntity),
}

impl Payload {
  pub fn kind(&self) -> AssetType {
    match self {
      Self::Chart(_) => AssetType::Chart,
      Self::Insight(_) => AssetType::Insight,
      Self::Audience(_) => AssetType::Audience,
    }
  }

  /// Identity of the payload record; what an envelope's `content_id` holds.
  pub fn id(&self) -> Uuid {
    match self {
      Self::Chart(c) => c.id,
      Self::Insight(i) => i.id,
      Self::Audience(a) => a.id,
    }
  }
}

// ─── Request-side payload ────────────────────────────────────────────────────

/// Payload supplied when creating an asset. Exactly one field must be set,
/// and it must agree with the asset's [`AssetType`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct AssetData {
  #[validate(nested)]
  pub chart:    Option<Chart>,
  #[validate(nested)]
  pub insight:  Option<Insight>,
  #[validate(nested)]
  pub audience: Option<Audience>,
}

impl AssetData {
  /// The payload kinds present, in chart/insight/audience order.
  pub fn kinds(&self) -> Vec<AssetType> {
    let mut kinds = Vec::with_capacity(1);
    if self.chart.is_some() {
      kinds.push(AssetType::Chart);
    }
    if self.insight.is_some() {
      kinds.push(AssetType::Insight);
    }
    if self.audience.is_some() {
      kinds.push(AssetType::Audience);
    }
    kinds
  }
}

// ─── Asset ───────────────────────────────────────────────────────────────────

/// The asset envelope.
///
/// Stores persist and return envelopes with `asset_data == None`; the service
/// layer attaches the payload before an asset leaves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
  pub id:          Uuid,
  pub content_id:  Uuid,
  #[serde(rename = "type")]
  pub asset_type:  AssetType,
  pub name:        String,
  pub description: String,
  pub create_time: DateTime<Utc>,
  pub update_time: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub asset_data:  Option<Payload>,
}

impl Asset {
  /// A fresh, unhydrated envelope pointing at `content_id`.
  pub fn new(
    asset_type: AssetType,
    name: String,
    description: String,
    content_id: Uuid,
  ) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      content_id,
      asset_type,
      name,
      description,
      create_time: now,
      update_time: now,
      asset_data: None,
    }
  }

  /// A copy of this asset without its payload, as stores hold it.
  pub fn envelope(&self) -> Asset {
    Asset { asset_data: None, ..self.clone() }
  }
}
