//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, UUIDs as hyphenated
//! lowercase strings, enums by their serialised names and chart data as
//! compact JSON.

use std::str::FromStr;

use assets_core::{
  asset::{
    AgeGroup, Asset, AssetType, Audience, AudienceEntity, Chart, ChartEntity, Gender, Insight,
    InsightEntity,
  },
  favourite::Favourite,
  user::User,
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD as B64};
use chrono::{DateTime, Utc};
use rusqlite::{Row, types::Value};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Opaque page cursor: the last id returned, base64-encoded.
pub fn encode_cursor(last_id: Uuid) -> String { B64.encode(encode_uuid(last_id)) }

/// The encoded id a cursor resumes after.
pub fn decode_cursor(cursor: &str) -> Result<String> {
  let bytes = B64.decode(cursor).map_err(|e| Error::Cursor(e.to_string()))?;
  let text = String::from_utf8(bytes).map_err(|e| Error::Cursor(e.to_string()))?;
  let id = Uuid::parse_str(&text).map_err(|e| Error::Cursor(e.to_string()))?;
  Ok(encode_uuid(id))
}

// ─── Records ─────────────────────────────────────────────────────────────────

fn text(s: impl Into<String>) -> Value { Value::Text(s.into()) }

/// A domain type stored as one row of one table.
///
/// `COLUMNS` lists the table's columns in the order [`Record::read`] expects
/// and [`Record::encode`] produces; the first is always `id`.
pub trait Record: Sized + Send + 'static {
  type Raw: Send + 'static;

  const TABLE: &'static str;
  const COLUMNS: &'static [&'static str];

  fn id(&self) -> Uuid;
  fn encode(&self) -> Result<Vec<Value>>;
  fn read(row: &Row<'_>) -> rusqlite::Result<Self::Raw>;
  fn decode(raw: Self::Raw) -> Result<Self>;
}

// ── Asset ──────────────────────────────────────────────────────────────────

/// Raw strings read directly from an `assets` row.
pub struct RawAsset {
  pub id:          String,
  pub content_id:  String,
  pub asset_type:  String,
  pub name:        String,
  pub description: String,
  pub create_time: String,
  pub update_time: String,
}

impl Record for Asset {
  type Raw = RawAsset;

  const TABLE: &'static str = "assets";
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "content_id",
    "asset_type",
    "name",
    "description",
    "create_time",
    "update_time",
  ];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    Ok(vec![
      text(encode_uuid(self.id)),
      text(encode_uuid(self.content_id)),
      text(self.asset_type.to_string()),
      text(self.name.clone()),
      text(self.description.clone()),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawAsset> {
    Ok(RawAsset {
      id:          row.get(0)?,
      content_id:  row.get(1)?,
      asset_type:  row.get(2)?,
      name:        row.get(3)?,
      description: row.get(4)?,
      create_time: row.get(5)?,
      update_time: row.get(6)?,
    })
  }

  fn decode(raw: RawAsset) -> Result<Self> {
    Ok(Asset {
      id:          decode_uuid(&raw.id)?,
      content_id:  decode_uuid(&raw.content_id)?,
      asset_type:  AssetType::from_str(&raw.asset_type)?,
      name:        raw.name,
      description: raw.description,
      create_time: decode_dt(&raw.create_time)?,
      update_time: decode_dt(&raw.update_time)?,
      asset_data:  None,
    })
  }
}

// ── Chart ──────────────────────────────────────────────────────────────────

pub struct RawChart {
  pub id:           String,
  pub title:        String,
  pub x_axis_title: String,
  pub y_axis_title: String,
  pub data_json:    String,
  pub create_time:  String,
  pub update_time:  String,
}

impl Record for ChartEntity {
  type Raw = RawChart;

  const TABLE: &'static str = "charts";
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "title",
    "x_axis_title",
    "y_axis_title",
    "data_json",
    "create_time",
    "update_time",
  ];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    Ok(vec![
      text(encode_uuid(self.id)),
      text(self.chart.title.clone()),
      text(self.chart.x_axis_title.clone()),
      text(self.chart.y_axis_title.clone()),
      text(serde_json::to_string(&self.chart.data)?),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawChart> {
    Ok(RawChart {
      id:           row.get(0)?,
      title:        row.get(1)?,
      x_axis_title: row.get(2)?,
      y_axis_title: row.get(3)?,
      data_json:    row.get(4)?,
      create_time:  row.get(5)?,
      update_time:  row.get(6)?,
    })
  }

  fn decode(raw: RawChart) -> Result<Self> {
    Ok(ChartEntity {
      id:          decode_uuid(&raw.id)?,
      chart:       Chart {
        title:        raw.title,
        x_axis_title: raw.x_axis_title,
        y_axis_title: raw.y_axis_title,
        data:         serde_json::from_str(&raw.data_json)?,
      },
      create_time: decode_dt(&raw.create_time)?,
      update_time: decode_dt(&raw.update_time)?,
    })
  }
}

// ── Insight ────────────────────────────────────────────────────────────────

pub struct RawInsight {
  pub id:          String,
  pub text:        String,
  pub create_time: String,
  pub update_time: String,
}

impl Record for InsightEntity {
  type Raw = RawInsight;

  const TABLE: &'static str = "insights";
  const COLUMNS: &'static [&'static str] = &["id", "text", "create_time", "update_time"];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    Ok(vec![
      text(encode_uuid(self.id)),
      text(self.insight.text.clone()),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawInsight> {
    Ok(RawInsight {
      id:          row.get(0)?,
      text:        row.get(1)?,
      create_time: row.get(2)?,
      update_time: row.get(3)?,
    })
  }

  fn decode(raw: RawInsight) -> Result<Self> {
    Ok(InsightEntity {
      id:          decode_uuid(&raw.id)?,
      insight:     Insight { text: raw.text },
      create_time: decode_dt(&raw.create_time)?,
      update_time: decode_dt(&raw.update_time)?,
    })
  }
}

// ── Audience ───────────────────────────────────────────────────────────────

pub struct RawAudience {
  pub id:                   String,
  pub gender:               String,
  pub birth_country:        String,
  pub age_group:            String,
  pub social_media_hours:   i64,
  pub purchases_last_month: i64,
  pub create_time:          String,
  pub update_time:          String,
}

impl Record for AudienceEntity {
  type Raw = RawAudience;

  const TABLE: &'static str = "audiences";
  const COLUMNS: &'static [&'static str] = &[
    "id",
    "gender",
    "birth_country",
    "age_group",
    "social_media_hours",
    "purchases_last_month",
    "create_time",
    "update_time",
  ];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    let a = &self.audience;
    Ok(vec![
      text(encode_uuid(self.id)),
      text(a.gender.to_string()),
      text(a.birth_country.clone()),
      text(a.age_group.to_string()),
      Value::Integer(a.social_media_hours),
      Value::Integer(a.purchases_last_month),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawAudience> {
    Ok(RawAudience {
      id:                   row.get(0)?,
      gender:               row.get(1)?,
      birth_country:        row.get(2)?,
      age_group:            row.get(3)?,
      social_media_hours:   row.get(4)?,
      purchases_last_month: row.get(5)?,
      create_time:          row.get(6)?,
      update_time:          row.get(7)?,
    })
  }

  fn decode(raw: RawAudience) -> Result<Self> {
    Ok(AudienceEntity {
      id:          decode_uuid(&raw.id)?,
      audience:    Audience {
        gender:               Gender::from_str(&raw.gender)?,
        birth_country:        raw.birth_country,
        age_group:            AgeGroup::from_str(&raw.age_group)?,
        social_media_hours:   raw.social_media_hours,
        purchases_last_month: raw.purchases_last_month,
      },
      create_time: decode_dt(&raw.create_time)?,
      update_time: decode_dt(&raw.update_time)?,
    })
  }
}

// ── Favourite ──────────────────────────────────────────────────────────────

pub struct RawFavourite {
  pub id:          String,
  pub user_id:     String,
  pub asset_id:    String,
  pub create_time: String,
  pub update_time: String,
}

impl Record for Favourite {
  type Raw = RawFavourite;

  const TABLE: &'static str = "favourites";
  const COLUMNS: &'static [&'static str] =
    &["id", "user_id", "asset_id", "create_time", "update_time"];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    Ok(vec![
      text(encode_uuid(self.id)),
      text(encode_uuid(self.user_id)),
      text(encode_uuid(self.asset_id)),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawFavourite> {
    Ok(RawFavourite {
      id:          row.get(0)?,
      user_id:     row.get(1)?,
      asset_id:    row.get(2)?,
      create_time: row.get(3)?,
      update_time: row.get(4)?,
    })
  }

  fn decode(raw: RawFavourite) -> Result<Self> {
    Ok(Favourite {
      id:          decode_uuid(&raw.id)?,
      user_id:     decode_uuid(&raw.user_id)?,
      asset_id:    decode_uuid(&raw.asset_id)?,
      create_time: decode_dt(&raw.create_time)?,
      update_time: decode_dt(&raw.update_time)?,
    })
  }
}

// ── User ───────────────────────────────────────────────────────────────────

pub struct RawUser {
  pub id:            String,
  pub email:         String,
  pub password_hash: String,
  pub create_time:   String,
  pub update_time:   String,
}

impl Record for User {
  type Raw = RawUser;

  const TABLE: &'static str = "users";
  const COLUMNS: &'static [&'static str] =
    &["id", "email", "password_hash", "create_time", "update_time"];

  fn id(&self) -> Uuid { self.id }

  fn encode(&self) -> Result<Vec<Value>> {
    Ok(vec![
      text(encode_uuid(self.id)),
      text(self.email.clone()),
      text(self.password_hash.clone()),
      text(encode_dt(self.create_time)),
      text(encode_dt(self.update_time)),
    ])
  }

  fn read(row: &Row<'_>) -> rusqlite::Result<RawUser> {
    Ok(RawUser {
      id:            row.get(0)?,
      email:         row.get(1)?,
      password_hash: row.get(2)?,
      create_time:   row.get(3)?,
      update_time:   row.get(4)?,
    })
  }

  fn decode(raw: RawUser) -> Result<Self> {
    Ok(User {
      id:            decode_uuid(&raw.id)?,
      email:         raw.email,
      password_hash: raw.password_hash,
      create_time:   decode_dt(&raw.create_time)?,
      update_time:   decode_dt(&raw.update_time)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cursor_round_trips_an_id() {
    let id = Uuid::new_v4();
    let cursor = encode_cursor(id);
    assert!(!cursor.contains('='));
    assert_eq!(decode_cursor(&cursor).unwrap(), encode_uuid(id));
  }

  #[test]
  fn garbage_cursor_is_rejected() {
    assert!(matches!(decode_cursor("not base64!"), Err(Error::Cursor(_))));
    assert!(matches!(decode_cursor(&B64.encode("not-a-uuid")), Err(Error::Cursor(_))));
  }

  #[test]
  fn unknown_enum_text_is_an_error() {
    let raw = RawAsset {
      id:          encode_uuid(Uuid::new_v4()),
      content_id:  encode_uuid(Uuid::new_v4()),
      asset_type:  "FOOBAR".into(),
      name:        "n".into(),
      description: "d".into(),
      create_time: encode_dt(Utc::now()),
      update_time: encode_dt(Utc::now()),
    };
    assert!(matches!(Asset::decode(raw), Err(Error::Enum(_))));
  }
}
