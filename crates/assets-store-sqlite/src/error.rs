//! Error type for `assets-store-sqlite`.

use assets_core::store::{StoreError, StoreErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored enum column holds a value no variant maps to.
  #[error("unknown enum value: {0}")]
  Enum(#[from] strum::ParseError),

  #[error("invalid cursor: {0}")]
  Cursor(String),

  /// Attempted to update an asset that is not stored.
  #[error("asset not found: {0}")]
  AssetNotFound(uuid::Uuid),
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Error::Cursor(_) => StoreErrorKind::InvalidCursor,
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        StoreErrorKind::Conflict
      }
      _ => StoreErrorKind::Other,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
