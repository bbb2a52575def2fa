//! Error taxonomy shared by every orchestrator.

use assets_core::store::{StoreError, StoreErrorKind};
use thiserror::Error;

use crate::compose::CompositionError;

#[derive(Debug, Error)]
pub enum Error {
  /// The request failed field or domain validation. Nothing was written.
  #[error("validation error: {0}")]
  Validation(String),

  #[error("cannot be found: {0}")]
  NotFound(String),

  #[error("already exists: {0}")]
  AlreadyExists(String),

  /// Unknown email or wrong password; the two are deliberately
  /// indistinguishable.
  #[error("invalid credentials")]
  Authentication,

  /// A store call or composition step failed.
  #[error("processing error: {0}")]
  Processing(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn processing(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Processing(Box::new(e))
  }

  /// Wrap a store failure, turning a rejected client cursor into a
  /// validation error.
  pub fn store(e: impl StoreError) -> Self {
    match e.kind() {
      StoreErrorKind::InvalidCursor => Error::Validation(format!("invalid cursor: {e}")),
      _ => Error::processing(e),
    }
  }
}

impl From<validator::ValidationErrors> for Error {
  fn from(e: validator::ValidationErrors) -> Self { Error::Validation(e.to_string()) }
}

impl From<CompositionError> for Error {
  fn from(e: CompositionError) -> Self { Error::processing(e) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
