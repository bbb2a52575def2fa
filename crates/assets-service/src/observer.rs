//! Hook for compensation steps that could not complete.
//!
//! A failed rollback leaves orphaned records behind (a payload with no
//! envelope, or a favourite that was never restored). Such failures are never
//! returned to the caller, whose original error takes precedence, so they are
//! routed here instead.

use std::{
  fmt,
  sync::atomic::{AtomicU64, Ordering},
};

use assets_core::asset::AssetType;

/// Which compensation step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackScope {
  /// Deleting payloads prepared for an asset creation that did not complete.
  DiscardPayloads(AssetType),
  /// Re-inserting payloads removed by an asset deletion that did not complete.
  RestorePayloads(AssetType),
  /// Re-inserting favourites removed by an asset deletion that did not
  /// complete.
  RestoreFavourites,
}

impl fmt::Display for RollbackScope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RollbackScope::DiscardPayloads(kind) => write!(f, "discard_payloads:{kind}"),
      RollbackScope::RestorePayloads(kind) => write!(f, "restore_payloads:{kind}"),
      RollbackScope::RestoreFavourites => f.write_str("restore_favourites"),
    }
  }
}

pub trait CompensationObserver: Send + Sync {
  fn rollback_failed(&self, scope: RollbackScope, error: &(dyn std::error::Error + 'static));
}

/// Logs each failure as a `tracing` error event and keeps a running count.
#[derive(Debug, Default)]
pub struct TracingObserver {
  failures: AtomicU64,
}

impl TracingObserver {
  pub fn new() -> Self { Self::default() }

  /// Number of rollback failures observed since startup.
  pub fn failures(&self) -> u64 { self.failures.load(Ordering::Relaxed) }
}

impl CompensationObserver for TracingObserver {
  fn rollback_failed(&self, scope: RollbackScope, error: &(dyn std::error::Error + 'static)) {
    let total = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::error!(%scope, error = %error, total, "rollback failed; records may be orphaned");
  }
}
