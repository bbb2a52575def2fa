//! Helpers shared by the orchestrators.

use std::{collections::HashSet, future::Future, hash::Hash};

use assets_core::store::Page;

use crate::{Error, Result};

/// Fetch pages until the store stops returning a cursor.
pub(crate) async fn collect_all<T, E, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
  F: FnMut(Option<String>) -> Fut,
  Fut: Future<Output = Result<Page<T>, E>>,
  E: std::error::Error + Send + Sync + 'static,
{
  let mut cursor = None;
  let mut out = Vec::new();
  loop {
    let page = fetch(cursor.take()).await.map_err(Error::processing)?;
    out.extend(page.items);
    match page.cursor {
      Some(next) => cursor = Some(next),
      None => return Ok(out),
    }
  }
}

/// Distinct values in first-seen order.
pub(crate) fn distinct<T: Copy + Eq + Hash>(values: impl IntoIterator<Item = T>) -> Vec<T> {
  let mut seen = HashSet::new();
  values.into_iter().filter(|v| seen.insert(*v)).collect()
}

pub(crate) fn non_empty<T>(batch: &[T]) -> Result<()> {
  if batch.is_empty() {
    return Err(Error::Validation("request cannot be empty".into()));
  }
  Ok(())
}
