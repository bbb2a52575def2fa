//! [`SqliteStore`]: the SQLite implementation of every store port.

use std::path::Path;

use assets_core::{
  asset::{Asset, AudienceEntity, ChartEntity, InsightEntity},
  favourite::Favourite,
  store::{
    AssetStore, AudienceStore, ChartStore, FavouriteFilter, FavouriteStore, IdFilter,
    InsightStore, Page, Store, UserFilter, UserStore, effective_limit,
  },
  user::User,
};
use rusqlite::types::Value;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{Record, decode_cursor, encode_cursor, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Query ───────────────────────────────────────────────────────────────────

/// A keyset-paginated select: `column IN (...)` conditions combined with
/// AND, resuming after the cursor's id, ordered by id.
struct Query {
  conditions: Vec<(&'static str, Vec<String>)>,
  cursor:     Option<String>,
  limit:      usize,
}

fn uuids(ids: &[Uuid]) -> Vec<String> { ids.iter().copied().map(encode_uuid).collect() }

impl From<IdFilter> for Query {
  fn from(f: IdFilter) -> Self {
    Query { conditions: vec![("id", uuids(&f.ids))], cursor: f.cursor, limit: f.limit }
  }
}

impl From<FavouriteFilter> for Query {
  fn from(f: FavouriteFilter) -> Self {
    Query {
      conditions: vec![
        ("id", uuids(&f.ids)),
        ("user_id", uuids(&f.user_ids)),
        ("asset_id", uuids(&f.asset_ids)),
      ],
      cursor:     f.cursor,
      limit:      f.limit,
    }
  }
}

impl From<UserFilter> for Query {
  fn from(f: UserFilter) -> Self {
    Query {
      conditions: vec![("id", uuids(&f.ids)), ("email", f.emails)],
      cursor:     f.cursor,
      limit:      f.limit,
    }
  }
}

fn placeholders(n: usize) -> String { vec!["?"; n].join(", ") }

// ─── Store ───────────────────────────────────────────────────────────────────

/// An assets store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select<R: Record>(&self, query: Query) -> Result<Page<R>> {
    let after = query.cursor.as_deref().map(decode_cursor).transpose()?;
    let limit = effective_limit(query.limit);

    let raws: Vec<R::Raw> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; empty id lists do not restrict.
        let mut conds: Vec<String> = vec![];
        let mut params: Vec<Value> = vec![];
        for (column, values) in query.conditions {
          if values.is_empty() {
            continue;
          }
          conds.push(format!("{column} IN ({})", placeholders(values.len())));
          params.extend(values.into_iter().map(Value::Text));
        }
        if let Some(after) = after {
          conds.push("id > ?".to_owned());
          params.push(Value::Text(after));
        }
        params.push(Value::Integer(limit as i64 + 1));

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };
        let sql = format!(
          "SELECT {} FROM {} {where_clause} ORDER BY id LIMIT ?",
          R::COLUMNS.join(", "),
          R::TABLE,
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), |row| R::read(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut items: Vec<R> = raws.into_iter().map(R::decode).collect::<Result<_>>()?;

    // One extra row was fetched to learn whether another page exists.
    let cursor = if items.len() > limit {
      items.truncate(limit);
      items.last().map(|r| encode_cursor(r.id()))
    } else {
      None
    };
    Ok(Page::new(items, cursor))
  }

  /// Insert all `records` in one transaction; any duplicate id aborts it.
  async fn insert<R: Record>(&self, records: Vec<R>) -> Result<Vec<R>> {
    if records.is_empty() {
      return Ok(records);
    }
    let rows = records.iter().map(R::encode).collect::<Result<Vec<_>>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            R::TABLE,
            R::COLUMNS.join(", "),
            placeholders(R::COLUMNS.len()),
          );
          let mut stmt = tx.prepare(&sql)?;
          for row in rows {
            stmt.execute(rusqlite::params_from_iter(row))?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(records)
  }

  /// Delete `records` by id; returns only those that were actually stored.
  async fn delete<R: Record>(&self, records: Vec<R>) -> Result<Vec<R>> {
    if records.is_empty() {
      return Ok(records);
    }
    let ids: Vec<String> = records.iter().map(|r| encode_uuid(r.id())).collect();

    let removed: Vec<bool> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = Vec::with_capacity(ids.len());
        {
          let mut stmt = tx.prepare(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE))?;
          for id in &ids {
            removed.push(stmt.execute(rusqlite::params![id])? > 0);
          }
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    Ok(records.into_iter().zip(removed).filter_map(|(r, gone)| gone.then_some(r)).collect())
  }
}

// ─── Port impls ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;
}

impl AssetStore for SqliteStore {
  async fn select_assets(&self, filter: IdFilter) -> Result<Page<Asset>> {
    self.select(filter.into()).await
  }

  async fn insert_assets(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
    self.insert(assets).await
  }

  async fn update_assets(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
    let rows: Vec<(String, String, String)> = assets
      .iter()
      .map(|a| (a.description.clone(), encode_dt(a.update_time), encode_uuid(a.id)))
      .collect();

    let missing: Option<usize> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "UPDATE assets SET description = ?1, update_time = ?2 WHERE id = ?3",
          )?;
          for (index, (description, update_time, id)) in rows.iter().enumerate() {
            if stmt.execute(rusqlite::params![description, update_time, id])? == 0 {
              // Dropping the transaction rolls back earlier rows.
              return Ok(Some(index));
            }
          }
        }
        tx.commit()?;
        Ok(None)
      })
      .await?;

    match missing {
      Some(index) => Err(Error::AssetNotFound(assets[index].id)),
      None => Ok(assets),
    }
  }

  async fn delete_assets(&self, assets: Vec<Asset>) -> Result<Vec<Asset>> {
    self.delete(assets).await
  }
}

impl ChartStore for SqliteStore {
  async fn select_charts(&self, filter: IdFilter) -> Result<Page<ChartEntity>> {
    self.select(filter.into()).await
  }

  async fn insert_charts(&self, charts: Vec<ChartEntity>) -> Result<Vec<ChartEntity>> {
    self.insert(charts).await
  }

  async fn delete_charts(&self, charts: Vec<ChartEntity>) -> Result<Vec<ChartEntity>> {
    self.delete(charts).await
  }
}

impl InsightStore for SqliteStore {
  async fn select_insights(&self, filter: IdFilter) -> Result<Page<InsightEntity>> {
    self.select(filter.into()).await
  }

  async fn insert_insights(&self, insights: Vec<InsightEntity>) -> Result<Vec<InsightEntity>> {
    self.insert(insights).await
  }

  async fn delete_insights(&self, insights: Vec<InsightEntity>) -> Result<Vec<InsightEntity>> {
    self.delete(insights).await
  }
}

impl AudienceStore for SqliteStore {
  async fn select_audiences(&self, filter: IdFilter) -> Result<Page<AudienceEntity>> {
    self.select(filter.into()).await
  }

  async fn insert_audiences(
    &self,
    audiences: Vec<AudienceEntity>,
  ) -> Result<Vec<AudienceEntity>> {
    self.insert(audiences).await
  }

  async fn delete_audiences(
    &self,
    audiences: Vec<AudienceEntity>,
  ) -> Result<Vec<AudienceEntity>> {
    self.delete(audiences).await
  }
}

impl FavouriteStore for SqliteStore {
  async fn select_favourites(&self, filter: FavouriteFilter) -> Result<Page<Favourite>> {
    self.select(filter.into()).await
  }

  async fn insert_favourites(&self, favourites: Vec<Favourite>) -> Result<Vec<Favourite>> {
    self.insert(favourites).await
  }

  async fn delete_favourites(&self, favourites: Vec<Favourite>) -> Result<Vec<Favourite>> {
    self.delete(favourites).await
  }
}

impl UserStore for SqliteStore {
  async fn select_users(&self, filter: UserFilter) -> Result<Page<User>> {
    self.select(filter.into()).await
  }

  async fn insert_users(&self, users: Vec<User>) -> Result<Vec<User>> {
    self.insert(users).await
  }
}
