//! SQLite backend for the assets store ports.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every collection is its own table and
//! there are no foreign keys: cross-collection consistency is the service
//! layer's job.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
