//! Orchestration layer for the assets service.
//!
//! An [`Asset`](assets_core::asset::Asset) envelope and its payload live in
//! different collections and the store offers no transactions across them.
//! The services here keep the two consistent: payload writes fan out over the
//! three payload collections concurrently ([`compose::Composer`]), and a
//! partial failure is undone by best-effort compensation whose own failures
//! are reported to a [`observer::CompensationObserver`] rather than returned.

pub mod assets;
pub mod compose;
pub mod error;
pub mod favourites;
pub mod hasher;
pub mod observer;
mod paging;
pub mod users;

pub use assets::AssetsService;
pub use error::{Error, Result};
pub use favourites::FavouritesService;
pub use users::UsersService;

#[cfg(test)]
mod tests;
