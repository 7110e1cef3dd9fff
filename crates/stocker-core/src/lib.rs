//! stocker-core - Core library for Stocker
//!
//! Mirrors a Qiita user's stocked articles into a local libSQL store,
//! relates them to user-defined categories, and serves them back through
//! offset pagination with `Total-Count` / `Link` metadata.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod remote;
pub mod services;
pub mod sync;

#[cfg(test)]
mod testing;

pub use error::{Entity, Error, Result};
pub use models::{Account, AccountId, Category, CategoryId, RelationId, StockRecord};
pub use pagination::{Page, PageWindow};
pub use services::{CategoryRelationManager, DatabaseService, StockPage, StockQueryService};
pub use sync::{SyncReport, SynchronizationEngine};
