//! Database layer for Stocker

mod account_repository;
mod category_repository;
mod connection;
mod migrations;
mod stock_repository;

pub use account_repository::{AccountRepository, LibSqlAccountRepository};
pub use category_repository::{CategoryRepository, LibSqlCategoryRepository};
pub use connection::Database;
pub use stock_repository::{LibSqlStockRepository, StockFilter, StockRepository, UpsertSummary};
