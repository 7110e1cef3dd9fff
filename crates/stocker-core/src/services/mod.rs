//! Services shared by every Stocker client.

mod category_relations;
mod database;
mod stocks;

pub use category_relations::CategoryRelationManager;
pub use database::DatabaseService;
pub use stocks::{StockPage, StockQueryService};
