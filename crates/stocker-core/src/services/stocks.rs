//! Paginated stock listings.

use super::category_relations::list_related;
use super::database::require_account;
use super::DatabaseService;
use crate::db::{LibSqlStockRepository, StockFilter, StockRepository};
use crate::error::Result;
use crate::models::{AccountId, CategoryId, StockRecord};
use crate::pagination::{Page, PageWindow};

/// One window of stocks with its `Total-Count` and `Link` values
pub type StockPage = Page<StockRecord>;

/// Read side of the stock store.
///
/// Raw query values are validated before the store is touched.
#[derive(Clone)]
pub struct StockQueryService {
    db: DatabaseService,
}

impl StockQueryService {
    pub const fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// All stocks of the account, newest article first.
    pub async fn index(
        &self,
        account_id: AccountId,
        page: Option<&str>,
        per_page: Option<&str>,
        base_uri: &str,
    ) -> Result<StockPage> {
        let window = PageWindow::parse(page, per_page)?;

        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let (stocks, total_count) = LibSqlStockRepository::new(db.connection())
            .query(account_id, StockFilter::All, window.offset(), window.limit())
            .await?;

        Ok(Page::new(stocks, total_count, window, base_uri))
    }

    /// Stocks related to one of the account's categories, newest article first.
    pub async fn show_categorized(
        &self,
        account_id: AccountId,
        category_id: &str,
        page: Option<&str>,
        per_page: Option<&str>,
        base_uri: &str,
    ) -> Result<StockPage> {
        let category_id = category_id.parse::<CategoryId>()?;
        let window = PageWindow::parse(page, per_page)?;

        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        let (stocks, total_count) =
            list_related(db.connection(), account_id, category_id, window).await?;

        Ok(Page::new(stocks, total_count, window, base_uri))
    }
}
