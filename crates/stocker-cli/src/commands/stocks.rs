use stocker_core::config::StockerConfig;
use stocker_core::{AccountId, CategoryId, DatabaseService, StockQueryService};

use crate::cli::WindowArgs;
use crate::commands::common::print_stock_page;
use crate::error::CliError;

pub async fn run_stocks(
    db: &DatabaseService,
    config: &StockerConfig,
    account_id: AccountId,
    window: &WindowArgs,
    as_json: bool,
) -> Result<(), CliError> {
    let page = StockQueryService::new(db.clone())
        .index(
            account_id,
            Some(&window.page),
            Some(&window.per_page),
            &config.stocks_uri(),
        )
        .await?;

    print_stock_page(&page, as_json)
}

pub async fn run_categorized(
    db: &DatabaseService,
    config: &StockerConfig,
    account_id: AccountId,
    category_id: &str,
    window: &WindowArgs,
    as_json: bool,
) -> Result<(), CliError> {
    let base_uri = config.categorized_stocks_uri(category_id.parse::<CategoryId>()?);
    let page = StockQueryService::new(db.clone())
        .show_categorized(
            account_id,
            category_id,
            Some(&window.page),
            Some(&window.per_page),
            &base_uri,
        )
        .await?;

    print_stock_page(&page, as_json)
}
