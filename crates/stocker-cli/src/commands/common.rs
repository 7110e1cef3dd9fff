use std::env;
use std::path::{Path, PathBuf};

use stocker_core::config::StockerConfig;
use stocker_core::{AccountId, Category, DatabaseService, StockPage, StockRecord};

use crate::error::CliError;

pub fn resolve_db_path(
    cli_db_path: Option<PathBuf>,
    config: &StockerConfig,
) -> Result<PathBuf, CliError> {
    match cli_db_path.or_else(|| config.db_path.clone()) {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("stocker").join("stocker.db"))
        .ok_or(CliError::NoDataDir)
}

pub async fn open_database(path: &Path) -> Result<DatabaseService, CliError> {
    tracing::debug!("Using database at {}", path.display());
    Ok(DatabaseService::open_path(path.to_path_buf()).await?)
}

/// Parse `--account`, falling back to `STOCKER_ACCOUNT_ID`.
pub fn resolve_account_id(cli_account: Option<&str>) -> Result<AccountId, CliError> {
    let raw = match cli_account {
        Some(raw) => raw.to_string(),
        None => env::var("STOCKER_ACCOUNT_ID").map_err(|_| CliError::MissingAccount)?,
    };
    Ok(raw.trim().parse::<AccountId>()?)
}

pub fn format_stock_lines(stocks: &[StockRecord]) -> Vec<String> {
    stocks
        .iter()
        .map(|stock| {
            let date = stock.content.article_created_at.format("%Y-%m-%d");
            let title = truncate(&stock.content.title, 48);
            let tags = stock.content.tags.join(", ");

            if tags.is_empty() {
                format!("{:<20}  {date}  {title}", stock.article_id())
            } else {
                format!("{:<20}  {date}  {title:<48}  [{tags}]", stock.article_id())
            }
        })
        .collect()
}

/// `Total-Count` and `Link` lines shown under a listing.
pub fn format_page_footer(page: &StockPage) -> Vec<String> {
    let mut lines = vec![format!("Total-Count: {}", page.total_count)];
    if let Some(link) = &page.link {
        lines.push(format!("Link: {link}"));
    }
    lines
}

pub fn print_stock_page(page: &StockPage, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }

    if page.items.is_empty() {
        println!("No stocks on this page.");
    }
    for line in format_stock_lines(&page.items) {
        println!("{line}");
    }
    for line in format_page_footer(page) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_category_lines(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .map(|category| format!("{:>6}  {}", category.id, category.name))
        .collect()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    truncated.push_str("...");
    truncated
}
