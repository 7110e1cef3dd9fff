//! Stock repository implementation

use std::collections::HashMap;

use crate::error::{classify_constraint, Entity, Error, Result};
use crate::models::{AccountId, CategoryId, StockContent, StockId, StockRecord};
use chrono::DateTime;
use libsql::{params, Connection};

const STOCK_COLUMNS: &str = "s.id, s.account_id, s.article_id, s.title, s.author_user_id, \
     s.author_profile_image_url, s.article_created_at, s.tags, s.version, s.created_at, s.updated_at";

/// Which stocks of an account a query covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockFilter {
    /// Every stock of the account
    All,
    /// Stocks related to one category of the account
    Category(CategoryId),
}

/// Counts produced by [`StockRepository::upsert_batch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Trait for stock storage operations (async)
///
/// Mutations are not wrapped in a transaction here; callers that need
/// atomicity pass a transaction's connection.
#[allow(async_fn_in_trait)]
pub trait StockRepository {
    /// Get one stock of an account by remote article id
    async fn find(&self, account_id: AccountId, article_id: &str) -> Result<Option<StockRecord>>;

    /// All stocks of an account keyed by article id
    async fn find_all(&self, account_id: AccountId) -> Result<HashMap<String, StockRecord>>;

    /// Insert a new stock at version 0
    async fn insert(&self, account_id: AccountId, content: &StockContent) -> Result<StockRecord>;

    /// Overwrite a stock's attributes if its stored version still equals `expected_version`
    async fn update_versioned(
        &self,
        id: StockId,
        expected_version: i64,
        content: &StockContent,
    ) -> Result<StockRecord>;

    /// Insert new stocks, update changed ones, and leave identical ones untouched
    async fn upsert_batch(
        &self,
        account_id: AccountId,
        contents: &[StockContent],
    ) -> Result<UpsertSummary>;

    /// Windowed stocks, newest article first, plus the unwindowed total
    async fn query(
        &self,
        account_id: AccountId,
        filter: StockFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<StockRecord>, u64)>;
}

/// libSQL implementation of `StockRepository`
pub struct LibSqlStockRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlStockRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn get(&self, id: StockId) -> Result<StockRecord> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {STOCK_COLUMNS} FROM stocks s WHERE s.id = ?"),
                params![id.get()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => parse_stock(&row),
            None => Err(Error::not_found(Entity::Stock, id)),
        }
    }

    async fn count(&self, account_id: AccountId, filter: StockFilter) -> Result<u64> {
        let mut rows = match filter {
            StockFilter::All => {
                self.conn
                    .query(
                        "SELECT COUNT(*) FROM stocks s WHERE s.account_id = ?",
                        params![account_id.get()],
                    )
                    .await?
            }
            StockFilter::Category(category_id) => {
                self.conn
                    .query(
                        "SELECT COUNT(*)
                         FROM stocks s
                         JOIN category_stocks cs ON cs.article_id = s.article_id
                         JOIN categories c ON c.id = cs.category_id AND c.account_id = s.account_id
                         WHERE s.account_id = ? AND c.id = ?",
                        params![account_id.get(), category_id.get()],
                    )
                    .await?
            }
        };

        let count: i64 = match rows.next().await? {
            Some(row) => row.get(0)?,
            None => 0,
        };
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl StockRepository for LibSqlStockRepository<'_> {
    async fn find(&self, account_id: AccountId, article_id: &str) -> Result<Option<StockRecord>> {
        let mut rows = self
            .conn
            .query(
                &format!(
                    "SELECT {STOCK_COLUMNS} FROM stocks s WHERE s.account_id = ? AND s.article_id = ?"
                ),
                params![account_id.get(), article_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => parse_stock(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn find_all(&self, account_id: AccountId) -> Result<HashMap<String, StockRecord>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {STOCK_COLUMNS} FROM stocks s WHERE s.account_id = ?"),
                params![account_id.get()],
            )
            .await?;

        let mut stocks = HashMap::new();
        while let Some(row) = rows.next().await? {
            let stock = parse_stock(&row)?;
            stocks.insert(stock.content.article_id.clone(), stock);
        }
        Ok(stocks)
    }

    async fn insert(&self, account_id: AccountId, content: &StockContent) -> Result<StockRecord> {
        let now = chrono::Utc::now().timestamp_millis();
        let tags = serde_json::to_string(&content.tags)?;

        self.conn
            .execute(
                "INSERT INTO stocks (
                    account_id, article_id, title, author_user_id, author_profile_image_url,
                    article_created_at, tags, version, created_at, updated_at
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
                params![
                    account_id.get(),
                    content.article_id.as_str(),
                    content.title.as_str(),
                    content.author_user_id.as_str(),
                    content.author_profile_image_url.as_str(),
                    content.article_created_at.timestamp_millis(),
                    tags,
                    now,
                    now
                ],
            )
            .await
            .map_err(|error| classify_constraint(error, "Stock"))?;

        Ok(StockRecord {
            id: StockId::new(self.conn.last_insert_rowid()),
            account_id,
            content: content.clone(),
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update_versioned(
        &self,
        id: StockId,
        expected_version: i64,
        content: &StockContent,
    ) -> Result<StockRecord> {
        let now = chrono::Utc::now().timestamp_millis();
        let tags = serde_json::to_string(&content.tags)?;

        let rows = self
            .conn
            .execute(
                "UPDATE stocks
                 SET title = ?, author_user_id = ?, author_profile_image_url = ?,
                     article_created_at = ?, tags = ?, version = version + 1, updated_at = ?
                 WHERE id = ? AND version = ?",
                params![
                    content.title.as_str(),
                    content.author_user_id.as_str(),
                    content.author_profile_image_url.as_str(),
                    content.article_created_at.timestamp_millis(),
                    tags,
                    now,
                    id.get(),
                    expected_version
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::Conflict(format!(
                "stock {} was modified concurrently (expected version {expected_version})",
                content.article_id
            )));
        }

        self.get(id).await
    }

    async fn upsert_batch(
        &self,
        account_id: AccountId,
        contents: &[StockContent],
    ) -> Result<UpsertSummary> {
        let existing = self.find_all(account_id).await?;
        let mut summary = UpsertSummary::default();

        for content in contents {
            match existing.get(&content.article_id) {
                None => {
                    self.insert(account_id, content).await?;
                    summary.inserted += 1;
                }
                Some(stock) if stock.differs_from(content) => {
                    self.update_versioned(stock.id, stock.version, content)
                        .await?;
                    summary.updated += 1;
                }
                Some(_) => summary.unchanged += 1,
            }
        }

        Ok(summary)
    }

    async fn query(
        &self,
        account_id: AccountId,
        filter: StockFilter,
        offset: u64,
        limit: u64,
    ) -> Result<(Vec<StockRecord>, u64)> {
        let total = self.count(account_id, filter).await?;
        let limit = to_sql_int(limit);
        let offset = to_sql_int(offset);

        let mut rows = match filter {
            StockFilter::All => {
                self.conn
                    .query(
                        &format!(
                            "SELECT {STOCK_COLUMNS}
                             FROM stocks s
                             WHERE s.account_id = ?
                             ORDER BY s.article_created_at DESC, s.id DESC
                             LIMIT ? OFFSET ?"
                        ),
                        params![account_id.get(), limit, offset],
                    )
                    .await?
            }
            StockFilter::Category(category_id) => {
                self.conn
                    .query(
                        &format!(
                            "SELECT {STOCK_COLUMNS}
                             FROM stocks s
                             JOIN category_stocks cs ON cs.article_id = s.article_id
                             JOIN categories c ON c.id = cs.category_id AND c.account_id = s.account_id
                             WHERE s.account_id = ? AND c.id = ?
                             ORDER BY s.article_created_at DESC, s.id DESC
                             LIMIT ? OFFSET ?"
                        ),
                        params![account_id.get(), category_id.get(), limit, offset],
                    )
                    .await?
            }
        };

        let mut stocks = Vec::new();
        while let Some(row) = rows.next().await? {
            stocks.push(parse_stock(&row)?);
        }
        Ok((stocks, total))
    }
}

/// Parse a stock from a row selected with `STOCK_COLUMNS`
fn parse_stock(row: &libsql::Row) -> Result<StockRecord> {
    let article_created_at: i64 = row.get(6)?;
    let tags: String = row.get(7)?;

    Ok(StockRecord {
        id: StockId::new(row.get(0)?),
        account_id: AccountId::new(row.get(1)?),
        content: StockContent {
            article_id: row.get(2)?,
            title: row.get(3)?,
            author_user_id: row.get(4)?,
            author_profile_image_url: row.get(5)?,
            article_created_at: DateTime::from_timestamp_millis(article_created_at).ok_or_else(
                || Error::Storage(format!("invalid article timestamp {article_created_at}")),
            )?,
            tags: serde_json::from_str(&tags)?,
        },
        version: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

// Windows are built from u32 page values, so they always fit.
fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
