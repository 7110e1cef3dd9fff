//! Category relation management with account ownership checks.

use std::collections::HashSet;
use std::sync::Arc;

use libsql::Connection;

use super::database::require_account;
use super::DatabaseService;
use crate::db::{
    CategoryRepository, LibSqlCategoryRepository, LibSqlStockRepository, StockFilter,
    StockRepository,
};
use crate::error::{Entity, Error, Result};
use crate::models::{
    validate_article_id, AccountId, CategoryId, CategoryRelation, RelationId, StockRecord,
};
use crate::pagination::PageWindow;
use crate::remote::{fetch_details, RemoteError, RemoteStockSource};
use crate::sync::DEFAULT_SYNC_CONCURRENCY;

/// Relates an account's stocks to its categories.
///
/// Stocks that are not mirrored yet are fetched from the remote source and
/// stored together with the new relation.
pub struct CategoryRelationManager<S> {
    db: DatabaseService,
    source: Arc<S>,
    concurrency: usize,
}

impl<S: RemoteStockSource> CategoryRelationManager<S> {
    pub fn new(db: DatabaseService, source: Arc<S>) -> Self {
        Self {
            db,
            source,
            concurrency: DEFAULT_SYNC_CONCURRENCY,
        }
    }

    /// Bound the number of remote article requests in flight.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Relate one article to one of the account's categories.
    pub async fn categorize(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        article_id: &str,
    ) -> Result<CategoryRelation> {
        let mut relations = self
            .categorize_all(account_id, category_id, &[article_id.to_string()])
            .await?;
        relations
            .pop()
            .ok_or_else(|| Error::Storage("relation was not created".to_string()))
    }

    /// Relate several articles to one category; all relations are created or none.
    pub async fn categorize_all(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        article_ids: &[String],
    ) -> Result<Vec<CategoryRelation>> {
        if article_ids.is_empty() {
            return Err(Error::validation("at least one article id is required"));
        }
        let mut distinct = HashSet::new();
        for article_id in article_ids {
            validate_article_id(article_id)?;
            if !distinct.insert(article_id.as_str()) {
                return Err(Error::Conflict(format!(
                    "article {article_id} is listed more than once"
                )));
            }
        }

        let (credential, missing) = {
            let db = self.db.lock().await;
            let account = require_account(db.connection(), account_id).await?;
            let missing =
                check_relatable(db.connection(), account_id, category_id, article_ids).await?;
            (account.credential(), missing)
        };

        let mut fetched = if missing.is_empty() {
            Default::default()
        } else {
            tracing::debug!("Fetching {} unmirrored stocks for categorization", missing.len());
            fetch_details(&self.source, &credential, &missing, self.concurrency)
                .await
                .map_err(RemoteError::into_lookup_error)?
        };

        let db = self.db.lock().await;
        let tx = db.connection().transaction().await?;
        let result = async {
            let still_missing = check_relatable(&tx, account_id, category_id, article_ids).await?;
            let stocks = LibSqlStockRepository::new(&tx);
            for article_id in &still_missing {
                let article = fetched
                    .remove(article_id)
                    .ok_or_else(|| Error::not_found(Entity::Stock, article_id))?;
                stocks.insert(account_id, &article.into_content()).await?;
            }

            let categories = LibSqlCategoryRepository::new(&tx);
            let mut relations = Vec::with_capacity(article_ids.len());
            for article_id in article_ids {
                relations.push(categories.create_relation(category_id, article_id).await?);
            }
            Ok::<_, Error>(relations)
        }
        .await;

        match result {
            Ok(relations) => {
                tx.commit().await?;
                tracing::info!(
                    "Related {} stocks to category {category_id}",
                    relations.len()
                );
                Ok(relations)
            }
            Err(error) => {
                tracing::warn!("Rolling back categorization: {error}");
                tx.rollback().await.ok();
                Err(error)
            }
        }
    }

    /// Delete a relation whose category belongs to the account.
    pub async fn destroy_relation(&self, account_id: AccountId, relation_id: RelationId) -> Result<()> {
        self.db.destroy_relation(account_id, relation_id).await
    }

    /// Windowed stocks related to one of the account's categories, plus their total.
    pub async fn list_by_category(
        &self,
        account_id: AccountId,
        category_id: CategoryId,
        window: PageWindow,
    ) -> Result<(Vec<StockRecord>, u64)> {
        let db = self.db.lock().await;
        require_account(db.connection(), account_id).await?;
        list_related(db.connection(), account_id, category_id, window).await
    }
}

/// Stocks related to an owned category, newest article first.
pub(crate) async fn list_related(
    conn: &Connection,
    account_id: AccountId,
    category_id: CategoryId,
    window: PageWindow,
) -> Result<(Vec<StockRecord>, u64)> {
    require_category(conn, account_id, category_id).await?;
    LibSqlStockRepository::new(conn)
        .query(
            account_id,
            StockFilter::Category(category_id),
            window.offset(),
            window.limit(),
        )
        .await
}

async fn require_category(
    conn: &Connection,
    account_id: AccountId,
    category_id: CategoryId,
) -> Result<()> {
    LibSqlCategoryRepository::new(conn)
        .find_owned(account_id, category_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::not_found(Entity::Category, category_id))
}

/// Check the category is owned and none of the articles is related yet.
///
/// Returns the article ids that have no local stock.
async fn check_relatable(
    conn: &Connection,
    account_id: AccountId,
    category_id: CategoryId,
    article_ids: &[String],
) -> Result<Vec<String>> {
    require_category(conn, account_id, category_id).await?;

    let categories = LibSqlCategoryRepository::new(conn);
    let stocks = LibSqlStockRepository::new(conn);
    let mut missing = Vec::new();
    for article_id in article_ids {
        if categories
            .find_relation(category_id, article_id)
            .await?
            .is_some()
        {
            return Err(Error::Conflict(format!(
                "article {article_id} is already in category {category_id}"
            )));
        }
        if stocks.find(account_id, article_id).await?.is_none() {
            missing.push(article_id.clone());
        }
    }
    Ok(missing)
}
