//! Remote-to-local stock synchronization.
//!
//! A run walks the account's remote stock list, resolves missing article
//! detail concurrently, then merges everything into the store inside one
//! transaction. Remote deletions are not mirrored.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;

use crate::db::{LibSqlStockRepository, StockRepository, UpsertSummary};
use crate::error::Result;
use crate::models::{validate_article_id, AccountId, RemoteCredential, StockContent};
use crate::remote::{fetch_details, RemoteError, RemoteStockSource, RemoteStockSummary};
use crate::services::DatabaseService;

/// Page size used when walking the remote stock list (the remote maximum)
pub const SYNC_PAGE_SIZE: u32 = 100;

/// Default bound on concurrent article detail requests
pub const DEFAULT_SYNC_CONCURRENCY: usize = 8;

/// Outcome of one synchronization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Distinct stocks reported by the remote source
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl SyncReport {
    fn new(fetched: usize, summary: UpsertSummary) -> Self {
        Self {
            fetched,
            inserted: summary.inserted,
            updated: summary.updated,
            unchanged: summary.unchanged,
        }
    }
}

/// Mirrors an account's remote stocks into the local store.
pub struct SynchronizationEngine<S> {
    db: DatabaseService,
    source: Arc<S>,
    concurrency: usize,
    page_size: u32,
}

impl<S: RemoteStockSource> SynchronizationEngine<S> {
    pub fn new(db: DatabaseService, source: Arc<S>) -> Self {
        Self {
            db,
            source,
            concurrency: DEFAULT_SYNC_CONCURRENCY,
            page_size: SYNC_PAGE_SIZE,
        }
    }

    /// Bound the number of article detail requests in flight.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[cfg(test)]
    fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Synchronize the account's stocks.
    ///
    /// Either every fetched stock is merged or, on any failure, the store is
    /// left as it was.
    pub async fn synchronize(&self, account_id: AccountId) -> Result<SyncReport> {
        let account = self.db.resolve_account(account_id).await?;
        let credential = account.credential();
        tracing::info!("Synchronizing stocks for {}", account.user_name);

        let summaries = self.fetch_summaries(&credential).await?;
        let contents = self.resolve_contents(&credential, summaries).await?;
        let summary = self.store(account_id, &contents).await?;

        let report = SyncReport::new(contents.len(), summary);
        tracing::info!(
            "Synchronized {} stocks for {} ({} inserted, {} updated, {} unchanged)",
            report.fetched,
            account.user_name,
            report.inserted,
            report.updated,
            report.unchanged
        );
        Ok(report)
    }

    /// Walk every remote page in order, keeping the first copy of each article.
    async fn fetch_summaries(
        &self,
        credential: &RemoteCredential,
    ) -> Result<Vec<RemoteStockSummary>> {
        let mut seen = HashSet::new();
        let mut summaries = Vec::new();
        let mut page = 1_u32;

        loop {
            let remote = self
                .source
                .fetch_page(credential, page, self.page_size)
                .await?;
            let last_page = remote.total_count.div_ceil(u64::from(self.page_size));
            tracing::debug!(
                "Remote page {page}/{last_page}: {} stocks",
                remote.stocks.len()
            );

            if remote.stocks.is_empty() {
                break;
            }
            for stock in remote.stocks {
                validate_article_id(&stock.article_id).map_err(|_| {
                    RemoteError::InvalidPayload(format!(
                        "unexpected article id {:?}",
                        stock.article_id
                    ))
                })?;
                if seen.insert(stock.article_id.clone()) {
                    summaries.push(stock);
                }
            }

            if u64::from(page) >= last_page {
                break;
            }
            let Some(next) = page.checked_add(1) else {
                break;
            };
            page = next;
        }

        Ok(summaries)
    }

    /// Fill in author and tags for summaries the list did not carry them for.
    async fn resolve_contents(
        &self,
        credential: &RemoteCredential,
        summaries: Vec<RemoteStockSummary>,
    ) -> Result<Vec<StockContent>> {
        let missing = summaries
            .iter()
            .filter(|summary| summary.detail.is_none())
            .map(|summary| summary.article_id.clone())
            .collect::<Vec<_>>();

        let mut details = if missing.is_empty() {
            Default::default()
        } else {
            tracing::debug!("Fetching detail for {} stocks", missing.len());
            fetch_details(&self.source, credential, &missing, self.concurrency).await?
        };

        let mut contents = Vec::with_capacity(summaries.len());
        for mut summary in summaries {
            let detail = match summary.detail.take() {
                Some(detail) => detail,
                None => details
                    .remove(&summary.article_id)
                    .map(|article| article.detail)
                    .ok_or_else(|| {
                        RemoteError::InvalidPayload(format!(
                            "no detail returned for {}",
                            summary.article_id
                        ))
                    })?,
            };
            contents.push(summary.into_content(detail));
        }
        Ok(contents)
    }

    async fn store(&self, account_id: AccountId, contents: &[StockContent]) -> Result<UpsertSummary> {
        let db = self.db.lock().await;
        let tx = db.connection().transaction().await?;

        let result = LibSqlStockRepository::new(&tx)
            .upsert_batch(account_id, contents)
            .await;

        match result {
            Ok(summary) => {
                tx.commit().await?;
                Ok(summary)
            }
            Err(error) => {
                tracing::warn!("Rolling back stock synchronization: {error}");
                tx.rollback().await.ok();
                Err(error)
            }
        }
    }
}
