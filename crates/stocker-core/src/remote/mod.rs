//! Remote stock source: the third-party service stocks are mirrored from.

mod qiita;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::error::{Entity, Error};
use crate::models::{RemoteCredential, StockContent};

pub use qiita::QiitaClient;
pub(crate) use qiita::http_base_url;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {0}")]
    Api(String),
    #[error("Remote article not found: {0}")]
    NotFound(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

impl From<RemoteError> for Error {
    fn from(error: RemoteError) -> Self {
        Self::RemoteUnavailable(error.to_string())
    }
}

impl RemoteError {
    /// Like the `From` conversion, but a missing article is reported as a missing stock.
    pub(crate) fn into_lookup_error(self) -> Error {
        match self {
            Self::NotFound(article_id) => Error::NotFound(Entity::Stock, article_id),
            other => other.into(),
        }
    }
}

/// Author and tags of an article; absent from some list responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDetail {
    pub author_user_id: String,
    pub author_profile_image_url: String,
    pub tags: Vec<String>,
}

/// One entry of a remote stock list page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStockSummary {
    pub article_id: String,
    pub title: String,
    pub article_created_at: DateTime<Utc>,
    /// `None` when the list entry did not carry author/tag data
    pub detail: Option<ArticleDetail>,
}

/// A fully resolved remote article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArticle {
    pub article_id: String,
    pub title: String,
    pub article_created_at: DateTime<Utc>,
    pub detail: ArticleDetail,
}

impl RemoteArticle {
    /// Local stock attributes for this article.
    pub fn into_content(self) -> StockContent {
        StockContent {
            article_id: self.article_id,
            title: self.title,
            author_user_id: self.detail.author_user_id,
            author_profile_image_url: self.detail.author_profile_image_url,
            article_created_at: self.article_created_at,
            tags: self.detail.tags,
        }
    }
}

impl RemoteStockSummary {
    /// Merge list fields with detail fields; the summary's title and date win.
    pub fn into_content(self, detail: ArticleDetail) -> StockContent {
        StockContent {
            article_id: self.article_id,
            title: self.title,
            author_user_id: detail.author_user_id,
            author_profile_image_url: detail.author_profile_image_url,
            article_created_at: self.article_created_at,
            tags: detail.tags,
        }
    }
}

/// One page of a user's remote stock list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStockPage {
    pub stocks: Vec<RemoteStockSummary>,
    /// Total stocks the remote reports for the user, across all pages
    pub total_count: u64,
}

/// A fallible remote service holding each user's stocks
pub trait RemoteStockSource: Send + Sync + 'static {
    /// Fetch one 1-based page of the user's stock list
    fn fetch_page(
        &self,
        credential: &RemoteCredential,
        page: u32,
        per_page: u32,
    ) -> impl Future<Output = RemoteResult<RemoteStockPage>> + Send;

    /// Fetch one article with full detail
    fn fetch_article(
        &self,
        credential: &RemoteCredential,
        article_id: &str,
    ) -> impl Future<Output = RemoteResult<RemoteArticle>> + Send;
}

/// Fetch every article in `article_ids` with at most `concurrency` requests in flight.
///
/// Fails with the first error; the remaining requests are aborted when the
/// task set is dropped.
pub async fn fetch_details<S: RemoteStockSource>(
    source: &Arc<S>,
    credential: &RemoteCredential,
    article_ids: &[String],
    concurrency: usize,
) -> RemoteResult<HashMap<String, RemoteArticle>> {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for article_id in article_ids {
        let source = Arc::clone(source);
        let credential = credential.clone();
        let permits = Arc::clone(&permits);
        let article_id = article_id.clone();

        tasks.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| RemoteError::Api("detail fetch cancelled".to_string()))?;
            source.fetch_article(&credential, &article_id).await
        });
    }

    let mut articles = HashMap::with_capacity(article_ids.len());
    while let Some(joined) = tasks.join_next().await {
        let article = joined
            .map_err(|error| RemoteError::Api(format!("detail fetch task failed: {error}")))??;
        articles.insert(article.article_id.clone(), article);
    }

    tracing::debug!("Fetched {} article details", articles.len());
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::testing::{credential, FakeRemoteSource};

    fn ids(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(crate::testing::article_id).collect()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_details_resolves_every_id() {
        let source = Arc::new(FakeRemoteSource::with_stocks(6));
        let details = fetch_details(&source, &credential(), &ids(0..6), 3)
            .await
            .unwrap();

        assert_eq!(details.len(), 6);
        assert!(details.contains_key(&crate::testing::article_id(4)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_details_runs_requests_concurrently_within_bound() {
        let source = Arc::new(FakeRemoteSource::with_stocks(8).with_article_delay_ms(20));
        fetch_details(&source, &credential(), &ids(0..8), 3)
            .await
            .unwrap();

        let peak = source.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak > 1, "expected overlapping fetches, peak was {peak}");
        assert!(peak <= 3, "concurrency bound exceeded, peak was {peak}");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn fetch_details_fails_when_any_member_fails() {
        let source = Arc::new(FakeRemoteSource::with_stocks(5).failing_article(3));
        let result = fetch_details(&source, &credential(), &ids(0..5), 2).await;

        assert!(matches!(result, Err(RemoteError::Api(_))));
    }

    #[test]
    fn remote_faults_are_unavailable_unless_looking_up_a_stock() {
        let error: Error = RemoteError::NotFound("abc".to_string()).into();
        assert!(matches!(error, Error::RemoteUnavailable(_)));

        let error = RemoteError::NotFound("abc".to_string()).into_lookup_error();
        assert!(matches!(error, Error::NotFound(Entity::Stock, _)));

        let error = RemoteError::Api("HTTP 500".to_string()).into_lookup_error();
        assert!(matches!(error, Error::RemoteUnavailable(_)));
    }
}
