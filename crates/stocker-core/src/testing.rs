//! Fixtures shared by the crate's test modules.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{AccountId, RemoteCredential, StockContent};
use crate::remote::{
    ArticleDetail, RemoteArticle, RemoteError, RemoteResult, RemoteStockPage, RemoteStockSource,
    RemoteStockSummary,
};
use crate::services::DatabaseService;

pub fn article_id(index: usize) -> String {
    format!("abcdefghij{index:010}")
}

fn article_created_at(index: usize) -> DateTime<Utc> {
    let hours = i64::try_from(index).unwrap_or_default();
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(hours)
}

/// Stock attributes for fixture article `index`; larger indexes are newer.
pub fn stock_content(index: usize) -> StockContent {
    article(index).into_content()
}

pub fn article(index: usize) -> RemoteArticle {
    RemoteArticle {
        article_id: article_id(index),
        title: format!("Stock {index}"),
        article_created_at: article_created_at(index),
        detail: ArticleDetail {
            author_user_id: format!("author{}", index % 3),
            author_profile_image_url: format!("https://example.com/author{}.png", index % 3),
            tags: vec!["rust".to_string(), format!("tag{index}")],
        },
    }
}

pub fn credential() -> RemoteCredential {
    RemoteCredential {
        user_name: "kobayashi".to_string(),
        access_token: "token".to_string(),
    }
}

/// Register an account matching [`credential`].
pub async fn seed_account(db: &DatabaseService) -> AccountId {
    db.create_account("kobayashi", "token").await.unwrap().id
}

/// Scripted in-memory remote source.
///
/// Serves its articles newest first, the order the remote lists stocks in.
pub struct FakeRemoteSource {
    articles: Mutex<Vec<RemoteArticle>>,
    failing_articles: HashSet<String>,
    missing_articles: HashSet<String>,
    fail_pages: bool,
    summaries_without_detail: bool,
    article_delay: Duration,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub page_requests: AtomicUsize,
    pub article_requests: AtomicUsize,
}

impl FakeRemoteSource {
    pub fn with_stocks(count: usize) -> Self {
        Self {
            articles: Mutex::new((0..count).rev().map(article).collect()),
            failing_articles: HashSet::new(),
            missing_articles: HashSet::new(),
            fail_pages: false,
            summaries_without_detail: false,
            article_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            page_requests: AtomicUsize::new(0),
            article_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_article_delay_ms(mut self, millis: u64) -> Self {
        self.article_delay = Duration::from_millis(millis);
        self
    }

    /// Article fetches for fixture `index` fail with an API error.
    pub fn failing_article(mut self, index: usize) -> Self {
        self.failing_articles.insert(article_id(index));
        self
    }

    /// Fixture `index` stays listed but its article fetch answers not found.
    pub fn missing_article(mut self, index: usize) -> Self {
        self.missing_articles.insert(article_id(index));
        self
    }

    /// Every page fetch fails with an API error.
    pub fn failing_pages(mut self) -> Self {
        self.fail_pages = true;
        self
    }

    /// List pages omit author and tags, forcing per-article fetches.
    pub fn without_list_detail(mut self) -> Self {
        self.summaries_without_detail = true;
        self
    }

    /// Change the remote title of fixture `index`.
    pub fn retitle(&self, index: usize, title: &str) {
        let id = article_id(index);
        let mut articles = self.articles.lock().unwrap();
        if let Some(article) = articles.iter_mut().find(|article| article.article_id == id) {
            article.title = title.to_string();
        }
    }

    /// Insert an extra copy of fixture `index` at the front of the list.
    pub fn duplicate_first(&self, index: usize) {
        self.articles.lock().unwrap().insert(0, article(index));
    }
}

impl RemoteStockSource for FakeRemoteSource {
    async fn fetch_page(
        &self,
        _credential: &RemoteCredential,
        page: u32,
        per_page: u32,
    ) -> RemoteResult<RemoteStockPage> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages {
            return Err(RemoteError::Api("HTTP 500".to_string()));
        }

        let articles = self.articles.lock().unwrap().clone();
        let start = (page.saturating_sub(1) as usize) * per_page as usize;
        let stocks = articles
            .iter()
            .skip(start)
            .take(per_page as usize)
            .map(|article| RemoteStockSummary {
                article_id: article.article_id.clone(),
                title: article.title.clone(),
                article_created_at: article.article_created_at,
                detail: (!self.summaries_without_detail).then(|| article.detail.clone()),
            })
            .collect();

        Ok(RemoteStockPage {
            stocks,
            total_count: articles.len() as u64,
        })
    }

    async fn fetch_article(
        &self,
        _credential: &RemoteCredential,
        article_id: &str,
    ) -> RemoteResult<RemoteArticle> {
        self.article_requests.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.article_delay.is_zero() {
            tokio::time::sleep(self.article_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_articles.contains(article_id) {
            return Err(RemoteError::Api(format!("failed to load {article_id}")));
        }
        if self.missing_articles.contains(article_id) {
            return Err(RemoteError::NotFound(article_id.to_string()));
        }

        let found = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .find(|article| article.article_id == article_id)
            .cloned();
        found.ok_or_else(|| RemoteError::NotFound(article_id.to_string()))
    }
}
