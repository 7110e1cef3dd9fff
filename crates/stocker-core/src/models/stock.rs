//! Stock model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{row_id, AccountId};
use crate::error::{Error, Result};

const MAX_ARTICLE_ID_LEN: usize = 64;

/// Local row identifier of a stock record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockId(i64);

row_id!(StockId, "stock id");

/// Attributes of a stocked article as reported by the remote source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockContent {
    /// Remote article identifier
    pub article_id: String,
    /// Article title
    pub title: String,
    /// Remote id of the article's author
    pub author_user_id: String,
    /// Author avatar URL
    pub author_profile_image_url: String,
    /// When the article was published
    pub article_created_at: DateTime<Utc>,
    /// Tag names, in the order the remote source lists them
    pub tags: Vec<String>,
}

/// A stock mirrored into the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Local row identifier
    pub id: StockId,
    /// Owning account
    pub account_id: AccountId,
    /// Remote attributes
    #[serde(flatten)]
    pub content: StockContent,
    /// Optimistic concurrency token, bumped on every update
    pub version: i64,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl StockRecord {
    /// The remote article identifier.
    pub fn article_id(&self) -> &str {
        &self.content.article_id
    }

    /// Whether applying `content` would change this record.
    pub fn differs_from(&self, content: &StockContent) -> bool {
        self.content != *content
    }
}

/// Check that an article identifier is safe to store and to put in a URL path.
pub fn validate_article_id(article_id: &str) -> Result<&str> {
    if article_id.is_empty()
        || article_id.len() > MAX_ARTICLE_ID_LEN
        || !article_id.bytes().all(|byte| byte.is_ascii_alphanumeric())
    {
        return Err(Error::validation(format!(
            "article id must be 1-{MAX_ARTICLE_ID_LEN} ASCII alphanumeric characters"
        )));
    }
    Ok(article_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(title: &str) -> StockContent {
        StockContent {
            article_id: "c686397e4a0f4f11683d".to_string(),
            title: title.to_string(),
            author_user_id: "yaotti".to_string(),
            author_profile_image_url: "https://example.com/yaotti.png".to_string(),
            article_created_at: DateTime::from_timestamp_millis(1_514_765_482_000).unwrap(),
            tags: vec!["Rust".to_string(), "SQLite".to_string()],
        }
    }

    #[test]
    fn differs_from_detects_changed_attributes() {
        let record = StockRecord {
            id: StockId::new(1),
            account_id: AccountId::new(1),
            content: content("Example title"),
            version: 0,
            created_at: 0,
            updated_at: 0,
        };

        assert!(!record.differs_from(&content("Example title")));
        assert!(record.differs_from(&content("Renamed")));

        let mut reordered = content("Example title");
        reordered.tags.reverse();
        assert!(record.differs_from(&reordered));
    }

    #[test]
    fn validate_article_id_rejects_path_characters() {
        assert!(validate_article_id("c686397e4a0f4f11683d").is_ok());
        assert!(validate_article_id("").is_err());
        assert!(validate_article_id("../items").is_err());
        assert!(validate_article_id(&"a".repeat(65)).is_err());
    }
}
