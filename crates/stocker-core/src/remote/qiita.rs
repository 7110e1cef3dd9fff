//! Qiita API v2 client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{
    ArticleDetail, RemoteArticle, RemoteError, RemoteResult, RemoteStockPage, RemoteStockSource,
    RemoteStockSummary,
};
use crate::models::RemoteCredential;

const TOTAL_COUNT_HEADER: &str = "total-count";
const MAX_ERROR_BODY_CHARS: usize = 180;

#[derive(Clone)]
pub struct QiitaClient {
    base_url: String,
    client: reqwest::Client,
}

impl QiitaClient {
    /// `base_url` is the API root, e.g. `https://qiita.com/api/v2`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RemoteResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    async fn get(&self, url: &str, credential: &RemoteCredential) -> RemoteResult<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&credential.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        Ok(response)
    }
}

impl RemoteStockSource for QiitaClient {
    async fn fetch_page(
        &self,
        credential: &RemoteCredential,
        page: u32,
        per_page: u32,
    ) -> RemoteResult<RemoteStockPage> {
        let url = format!(
            "{}/users/{}/stocks?page={page}&per_page={per_page}",
            self.base_url,
            urlencoding::encode(&credential.user_name)
        );
        tracing::debug!("Fetching stock page {page} for {}", credential.user_name);

        let response = self.get(&url, credential).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api(parse_api_error(status, &body)));
        }

        let total_count = parse_total_count(response.headers())?;
        let items = response.json::<Vec<ItemPayload>>().await?;

        Ok(RemoteStockPage {
            stocks: items.into_iter().map(ItemPayload::into_summary).collect(),
            total_count,
        })
    }

    async fn fetch_article(
        &self,
        credential: &RemoteCredential,
        article_id: &str,
    ) -> RemoteResult<RemoteArticle> {
        let url = format!(
            "{}/items/{}",
            self.base_url,
            urlencoding::encode(article_id)
        );

        let response = self.get(&url, credential).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(article_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api(parse_api_error(status, &body)));
        }

        response.json::<ItemPayload>().await?.into_article()
    }
}

#[derive(Debug, Deserialize)]
struct ItemPayload {
    id: String,
    title: String,
    created_at: DateTime<Utc>,
    user: Option<UserPayload>,
    tags: Option<Vec<TagPayload>>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    profile_image_url: String,
}

#[derive(Debug, Deserialize)]
struct TagPayload {
    name: String,
}

impl ItemPayload {
    fn detail(user: Option<UserPayload>, tags: Option<Vec<TagPayload>>) -> Option<ArticleDetail> {
        let (user, tags) = (user?, tags?);
        Some(ArticleDetail {
            author_user_id: user.id,
            author_profile_image_url: user.profile_image_url,
            tags: tags.into_iter().map(|tag| tag.name).collect(),
        })
    }

    fn into_summary(self) -> RemoteStockSummary {
        RemoteStockSummary {
            article_id: self.id,
            title: self.title,
            article_created_at: self.created_at,
            detail: Self::detail(self.user, self.tags),
        }
    }

    fn into_article(self) -> RemoteResult<RemoteArticle> {
        let detail = Self::detail(self.user, self.tags).ok_or_else(|| {
            RemoteError::InvalidPayload(format!("item {} is missing user or tags", self.id))
        })?;
        Ok(RemoteArticle {
            article_id: self.id,
            title: self.title,
            article_created_at: self.created_at,
            detail,
        })
    }
}

fn parse_total_count(headers: &HeaderMap) -> RemoteResult<u64> {
    let value = headers.get(TOTAL_COUNT_HEADER).ok_or_else(|| {
        RemoteError::InvalidPayload("response did not include Total-Count".to_string())
    })?;

    value
        .to_str()
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .ok_or_else(|| RemoteError::InvalidPayload("Total-Count is not an integer".to_string()))
}

#[derive(Debug, Deserialize)]
struct QiitaErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<QiitaErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.kind) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect::<String>();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> RemoteResult<String> {
    if raw.trim().is_empty() {
        return Err(RemoteError::InvalidConfiguration("base URL must not be empty".to_string()));
    }
    http_base_url(&raw).ok_or_else(|| {
        RemoteError::InvalidConfiguration("base URL must include http:// or https://".to_string())
    })
}

/// `raw` trimmed of whitespace and trailing slashes, if it is an absolute http(s) URL.
pub(crate) fn http_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;

    use super::*;

    const ITEM_JSON: &str = r#"{
        "id": "c686397e4a0f4f11683d",
        "title": "Example title",
        "created_at": "2000-01-01T00:00:00+09:00",
        "likes_count": 100,
        "tags": [{"name": "Ruby", "versions": ["0.0.1"]}, {"name": "Rails", "versions": []}],
        "user": {"id": "qiita", "profile_image_url": "https://example.com/qiita.png"}
    }"#;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("qiita.com/api/v2".to_string()).is_err());
        assert_eq!(
            normalize_base_url(" https://qiita.com/api/v2/ ".to_string()).unwrap(),
            "https://qiita.com/api/v2"
        );
    }

    #[test]
    fn http_base_url_requires_http_scheme_and_host() {
        assert_eq!(
            http_base_url("http://localhost:8080//").as_deref(),
            Some("http://localhost:8080")
        );
        assert_eq!(http_base_url("ftp://example.com"), None);
        assert_eq!(http_base_url("https://"), None);
        assert_eq!(http_base_url("example.com"), None);
    }

    #[test]
    fn item_payload_becomes_full_article() {
        let payload: ItemPayload = serde_json::from_str(ITEM_JSON).unwrap();
        let article = payload.into_article().unwrap();

        assert_eq!(article.article_id, "c686397e4a0f4f11683d");
        assert_eq!(article.detail.tags, vec!["Ruby", "Rails"]);
        assert_eq!(article.detail.author_user_id, "qiita");
        assert_eq!(
            article.article_created_at,
            "1999-12-31T15:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn summary_without_tags_has_no_detail() {
        let payload: ItemPayload = serde_json::from_str(
            r#"{"id": "abc", "title": "t", "created_at": "2018-01-01T00:11:22Z",
                "user": {"id": "u", "profile_image_url": "https://example.com/u.png"}}"#,
        )
        .unwrap();

        assert_eq!(payload.into_summary().detail, None);
    }

    #[test]
    fn article_without_user_is_invalid() {
        let payload: ItemPayload = serde_json::from_str(
            r#"{"id": "abc", "title": "t", "created_at": "2018-01-01T00:11:22Z", "tags": []}"#,
        )
        .unwrap();

        assert!(matches!(
            payload.into_article(),
            Err(RemoteError::InvalidPayload(_))
        ));
    }

    #[test]
    fn total_count_header_is_required() {
        let mut headers = HeaderMap::new();
        assert!(parse_total_count(&headers).is_err());

        headers.insert("Total-Count", HeaderValue::from_static("45"));
        assert_eq!(parse_total_count(&headers).unwrap(), 45);

        headers.insert("Total-Count", HeaderValue::from_static("many"));
        assert!(parse_total_count(&headers).is_err());
    }

    #[test]
    fn api_error_prefers_message_field() {
        let message = parse_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message": "Unauthorized", "type": "unauthorized"}"#,
        );
        assert_eq!(message, "Unauthorized (401)");
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "  "),
            "HTTP 502"
        );
    }
}
