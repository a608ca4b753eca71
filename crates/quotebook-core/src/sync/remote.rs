//! Remote quote source
//!
//! The remote speaks a small JSON-over-HTTP protocol:
//!
//! - `GET <base>?_limit=N` returns `[{ "id": 1, "title": "...", ... }, ...]`
//! - `POST <base>` accepts `{ "title", "body", "userId" }` and echoes a result
//!
//! Any non-2xx status or transport error is a `QuoteError::Transport`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{QuoteError, QuoteResult};
use crate::models::Quote;

/// Categories assigned to server quotes, indexed by `id mod len`
pub const SERVER_CATEGORIES: [&str; 5] = ["motivation", "life", "inspiration", "wisdom", "success"];

/// Request timeout for the HTTP remote
const REQUEST_TIMEOUT: u64 = 10;

/// An item as returned by the remote
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

/// Body posted when pushing a local quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

impl PushPayload {
    pub fn for_quote(quote: &Quote) -> Self {
        Self {
            title: quote.text.clone(),
            body: quote.category.clone(),
            user_id: 1,
        }
    }
}

/// A source of server quotes
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch up to `limit` items
    async fn fetch(&self, limit: usize) -> QuoteResult<Vec<RemoteItem>>;

    /// Push a local quote; the response body is opaque
    async fn push(&self, payload: &PushPayload) -> QuoteResult<Value>;
}

/// Map a remote item to a server quote
///
/// The title gets its first letter upper-cased and a trailing period unless
/// it already ends in `.`, `!` or `?`. The category is picked from
/// [`SERVER_CATEGORIES`] by id.
pub fn quote_from_remote(item: &RemoteItem) -> Quote {
    let category = SERVER_CATEGORIES[(item.id % SERVER_CATEGORIES.len() as u64) as usize];
    Quote::server(item.id, sentence_case(&item.title), category)
}

fn sentence_case(title: &str) -> String {
    let title = title.trim();
    let mut chars = title.chars();
    let mut text = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    if !text.ends_with(&['.', '!', '?'][..]) {
        text.push('.');
    }
    text
}

/// HTTP implementation of [`RemoteSource`]
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Create a remote for `base_url`
    pub fn new(base_url: impl Into<String>) -> QuoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT))
            .user_agent(concat!("quotebook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch(&self, limit: usize) -> QuoteResult<Vec<RemoteItem>> {
        debug!("Fetching {} quotes from {}", limit, self.base_url);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("_limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Transport(format!(
                "GET {} returned {}",
                self.base_url, status
            )));
        }

        Ok(response.json().await?)
    }

    async fn push(&self, payload: &PushPayload) -> QuoteResult<Value> {
        debug!("Posting quote to {}", self.base_url);
        let response = self.client.post(&self.base_url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Transport(format!(
                "POST {} returned {}",
                self.base_url, status
            )));
        }

        Ok(response.json().await.unwrap_or(Value::Null))
    }
}
