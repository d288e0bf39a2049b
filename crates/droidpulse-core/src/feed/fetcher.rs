use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

use super::models::{BlogEntry, ChangeRecord};
use super::parser::{parse_blog_feed, parse_changes};
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;
const CLIENT_USER_AGENT: &str = concat!("droidpulse/", env!("CARGO_PKG_VERSION"));

/// Source of recently merged code review changes
#[async_trait::async_trait]
pub trait ChangeSource: Send + Sync {
    /// Up to `limit` most recent changes, newest first
    async fn latest_changes(&self, limit: usize) -> Result<Vec<ChangeRecord>>;
}

/// Source of recent blog entries
#[async_trait::async_trait]
pub trait BlogFeedSource: Send + Sync {
    /// Up to `limit` most recent entries, newest first
    async fn latest_entries(&self, limit: usize) -> Result<Vec<BlogEntry>>;
}

/// Shared HTTP client for both remote feeds
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Self::build_client(
            config.sources.request_timeout_secs,
            &config.sources.proxy_url,
        )?;
        Ok(Self { client })
    }

    /// Build HTTP client with optional proxy
    fn build_client(timeout_secs: u64, proxy_url: &Option<String>) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(ref proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        builder.build().map_err(Error::Http)
    }

    /// The underlying client, for collaborators that talk to other services
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url` and return the body; non-2xx responses are errors
    async fn get(&self, url: &str, accept: &'static str) -> Result<Bytes> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await?;

        ensure_success(response.status(), url)?;

        let body = response.bytes().await?;
        if body.len() > MAX_BODY_BYTES {
            return Err(Error::FeedParse(format!(
                "Response too large ({} bytes) for URL: {}",
                body.len(),
                url
            )));
        }

        Ok(body)
    }
}

fn ensure_success(status: StatusCode, url: &str) -> Result<()> {
    if !status.is_success() {
        return Err(Error::FeedParse(format!("HTTP {} for URL: {}", status, url)));
    }
    Ok(())
}

/// Merged changes from a Gerrit host
pub struct GerritSource {
    fetcher: FeedFetcher,
    base_url: String,
    query: String,
}

impl GerritSource {
    pub fn new(fetcher: FeedFetcher, config: &AppConfig) -> Self {
        Self {
            fetcher,
            base_url: config.sources.gerrit_base_url.trim_end_matches('/').to_string(),
            query: config.sources.gerrit_query.clone(),
        }
    }

    /// Query URL for the `/changes/` endpoint
    pub fn query_url(&self, limit: usize) -> Result<String> {
        let n = limit.to_string();
        let url = Url::parse_with_params(
            &format!("{}/changes/", self.base_url),
            &[("q", self.query.as_str()), ("n", n.as_str())],
        )?;
        Ok(url.into())
    }
}

#[async_trait::async_trait]
impl ChangeSource for GerritSource {
    async fn latest_changes(&self, limit: usize) -> Result<Vec<ChangeRecord>> {
        let url = self.query_url(limit)?;
        let body = self.fetcher.get(&url, "application/json").await?;
        let body = String::from_utf8_lossy(&body);

        let mut changes = parse_changes(&body, &self.base_url)?;
        changes.truncate(limit);

        tracing::info!("Fetched {} changes from {}", changes.len(), self.base_url);
        Ok(changes)
    }
}

/// Entries from an Atom/RSS blog feed
pub struct BlogSource {
    fetcher: FeedFetcher,
    feed_url: String,
}

impl BlogSource {
    pub fn new(fetcher: FeedFetcher, config: &AppConfig) -> Result<Self> {
        // Validate it's a proper URL
        Url::parse(&config.sources.blog_feed_url)?;

        Ok(Self {
            fetcher,
            feed_url: config.sources.blog_feed_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl BlogFeedSource for BlogSource {
    async fn latest_entries(&self, limit: usize) -> Result<Vec<BlogEntry>> {
        let body = self
            .fetcher
            .get(
                &self.feed_url,
                "application/atom+xml,application/rss+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .await?;

        let mut entries = parse_blog_feed(&body)?;
        entries.truncate(limit);

        tracing::info!("Fetched {} blog entries from {}", entries.len(), self.feed_url);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_success_status_is_error() {
        let url = "https://android-review.googlesource.com/changes/";
        match ensure_success(StatusCode::BAD_GATEWAY, url) {
            Err(Error::FeedParse(message)) => {
                assert!(message.contains("502"));
                assert!(message.contains(url));
            }
            other => panic!("expected feed error, got {:?}", other),
        }
        assert!(matches!(ensure_success(StatusCode::NOT_FOUND, url), Err(Error::FeedParse(_))));
        assert!(ensure_success(StatusCode::OK, url).is_ok());
    }

    #[test]
    fn test_gerrit_query_url() {
        let mut config = AppConfig::default();
        config.sources.gerrit_base_url = "https://android-review.googlesource.com/".to_string();
        let fetcher = FeedFetcher::new(&config).unwrap();
        let source = GerritSource::new(fetcher, &config);

        let url = source.query_url(10).unwrap();
        assert!(url.starts_with("https://android-review.googlesource.com/changes/?q="));
        assert!(url.contains("status%3Amerged"));
        assert!(url.ends_with("&n=10"));
    }

    #[test]
    fn test_blog_source_rejects_bad_url() {
        let mut config = AppConfig::default();
        config.sources.blog_feed_url = "not a url".to_string();
        let fetcher = FeedFetcher::new(&config).unwrap();

        assert!(matches!(BlogSource::new(fetcher, &config), Err(Error::UrlParse(_))));
    }
}
