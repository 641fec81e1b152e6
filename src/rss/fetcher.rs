//! RSS feed fetcher.
//!
//! Fetches the configured feed over HTTP and parses it with feed-rs into
//! [`FeedItem`]s, preserving document order (newest first).

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::FeedConfig;
use crate::error::{PublisherError, Result};
use crate::rss::types::FeedItem;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Source of feed items.
///
/// Implementations return items in document order, which for RSS is
/// newest first.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed.
    ///
    /// Any failure is reported as [`PublisherError::FeedFetch`].
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
}

/// HTTP feed fetcher.
pub struct FeedFetcher {
    client: Client,
    url: String,
    max_size: u64,
}

impl FeedFetcher {
    /// Create a new fetcher for the configured feed.
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| PublisherError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            max_size: config.max_size_bytes,
        })
    }

    /// The feed URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        debug!("Fetching feed from {}", self.url());

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PublisherError::FeedFetch(format!("failed to fetch feed: {e}")))?;

        if response.status() != StatusCode::OK {
            return Err(PublisherError::FeedFetch(format!(
                "unexpected status code: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(PublisherError::FeedFetch(format!(
                    "feed too large: {} bytes (max {} bytes)",
                    content_length, self.max_size
                )));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PublisherError::FeedFetch(format!("failed to read response: {e}")))?;

        if bytes.len() as u64 > self.max_size {
            return Err(PublisherError::FeedFetch(format!(
                "feed too large: {} bytes (max {} bytes)",
                bytes.len(),
                self.max_size
            )));
        }

        parse_feed(&bytes)
    }
}

/// Parse feed bytes into items, keeping document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)
        .map_err(|e| PublisherError::FeedFetch(format!("failed to parse feed: {e}")))?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let body = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();
            FeedItem {
                guid: entry.id,
                title,
                body,
            }
        })
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_rss() {
        let rss = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>GalNet News</title>
    <link>https://community.elitedangerous.com/galnet</link>
    <description>Galactic news</description>
    <item>
      <title>Newest Article</title>
      <guid>uid-3</guid>
      <description>Third</description>
    </item>
    <item>
      <title>Middle Article</title>
      <guid>uid-2</guid>
      <description>Second</description>
    </item>
    <item>
      <title>Oldest Article</title>
      <guid>uid-1</guid>
      <description>First</description>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(rss.as_bytes()).unwrap();
        let guids: Vec<&str> = items.iter().map(|i| i.guid.as_str()).collect();
        assert_eq!(guids, vec!["uid-3", "uid-2", "uid-1"]);
        assert_eq!(items[0].title, "Newest Article");
        assert_eq!(items[2].body, "First");
    }

    #[test]
    fn test_parse_feed_keeps_markup_for_sanitizer() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <title>GalNet News</title>
    <item>
      <title>Article</title>
      <guid>uid-1</guid>
      <description>Line one&lt;br /&gt;Line two</description>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].body.contains("Line one"));
        assert!(items[0].body.contains("Line two"));
    }

    #[test]
    fn test_parse_feed_minimal() {
        let rss = r#"<?xml version="1.0"?>
<rss version="2.0">
  <channel>
    <item>
      <guid>1</guid>
    </item>
  </channel>
</rss>"#;

        let items = parse_feed(rss.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "1");
        assert_eq!(items[0].title, "");
        assert_eq!(items[0].body, "");
    }

    #[test]
    fn test_parse_feed_invalid() {
        let result = parse_feed(b"This is not XML");
        assert!(matches!(result, Err(PublisherError::FeedFetch(_))));
    }

    #[test]
    fn test_fetcher_new() {
        let config = FeedConfig {
            url: "https://example.com/feed.xml".to_string(),
            ..FeedConfig::default()
        };
        let fetcher = FeedFetcher::new(&config).unwrap();
        assert_eq!(fetcher.url(), "https://example.com/feed.xml");
    }
}
