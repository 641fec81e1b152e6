//! Configuration module for the GalNet publisher.
//!
//! Configuration comes from defaults, an optional TOML file, and environment
//! variables (highest priority). It is built once per invocation and passed
//! by reference to every component.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::publish::{DeliveryPolicy, WebhookTarget};
use crate::{PublisherError, Result};

/// Feed source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL of the RSS feed to publish.
    #[serde(default)]
    pub url: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_size_bytes: u64,
    /// User agent sent with feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_request_timeout() -> u64 {
    5
}

fn default_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_user_agent() -> String {
    concat!("galnet-publisher/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_request_timeout(),
            max_size_bytes: default_max_feed_size(),
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Seen-set persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StateConfig {
    /// Store state in a local file instead of S3.
    #[serde(default)]
    pub local: bool,
    /// S3 bucket holding the state object.
    #[serde(default)]
    pub bucket: Option<String>,
    /// S3 key of the state object.
    #[serde(default)]
    pub key: Option<String>,
    /// Path of the local state file.
    #[serde(default = "default_state_path")]
    pub path: String,
    /// Maximum number of remembered article identifiers.
    #[serde(default = "default_max_seen")]
    pub max_seen: usize,
}

fn default_state_path() -> String {
    "rss_state.json".to_string()
}

fn default_max_seen() -> usize {
    30
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            local: false,
            bucket: None,
            key: None,
            path: default_state_path(),
            max_seen: default_max_seen(),
        }
    }
}

/// Webhook delivery configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Target reference: an http(s) URL or a Secrets Manager ARN.
    #[serde(default)]
    pub target: String,
    /// Total request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
    /// Delay between consecutive deliveries in milliseconds.
    #[serde(default = "default_chunk_delay")]
    pub chunk_delay_ms: u64,
    /// What to do with the rest of the batch after a failed delivery.
    #[serde(default)]
    pub policy: DeliveryPolicy,
}

fn default_chunk_delay() -> u64 {
    1000
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            timeout_secs: default_request_timeout(),
            chunk_delay_ms: default_chunk_delay(),
            policy: DeliveryPolicy::default(),
        }
    }
}

impl WebhookConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Inter-delivery delay as a duration.
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

/// Article rendering and filtering configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Base URL that article identifiers are appended to.
    #[serde(default = "default_link_base_url")]
    pub link_base_url: String,
    /// Article titles that are never published.
    #[serde(default = "default_excluded_titles")]
    pub excluded_titles: Vec<String>,
}

fn default_link_base_url() -> String {
    "https://community.elitedangerous.com/en/galnet/uid".to_string()
}

fn default_excluded_titles() -> Vec<String> {
    vec!["Week in Review".to_string()]
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            link_base_url: default_link_base_url(),
            excluded_titles: default_excluded_titles(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warning, error, critical).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, written in addition to stdout.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// AWS client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwsConfig {
    /// Region override; the SDK default chain is used when unset.
    #[serde(default)]
    pub region: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Feed configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// State configuration.
    #[serde(default)]
    pub state: StateConfig,
    /// Webhook configuration.
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Content configuration.
    #[serde(default)]
    pub content: ContentConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// AWS configuration.
    #[serde(default)]
    pub aws: AwsConfig,
}

impl Config {
    /// Build configuration from defaults and the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PublisherError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, apply environment overrides and validate.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PublisherError::Config(format!("config parse error: {e}")))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Supported keys:
    /// - `RSS_URL`, `WEBHOOK_URL`
    /// - `LOCAL_STATE`, `LOCAL_STATE_PATH`, `S3_BUCKET_NAME`, `S3_KEY_NAME`
    /// - `MAX_ARTICLES_SEEN`
    /// - `LOGGING_LEVEL`
    /// - `AWS_REGION`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RSS_URL") {
            self.feed.url = url;
        }
        if let Some(target) = lookup("WEBHOOK_URL") {
            self.webhook.target = target;
        }
        if let Some(local) = lookup("LOCAL_STATE") {
            self.state.local = parse_bool("LOCAL_STATE", &local)?;
        }
        if let Some(path) = lookup("LOCAL_STATE_PATH") {
            self.state.path = path;
        }
        if let Some(bucket) = lookup("S3_BUCKET_NAME") {
            self.state.bucket = Some(bucket);
        }
        if let Some(key) = lookup("S3_KEY_NAME") {
            self.state.key = Some(key);
        }
        if let Some(max_seen) = lookup("MAX_ARTICLES_SEEN") {
            self.state.max_seen = max_seen.trim().parse().map_err(|_| {
                PublisherError::Config(format!("MAX_ARTICLES_SEEN is not a number: '{max_seen}'"))
            })?;
        }
        if let Some(level) = lookup("LOGGING_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
        if let Some(region) = lookup("AWS_REGION") {
            if !region.is_empty() {
                self.aws.region = Some(region);
            }
        }
        Ok(())
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the feed URL is missing or not http(s)
    /// - the webhook target is missing or malformed
    /// - S3 state is selected without a bucket and key
    /// - the seen-set bound is zero
    pub fn validate(&self) -> Result<()> {
        if self.feed.url.is_empty() {
            return Err(PublisherError::Config("RSS_URL is not set".to_string()));
        }
        let feed_url = url::Url::parse(&self.feed.url)
            .map_err(|e| PublisherError::Config(format!("invalid RSS_URL: {e}")))?;
        if !matches!(feed_url.scheme(), "http" | "https") {
            return Err(PublisherError::Config(format!(
                "unsupported RSS_URL scheme: {}",
                feed_url.scheme()
            )));
        }

        if self.webhook.target.is_empty() {
            return Err(PublisherError::Config("WEBHOOK_URL is not set".to_string()));
        }
        self.webhook_target()?;

        if !self.state.local {
            let missing = |v: &Option<String>| v.as_deref().map_or(true, str::is_empty);
            if missing(&self.state.bucket) || missing(&self.state.key) {
                return Err(PublisherError::Config(
                    "S3_BUCKET_NAME and S3_KEY_NAME are required unless LOCAL_STATE is set"
                        .to_string(),
                ));
            }
        }

        if self.state.max_seen == 0 {
            return Err(PublisherError::Config(
                "MAX_ARTICLES_SEEN must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse the configured webhook target reference.
    pub fn webhook_target(&self) -> Result<WebhookTarget> {
        WebhookTarget::parse(&self.webhook.target)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PublisherError::Config(format!(
            "{key} is not a boolean: '{other}'"
        ))),
    }
}
