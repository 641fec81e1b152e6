//! Invocation handler.
//!
//! One call to [`Handler::run`] is one invocation: load the seen-set, fetch
//! the feed, publish whatever is new, then prune and save the seen-set.
//! Nothing is written unless at least one article was published.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::aws;
use crate::config::Config;
use crate::publish::{
    ContentBuilder, DeliveryPolicy, ItemFilter, Publisher, SecretStore, SecretsManagerStore,
    TitleFilter, WebhookClient, WebhookSink, WebhookTarget,
};
use crate::rss::{FeedFetcher, FeedSource};
use crate::state::{self, StateStore};
use crate::Result;

/// How an invocation ended, when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed could not be fetched; state was left untouched.
    FeedUnavailable,
    /// The feed had nothing new to publish.
    NothingNew,
    /// Articles were published and state was saved.
    Published {
        /// Number of articles published.
        count: usize,
    },
}

/// Tunables for one invocation.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Bound on remembered identifiers.
    pub max_seen: usize,
    /// Delay between consecutive webhook calls.
    pub chunk_delay: Duration,
    /// Reaction to a failed delivery.
    pub policy: DeliveryPolicy,
    /// Base URL for article permalinks.
    pub link_base_url: String,
}

impl PipelineSettings {
    /// Settings taken from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_seen: config.state.max_seen,
            chunk_delay: config.webhook.chunk_delay(),
            policy: config.webhook.policy,
            link_base_url: config.content.link_base_url.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The feed-to-webhook pipeline with its collaborators.
pub struct Handler {
    settings: PipelineSettings,
    store: Arc<dyn StateStore>,
    feed: Arc<dyn FeedSource>,
    target: WebhookTarget,
    secrets: Option<Arc<dyn SecretStore>>,
    sink: Arc<dyn WebhookSink>,
    filter: Arc<dyn ItemFilter>,
}

impl Handler {
    /// Create a handler from its collaborators.
    ///
    /// The default filter excludes "Week in Review" articles.
    pub fn new(
        settings: PipelineSettings,
        store: Arc<dyn StateStore>,
        feed: Arc<dyn FeedSource>,
        target: WebhookTarget,
        sink: Arc<dyn WebhookSink>,
    ) -> Self {
        Self {
            settings,
            store,
            feed,
            target,
            secrets: None,
            sink,
            filter: Arc::new(TitleFilter::new(["Week in Review"])),
        }
    }

    /// Replace the content filter.
    pub fn with_filter(mut self, filter: Arc<dyn ItemFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Provide a secret store for ARN targets.
    pub fn with_secrets(mut self, secrets: Arc<dyn SecretStore>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Build a handler with the real backends named by `config`.
    ///
    /// AWS configuration is only loaded when S3 state or a secret target
    /// needs it.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let target = config.webhook_target()?;
        let sdk = if !config.state.local || target.needs_secret() {
            Some(aws::load_sdk_config(&config.aws).await)
        } else {
            None
        };

        let store: Arc<dyn StateStore> = Arc::from(state::from_config(&config.state, sdk.as_ref())?);
        let feed = Arc::new(FeedFetcher::new(&config.feed)?);
        let sink = Arc::new(WebhookClient::new(&config.webhook)?);
        let filter = Arc::new(TitleFilter::new(config.content.excluded_titles.clone()));

        let mut handler = Self::new(PipelineSettings::from_config(config), store, feed, target, sink)
            .with_filter(filter);
        if handler.target.needs_secret() {
            if let Some(sdk) = &sdk {
                handler = handler.with_secrets(Arc::new(SecretsManagerStore::new(sdk)));
            }
        }
        Ok(handler)
    }

    /// Run one invocation.
    ///
    /// `event` is the opaque trigger payload; it is only logged.
    pub async fn run(&self, event: &Value) -> Result<RunOutcome> {
        debug!("event = {}", event);

        let mut state = self.store.load().await?;
        info!("Last saved state loaded from {}", self.store.describe());
        debug!("Last saved state - {:?}", state.seen());

        let mut items = match self.feed.fetch().await {
            Ok(items) => items,
            Err(e) if e.is_soft() => {
                warn!("Skipping this run: {}", e);
                return Ok(RunOutcome::FeedUnavailable);
            }
            Err(e) => return Err(e),
        };
        // Feeds list newest first; publish oldest first.
        items.reverse();
        info!("RSS feed fetched and parsed successfully.");

        let builder = ContentBuilder::new(&self.settings.link_base_url, &*self.filter);
        let candidates = builder.build(items, &state);
        if candidates.is_empty() {
            info!("No new articles found to publish.");
            return Ok(RunOutcome::NothingNew);
        }

        let url = self.target.resolve(self.secrets.as_deref()).await?;

        info!("Publishing new articles...");
        let publisher = Publisher::new(&*self.sink, self.settings.chunk_delay, self.settings.policy);
        let report = publisher.publish(&url, candidates, &mut state).await;

        if report.published > 0 {
            let pruned = state.prune(self.settings.max_seen.max(1));
            if pruned > 0 {
                debug!("Pruned {} articles", pruned);
            }
            self.store.save(&state).await?;
            info!("Wrote updated save state.");
        }
        info!("Published {} new article(s).", report.published);

        let published = report.published;
        match report.into_first_failure() {
            Some(failure) => Err(failure.error),
            None => Ok(RunOutcome::Published { count: published }),
        }
    }
}
