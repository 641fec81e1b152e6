//! Test doubles for the pipeline's external collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::publish::{SecretStore, WebhookSink};
use crate::rss::{FeedItem, FeedSource};
use crate::state::{PersistedState, StateStore};
use crate::{PublisherError, Result};

/// Feed source returning a fixed item list, or failing.
pub struct StaticFeed {
    items: Option<Vec<FeedItem>>,
    error: Mutex<Option<PublisherError>>,
}

impl StaticFeed {
    pub fn new(items: Vec<FeedItem>) -> Self {
        Self {
            items: Some(items),
            error: Mutex::new(None),
        }
    }

    /// Fail with a feed fetch error.
    pub fn failing() -> Self {
        Self::failing_with(PublisherError::FeedFetch(
            "unexpected status code: 503".to_string(),
        ))
    }

    /// Fail once with `error`.
    pub fn failing_with(error: PublisherError) -> Self {
        Self {
            items: None,
            error: Mutex::new(Some(error)),
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        if let Some(error) = self.error.lock().unwrap().take() {
            return Err(error);
        }
        self.items
            .clone()
            .ok_or_else(|| PublisherError::FeedFetch("feed already failed".to_string()))
    }
}

/// In-memory state store that counts saves.
#[derive(Default)]
pub struct MemoryStateStore {
    stored: Mutex<Option<PersistedState>>,
    saves: AtomicUsize,
    fail_load: bool,
    fail_save: bool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            stored: Mutex::new(Some(state)),
            ..Self::default()
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::default()
        }
    }

    pub fn failing_save() -> Self {
        Self {
            fail_save: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Option<PersistedState> {
        self.stored.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> Result<PersistedState> {
        if self.fail_load {
            return Err(PublisherError::StateUnavailable("access denied".to_string()));
        }
        Ok(self.stored().unwrap_or_default())
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        if self.fail_save {
            return Err(PublisherError::StateUnavailable("access denied".to_string()));
        }
        *self.stored.lock().unwrap() = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Webhook sink recording every delivered message.
#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(String, String)>>,
    attempts: AtomicUsize,
    fail_on: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th call (1-based).
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on: Some(n),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Vec<String> {
        let delivered = self.delivered.lock().unwrap();
        delivered.iter().map(|(_, content)| content.clone()).collect()
    }

    pub fn urls(&self) -> Vec<String> {
        let delivered = self.delivered.lock().unwrap();
        delivered.iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn deliver(&self, url: &str, content: &str) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(PublisherError::Delivery("connection reset".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((url.to_string(), content.to_string()));
        Ok(())
    }
}

/// Secret store backed by a fixed map, recording lookups.
pub struct StaticSecrets {
    values: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl StaticSecrets {
    pub fn new<const N: usize>(values: [(&str, &str); N]) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for StaticSecrets {
    async fn secret_string(&self, reference: &str) -> Result<String> {
        self.lookups.lock().unwrap().push(reference.to_string());
        self.values
            .get(reference)
            .cloned()
            .ok_or_else(|| PublisherError::Resolution(format!("secret not found: {reference}")))
    }
}
