//! Persisted seen-set state.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{PublisherError, Result};

/// Default bound on remembered identifiers.
pub const DEFAULT_MAX_SEEN: usize = 30;

/// The durable record of already-published article identifiers.
///
/// `articles_seen` is kept in publish order without duplicates. Any other
/// keys found in the stored document are carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, deserialize_with = "null_as_empty")]
    articles_seen: Vec<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PersistedState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state from identifiers in publish order.
    ///
    /// Repeated identifiers keep their first position.
    pub fn with_seen<I, S>(seen: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::new();
        for guid in seen {
            state.record(guid);
        }
        state
    }

    /// Decode a stored state document.
    ///
    /// Empty or whitespace-only input is an empty state.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        serde_json::from_slice(bytes)
            .map_err(|e| PublisherError::StateUnavailable(format!("invalid state document: {e}")))
    }

    /// Encode the state as pretty-printed JSON with four-space indentation.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| PublisherError::StateUnavailable(format!("failed to encode state: {e}")))?;
        Ok(buf)
    }

    /// Identifiers in publish order, oldest first.
    pub fn seen(&self) -> &[String] {
        &self.articles_seen
    }

    /// Number of remembered identifiers.
    pub fn len(&self) -> usize {
        self.articles_seen.len()
    }

    /// Whether nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.articles_seen.is_empty()
    }

    /// Whether an identifier was already published.
    pub fn contains(&self, guid: &str) -> bool {
        self.articles_seen.iter().any(|seen| seen == guid)
    }

    /// Record a published identifier.
    ///
    /// Returns `false` if it was already present.
    pub fn record(&mut self, guid: impl Into<String>) -> bool {
        let guid = guid.into();
        if self.contains(&guid) {
            return false;
        }
        self.articles_seen.push(guid);
        true
    }

    /// Drop the oldest identifiers so at most `max` remain.
    ///
    /// Returns the number of identifiers removed.
    pub fn prune(&mut self, max: usize) -> usize {
        let excess = self.articles_seen.len().saturating_sub(max);
        if excess > 0 {
            self.articles_seen.drain(..excess);
        }
        excess
    }

    /// Keys other than `articles_seen` found in the stored document.
    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}
