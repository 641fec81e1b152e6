//! Error types for the GalNet publisher.

use thiserror::Error;

/// Common error type for the publisher.
#[derive(Error, Debug)]
pub enum PublisherError {
    /// The feed could not be fetched or parsed.
    ///
    /// This is a soft failure: the invocation ends cleanly without touching state.
    #[error("feed fetch failure: {0}")]
    FeedFetch(String),

    /// The state backend failed for a reason other than "not found".
    #[error("state unavailable: {0}")]
    StateUnavailable(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The webhook target reference could not be resolved.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// An outbound webhook call failed.
    #[error("delivery failure: {0}")]
    Delivery(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublisherError {
    /// Whether the invocation may end cleanly after this error.
    pub fn is_soft(&self) -> bool {
        matches!(self, PublisherError::FeedFetch(_))
    }
}

/// Result type alias for publisher operations.
pub type Result<T> = std::result::Result<T, PublisherError>;
