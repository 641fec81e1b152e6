//! GalNet Publisher
//!
//! Polls the GalNet RSS feed and posts every article it has not seen before
//! to a chat webhook, splitting long articles into fenced message chunks.
//! The set of already-published article identifiers is kept in a small JSON
//! document on local disk or in S3.

pub mod aws;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod publish;
pub mod rss;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use error::{PublisherError, Result};
pub use handler::{Handler, PipelineSettings, RunOutcome};
pub use publish::{paginate, DeliveryPolicy, WebhookTarget};
pub use rss::{sanitize, FeedItem};
pub use state::{PersistedState, StateStore};
