//! RSS feed access.
//!
//! This module fetches and parses the source feed and sanitizes its text.

pub mod fetcher;
pub mod sanitize;
pub mod types;

pub use fetcher::{parse_feed, FeedFetcher, FeedSource};
pub use sanitize::{normalize_breaks, sanitize};
pub use types::FeedItem;
