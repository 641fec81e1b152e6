//! RSS types.

/// One entry of the fetched feed, as delivered by the feed source.
///
/// Fields hold the raw (unsanitized) text from the feed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Item identifier (RSS `guid`).
    pub guid: String,
    /// Item title.
    pub title: String,
    /// Item body (RSS `description`), possibly containing HTML.
    pub body: String,
}

impl FeedItem {
    /// Create a new feed item.
    pub fn new(guid: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}
