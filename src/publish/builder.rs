//! Item filtering and message rendering.

use tracing::{debug, info};

use crate::rss::{normalize_breaks, sanitize, FeedItem};
use crate::state::PersistedState;

/// Decides whether a sanitized article is excluded from publishing.
pub trait ItemFilter: Send + Sync {
    /// Returns `true` if the article should not be published.
    fn excludes(&self, title: &str, body: &str) -> bool;
}

impl<F> ItemFilter for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn excludes(&self, title: &str, body: &str) -> bool {
        self(title, body)
    }
}

/// Excludes articles whose title exactly matches one of a fixed set.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    titles: Vec<String>,
}

impl TitleFilter {
    /// Create a filter for the given titles.
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: titles.into_iter().map(Into::into).collect(),
        }
    }
}

impl ItemFilter for TitleFilter {
    fn excludes(&self, title: &str, _body: &str) -> bool {
        self.titles.iter().any(|t| t == title)
    }
}

/// An article ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCandidate {
    /// Sanitized article identifier.
    pub guid: String,
    /// Rendered markdown message.
    pub content: String,
}

/// Turns fetched feed items into publish candidates.
pub struct ContentBuilder<'a> {
    link_base_url: &'a str,
    filter: &'a dyn ItemFilter,
}

impl<'a> ContentBuilder<'a> {
    /// Create a builder linking articles under `link_base_url`.
    pub fn new(link_base_url: &'a str, filter: &'a dyn ItemFilter) -> Self {
        Self {
            link_base_url: link_base_url.trim_end_matches('/'),
            filter,
        }
    }

    /// Select unseen, unfiltered items and render them.
    ///
    /// `items` must be in chronological order (oldest first); the output
    /// keeps that order. An identifier appearing twice is only taken once.
    pub fn build<I>(&self, items: I, state: &PersistedState) -> Vec<PublishCandidate>
    where
        I: IntoIterator<Item = FeedItem>,
    {
        let mut candidates: Vec<PublishCandidate> = Vec::new();

        for item in items {
            let guid = sanitize(&item.guid);
            if state.contains(&guid) {
                debug!("Article {} has been seen already, skipping.", guid);
                continue;
            }
            if candidates.iter().any(|c| c.guid == guid) {
                debug!("Article {} appears more than once in the feed, skipping.", guid);
                continue;
            }

            let title = sanitize(&item.title);
            let body = sanitize(normalize_breaks(&item.body).trim_end());

            if self.filter.excludes(&title, &body) {
                debug!("Article {} ({}) is filtered out.", guid, title);
                continue;
            }

            if candidates.is_empty() {
                info!("New articles found:");
            }
            info!("{} Title - {}", guid, title);

            let content = self.render(&guid, &title, &body);
            candidates.push(PublishCandidate { guid, content });
        }

        candidates
    }

    /// Render one article as a markdown message.
    pub fn render(&self, guid: &str, title: &str, body: &str) -> String {
        format!(
            "**{title}** \u{2014} [Link]({}/{guid})\n```\n{body}```",
            self.link_base_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://community.elitedangerous.com/en/galnet/uid";

    fn week_in_review() -> TitleFilter {
        TitleFilter::new(["Week in Review"])
    }

    #[test]
    fn test_render_format() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);

        assert_eq!(
            builder.render("abc123", "Thargoid Sighting", "Body text"),
            "**Thargoid Sighting** \u{2014} [Link](https://community.elitedangerous.com/en/galnet/uid/abc123)\n```\nBody text```"
        );
    }

    #[test]
    fn test_trailing_slash_on_base_is_ignored() {
        let filter = week_in_review();
        let base = format!("{BASE}/");
        let builder = ContentBuilder::new(&base, &filter);
        assert!(builder.render("x", "t", "b").contains("/uid/x)"));
    }

    #[test]
    fn test_build_keeps_chronological_order() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let items = vec![
            FeedItem::new("a", "First", "one"),
            FeedItem::new("b", "Second", "two"),
            FeedItem::new("c", "Third", "three"),
        ];

        let candidates = builder.build(items, &PersistedState::new());
        let guids: Vec<&str> = candidates.iter().map(|c| c.guid.as_str()).collect();
        assert_eq!(guids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_skips_seen() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let state = PersistedState::with_seen(["a", "c"]);
        let items = vec![
            FeedItem::new("a", "First", "one"),
            FeedItem::new("b", "Second", "two"),
            FeedItem::new("c", "Third", "three"),
        ];

        let candidates = builder.build(items, &state);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].guid, "b");
    }

    #[test]
    fn test_build_skips_duplicate_guid_in_feed() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let items = vec![
            FeedItem::new("a", "First", "one"),
            FeedItem::new("a", "First again", "one"),
        ];

        assert_eq!(builder.build(items, &PersistedState::new()).len(), 1);
    }

    #[test]
    fn test_build_excludes_week_in_review() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let items = vec![
            FeedItem::new("a", "Week in Review", "anything at all"),
            FeedItem::new("b", "<b>Week in Review</b>", "markup is stripped first"),
            FeedItem::new("c", "Week in Review: Part 2", "not an exact match"),
        ];

        let candidates = builder.build(items, &PersistedState::new());
        let guids: Vec<&str> = candidates.iter().map(|c| c.guid.as_str()).collect();
        assert_eq!(guids, vec!["c"]);
    }

    #[test]
    fn test_build_with_closure_filter() {
        let filter = |_title: &str, body: &str| body.contains("classified");
        let builder = ContentBuilder::new(BASE, &filter);
        let items = vec![
            FeedItem::new("a", "Open", "public news"),
            FeedItem::new("b", "Secret", "classified report"),
        ];

        let candidates = builder.build(items, &PersistedState::new());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].guid, "a");
    }

    #[test]
    fn test_build_normalizes_breaks_and_sanitizes() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let items = vec![FeedItem::new(
            "<i>g1</i>",
            "News &amp; Views",
            "Para one.<br /><br />Para <b>two</b>.<script>x()</script>  \n<br/>",
        )];

        let candidates = builder.build(items, &PersistedState::new());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].guid, "g1");
        assert_eq!(
            candidates[0].content,
            format!("**News & Views** \u{2014} [Link]({BASE}/g1)\n```\nPara one.\n\nPara two.```")
        );
    }

    #[test]
    fn test_seen_check_uses_sanitized_guid() {
        let filter = week_in_review();
        let builder = ContentBuilder::new(BASE, &filter);
        let state = PersistedState::with_seen(["g1"]);
        let items = vec![FeedItem::new("<span>g1</span>", "Title", "Body")];

        assert!(builder.build(items, &state).is_empty());
    }
}
