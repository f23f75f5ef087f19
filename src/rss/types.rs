//! RSS types for feedling.

use serde::{Deserialize, Serialize};

/// Title used when an entry has none.
pub const UNTITLED: &str = "Untitled";

/// A configured feed endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Feed URL.
    pub url: String,
    /// Display name.
    pub name: String,
}

impl Source {
    /// Create a new source.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// One fetched entry before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawItem {
    pub title: String,
    /// Body as delivered by the feed, possibly containing HTML.
    pub body_html: String,
    pub link: String,
    /// Date string as published (RFC 2822 style), empty when absent.
    pub published_at_raw: String,
    pub source_name: String,
}

impl RawItem {
    /// Create a raw item with a title and the name of its source.
    pub fn new(title: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn with_body(mut self, body_html: impl Into<String>) -> Self {
        self.body_html = body_html.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_published(mut self, published_at_raw: impl Into<String>) -> Self {
        self.published_at_raw = published_at_raw.into();
        self
    }
}

/// Normalized item, as stored in the item cache.
///
/// `title` and `body_text` never contain markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedItem {
    pub title: String,
    pub body_text: String,
    pub link: String,
    /// Unix seconds; 0 when the feed date could not be parsed.
    pub published_at: i64,
    pub source_name: String,
}

/// Item batch persisted per source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCacheEntry {
    /// SHA-256 hex digest of the source URL.
    pub source_fingerprint: String,
    pub items: Vec<CachedItem>,
    /// Unix seconds of the fetch that produced `items`.
    pub fetched_at: i64,
}

impl ItemCacheEntry {
    /// Whether the entry is older than `ttl_secs` at time `now`.
    ///
    /// A TTL of zero means entries never expire.
    pub fn is_expired(&self, ttl_secs: u64, now: i64) -> bool {
        if ttl_secs == 0 {
            return false;
        }
        let ttl_secs = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
        now.saturating_sub(self.fetched_at) >= ttl_secs
    }
}

/// A parsed feed: its title plus its raw items.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub items: Vec<RawItem>,
}
