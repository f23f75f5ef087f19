//! Feed pipeline: fetch, normalize, cache and aggregate.

pub mod aggregator;
pub mod fetcher;
pub mod item_cache;
pub mod normalize;
pub mod types;

pub use aggregator::{
    sort_newest_first, Aggregation, AggregatorOptions, DisplayItem, FeedAggregator, RunPhase,
    SourceFailure, TRANSLATION_FAILED_MARKER,
};
pub use fetcher::{parse_feed, validate_url, FeedFetcher, RssFetcher};
pub use item_cache::{fingerprint, ItemCache};
pub use normalize::{normalize_item, strip_markup, truncate_chars};
pub use types::{CachedItem, ItemCacheEntry, ParsedFeed, RawItem, Source, UNTITLED};
