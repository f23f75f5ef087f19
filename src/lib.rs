//! feedling - a personal feed reader
//!
//! Fetches syndicated feeds, caches normalized items, and optionally
//! translates them through a chat completions service.

pub mod app;
pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod registry;
pub mod rss;
pub mod settings;
pub mod storage;
pub mod translation;

pub use app::{App, Console};
pub use config::Config;
pub use error::{FeedlingError, Result};
pub use registry::FeedRegistry;
pub use rss::{
    fingerprint, Aggregation, AggregatorOptions, CachedItem, DisplayItem, FeedAggregator,
    FeedFetcher, ItemCache, ItemCacheEntry, RawItem, RssFetcher, Source, SourceFailure,
};
pub use settings::{Settings, SettingsStore};
pub use translation::{
    CompletionClient, OpenAiCompletion, Translation, TranslationCache, TranslationClient,
    Translator,
};
