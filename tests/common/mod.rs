//! Test helpers for aggregation and reader scenarios.
//!
//! Provides a scripted feed fetcher and a counting completion client so runs
//! can be checked without network access.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};

use feedling::config::TranslationConfig;
use feedling::rss::{fingerprint, AggregatorOptions, FeedAggregator, FeedFetcher};
use feedling::translation::{CompletionClient, TranslationClient, Translator};
use feedling::{CachedItem, FeedlingError, ItemCacheEntry, RawItem, Result, Source};

/// What the stub fetcher returns for a URL.
#[derive(Debug, Clone)]
pub enum Outcome {
    Items(Vec<RawItem>),
    Fail(String),
}

/// Feed fetcher answering from a URL table and counting requests.
#[derive(Default)]
pub struct StubFetcher {
    outcomes: Mutex<HashMap<String, Outcome>>,
    titles: Mutex<HashMap<String, String>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(self, url: &str, items: Vec<RawItem>) -> Self {
        self.set(url, Outcome::Items(items));
        self
    }

    pub fn with_failure(self, url: &str, reason: &str) -> Self {
        self.set(url, Outcome::Fail(reason.to_string()));
        self
    }

    pub fn with_title(self, url: &str, title: &str) -> Self {
        self.titles
            .lock()
            .unwrap()
            .insert(url.to_string(), title.to_string());
        self
    }

    /// Replace the outcome for `url`.
    pub fn set(&self, url: &str, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(url.to_string(), outcome);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

impl FeedFetcher for StubFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawItem>> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(source.url.clone())
            .or_insert(0) += 1;

        let outcome = self.outcomes.lock().unwrap().get(&source.url).cloned();
        match outcome {
            Some(Outcome::Items(items)) => Ok(items),
            Some(Outcome::Fail(reason)) => Err(FeedlingError::Fetch(reason)),
            None => Err(FeedlingError::Fetch(format!("no route to {}", source.url))),
        }
    }

    async fn fetch_title(&self, url: &str) -> Result<String> {
        let title = self.titles.lock().unwrap().get(url).cloned();
        title.ok_or_else(|| FeedlingError::Fetch(format!("no title for {}", url)))
    }
}

/// Completion client that prefixes every prompt and counts calls per prompt.
#[derive(Default)]
pub struct CountingCompletion {
    calls: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
}

impl CountingCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make calls for `prompt` fail until [`CountingCompletion::recover`].
    pub fn fail_on(&self, prompt: &str) {
        self.failing.lock().unwrap().insert(prompt.to_string());
    }

    pub fn recover(&self, prompt: &str) {
        self.failing.lock().unwrap().remove(prompt);
    }

    pub fn calls_for(&self, prompt: &str) -> usize {
        self.calls.lock().unwrap().get(prompt).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl CompletionClient for CountingCompletion {
    async fn complete(&self, _system: &str, prompt: &str) -> Result<String> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(prompt.to_string())
            .or_insert(0) += 1;

        if self.failing.lock().unwrap().contains(prompt) {
            return Err(FeedlingError::RemoteService(
                "rate limit or quota exceeded: 429 Too Many Requests".to_string(),
            ));
        }
        Ok(format!("JA:{prompt}"))
    }
}

/// Aggregator over the stub collaborators with default options.
pub fn aggregator(fetcher: StubFetcher) -> FeedAggregator<StubFetcher, CountingCompletion> {
    let client = TranslationClient::new(CountingCompletion::new(), &TranslationConfig::default());
    FeedAggregator::new(
        fetcher,
        Translator::new(client, 4),
        AggregatorOptions::default(),
    )
}

/// Completion stub behind an aggregator.
pub fn completion(
    aggregator: &FeedAggregator<StubFetcher, CountingCompletion>,
) -> &CountingCompletion {
    aggregator.translator().client().completion()
}

/// RFC 2822 date for midnight UTC on the given day of January 2024.
pub fn jan(day: u32) -> String {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .unwrap()
        .to_rfc2822()
}

/// Unix seconds for midnight UTC on the given day of January 2024.
pub fn jan_ts(day: u32) -> i64 {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0)
        .unwrap()
        .timestamp()
}

pub fn raw(title: &str, source_name: &str, day: u32) -> RawItem {
    RawItem::new(title, source_name)
        .with_body(format!("<p>Body of {title}</p>"))
        .with_link(format!("https://example.com/{}", title.replace(' ', "-")))
        .with_published(jan(day))
}

pub fn titles(items: &[feedling::DisplayItem]) -> Vec<&str> {
    items.iter().map(|shown| shown.item.title.as_str()).collect()
}

/// Write an item cache entry for `url` as if it had been fetched at `fetched_at`.
pub fn seed_item_cache(dir: &Path, url: &str, items: Vec<CachedItem>, fetched_at: i64) {
    let entry = ItemCacheEntry {
        source_fingerprint: fingerprint(url),
        items,
        fetched_at,
    };
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}.json", fingerprint(url)));
    std::fs::write(path, serde_json::to_string_pretty(&entry).unwrap()).unwrap();
}
