//! Feed aggregation.
//!
//! One run goes `Idle → Fetching → Normalizing → Sorting → (Translating) → Ready`:
//! every source is served from the item cache or fetched live, batches are
//! merged in registration order, stably sorted newest first, and optionally
//! annotated with translations. Per-source and per-item failures become notes
//! on the result; they never abort the run.

use std::fmt;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::rss::fetcher::FeedFetcher;
use crate::rss::item_cache::ItemCache;
use crate::rss::normalize::{normalize_item, truncate_chars};
use crate::rss::types::{CachedItem, Source};
use crate::translation::{CompletionClient, Translation, TranslationCache, Translator};
use crate::{FeedlingError, Result};

/// Prefix shown in front of text whose translation failed.
pub const TRANSLATION_FAILED_MARKER: &str = "[translation failed]";

/// Stage of an aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Normalizing,
    Sorting,
    Translating,
    Ready,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Idle => "idle",
            RunPhase::Fetching => "fetching",
            RunPhase::Normalizing => "normalizing",
            RunPhase::Sorting => "sorting",
            RunPhase::Translating => "translating",
            RunPhase::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// A source that could not be fetched during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source_name: String,
    pub url: String,
    pub reason: String,
    /// Older cached items were shown instead.
    pub served_stale: bool,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "source {} unavailable: {}",
            self.source_name, self.reason
        )?;
        if self.served_stale {
            write!(f, " (showing cached items)")?;
        }
        Ok(())
    }
}

/// An item ready for display, with optional translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    pub item: CachedItem,
    pub title_translation: Option<Translation>,
    /// Translation of the body, cut to `translation.max_body_chars`.
    pub body_translation: Option<Translation>,
}

impl DisplayItem {
    fn untranslated(item: CachedItem) -> Self {
        Self {
            item,
            title_translation: None,
            body_translation: None,
        }
    }

    /// Title to show: translated when available, marked when translation failed.
    pub fn title(&self) -> String {
        shown_text(&self.item.title, self.title_translation.as_ref())
    }

    /// Body to show, following the same rules as [`DisplayItem::title`].
    pub fn body(&self) -> String {
        shown_text(&self.item.body_text, self.body_translation.as_ref())
    }

    pub fn has_translation_failure(&self) -> bool {
        self.title_translation
            .iter()
            .chain(self.body_translation.iter())
            .any(Translation::is_failed)
    }
}

fn shown_text(original: &str, translation: Option<&Translation>) -> String {
    match translation {
        Some(Translation::Translated(text)) => text.clone(),
        Some(Translation::Failed(_)) => format!("{} {}", TRANSLATION_FAILED_MARKER, original),
        None => original.to_string(),
    }
}

/// Result of one aggregation run.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Items, newest first.
    pub items: Vec<DisplayItem>,
    /// Sources that failed, in registration order.
    pub failures: Vec<SourceFailure>,
    /// Whether translation was requested for this run.
    pub translated: bool,
}

impl Aggregation {
    /// Number of items whose title or body failed to translate.
    pub fn translation_failures(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.has_translation_failure())
            .count()
    }
}

/// Limits applied during a run.
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub max_concurrent_fetches: usize,
    pub max_content_length: usize,
    pub max_body_chars: usize,
}

impl AggregatorOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_fetches: config.rss.max_concurrent_fetches,
            max_content_length: config.rss.max_content_length,
            max_body_chars: config.translation.max_body_chars,
        }
    }
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Orchestrates fetch, cache, merge, sort and translation.
pub struct FeedAggregator<F, C> {
    fetcher: F,
    translator: Translator<C>,
    options: AggregatorOptions,
}

impl<F: FeedFetcher, C: CompletionClient> FeedAggregator<F, C> {
    pub fn new(fetcher: F, translator: Translator<C>, options: AggregatorOptions) -> Self {
        Self {
            fetcher,
            translator,
            options,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn translator(&self) -> &Translator<C> {
        &self.translator
    }

    /// Produce the ordered, optionally translated item list for `sources`.
    ///
    /// # Errors
    ///
    /// Only an empty source list is an error. Fetch, cache and translation
    /// failures are reported inside the returned [`Aggregation`].
    pub async fn run(
        &self,
        sources: &[Source],
        translation_enabled: bool,
        item_cache: &mut ItemCache,
        translation_cache: &mut TranslationCache,
    ) -> Result<Aggregation> {
        let mut phase = RunPhase::Idle;
        if sources.is_empty() {
            return Err(FeedlingError::Config("no feeds registered".to_string()));
        }

        advance(&mut phase, RunPhase::Fetching);
        item_cache.resume_writes();
        let mut batches: Vec<Option<Vec<CachedItem>>> = vec![None; sources.len()];
        let mut to_fetch = Vec::new();

        for (idx, source) in sources.iter().enumerate() {
            match item_cache.get(source) {
                Some(entry) => {
                    debug!("Using cached items for {}", source.name);
                    batches[idx] = Some(entry.items);
                }
                None => to_fetch.push((idx, source)),
            }
        }

        info!("Fetching {} of {} feed(s)", to_fetch.len(), sources.len());

        let fetched: Vec<_> = stream::iter(to_fetch)
            .map(|(idx, source)| async move { (idx, self.fetcher.fetch(source).await) })
            .buffered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        advance(&mut phase, RunPhase::Normalizing);
        let mut failures = Vec::new();

        for (idx, result) in fetched {
            let source = &sources[idx];
            match result {
                Ok(raw_items) => {
                    let items: Vec<CachedItem> = raw_items
                        .into_iter()
                        .map(|raw| normalize_item(raw, self.options.max_content_length))
                        .collect();
                    debug!("Fetched {} item(s) from {}", items.len(), source.name);

                    if let Err(e) = item_cache.put(source, items.clone()) {
                        warn!("{}", e);
                    }
                    batches[idx] = Some(items);
                }
                Err(e) => {
                    warn!("Feed '{}' unavailable: {}", source.name, e);
                    let stale = item_cache.get_stale(source);
                    let served_stale = stale.is_some();
                    batches[idx] = stale.map(|entry| entry.items);

                    failures.push(SourceFailure {
                        source_name: source.name.clone(),
                        url: source.url.clone(),
                        reason: e.to_string(),
                        served_stale,
                    });
                }
            }
        }

        advance(&mut phase, RunPhase::Sorting);
        let mut merged: Vec<CachedItem> = Vec::new();
        for (batch, source) in batches.into_iter().zip(sources) {
            for mut item in batch.into_iter().flatten() {
                // The registry name wins so renamed feeds display their new name.
                item.source_name.clone_from(&source.name);
                merged.push(item);
            }
        }
        sort_newest_first(&mut merged);

        let items = if translation_enabled {
            advance(&mut phase, RunPhase::Translating);
            self.translate(merged, translation_cache).await
        } else {
            merged.into_iter().map(DisplayItem::untranslated).collect()
        };

        advance(&mut phase, RunPhase::Ready);
        info!(
            "Aggregated {} item(s), {} failed source(s)",
            items.len(),
            failures.len()
        );

        Ok(Aggregation {
            items,
            failures,
            translated: translation_enabled,
        })
    }

    async fn translate(
        &self,
        items: Vec<CachedItem>,
        cache: &mut TranslationCache,
    ) -> Vec<DisplayItem> {
        let bodies: Vec<String> = items
            .iter()
            .map(|item| truncate_chars(&item.body_text, self.options.max_body_chars))
            .collect();

        let texts = items
            .iter()
            .map(|item| item.title.as_str())
            .chain(bodies.iter().map(String::as_str));
        let resolved = self.translator.resolve_many(cache, texts).await;

        items
            .into_iter()
            .zip(bodies)
            .map(|(item, body)| {
                let title_translation = resolved.get(&item.title).cloned();
                let body_translation = if body.is_empty() {
                    None
                } else {
                    resolved.get(&body).cloned()
                };
                DisplayItem {
                    item,
                    title_translation,
                    body_translation,
                }
            })
            .collect()
    }
}

/// Stable sort by `published_at`, newest first.
pub fn sort_newest_first(items: &mut [CachedItem]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    debug!("Aggregation {} -> {}", phase, next);
    *phase = next;
}
