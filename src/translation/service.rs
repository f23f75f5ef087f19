//! Cache-first translation.
//!
//! The cache is always consulted before the client, and texts are
//! de-duplicated before dispatch, so a text that has been translated once is
//! never sent again. Failed translations are not cached and are retried on
//! the next run.

use std::collections::{HashMap, HashSet};

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::translation::cache::TranslationCache;
use crate::translation::client::{CompletionClient, TranslationClient};

/// Outcome of translating one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Translated(String),
    /// The remote call failed; holds a human-readable reason.
    Failed(String),
}

impl Translation {
    /// Translated text, if the translation succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Translation::Translated(text) => Some(text),
            Translation::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Translation::Failed(_))
    }
}

/// Resolves texts through the translation cache, calling the client on misses.
pub struct Translator<C> {
    client: TranslationClient<C>,
    max_concurrent: usize,
}

impl<C: CompletionClient> Translator<C> {
    pub fn new(client: TranslationClient<C>, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub fn client(&self) -> &TranslationClient<C> {
        &self.client
    }

    /// Resolve a single text.
    pub async fn resolve(&self, cache: &mut TranslationCache, text: &str) -> Translation {
        let mut resolved = self.resolve_many(cache, [text]).await;
        resolved
            .remove(text)
            .unwrap_or_else(|| Translation::Failed("not resolved".to_string()))
    }

    /// Resolve a batch of texts, keyed by the input text.
    ///
    /// Blank texts resolve to themselves without a remote call. Misses are
    /// translated concurrently and written to the cache as each one completes.
    pub async fn resolve_many<'t, I>(
        &self,
        cache: &mut TranslationCache,
        texts: I,
    ) -> HashMap<String, Translation>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut resolved: HashMap<String, Translation> = HashMap::new();
        let mut pending = Vec::new();
        let mut queued: HashSet<&str> = HashSet::new();

        for text in texts {
            if resolved.contains_key(text) || queued.contains(text) {
                continue;
            }
            if text.trim().is_empty() {
                resolved.insert(text.to_string(), Translation::Translated(text.to_string()));
            } else if let Some(hit) = cache.get(text) {
                resolved.insert(text.to_string(), Translation::Translated(hit.to_string()));
            } else {
                queued.insert(text);
                pending.push(text.to_string());
            }
        }

        debug!(
            "Translation batch: {} cached, {} to translate",
            resolved.len(),
            pending.len()
        );

        let mut results = stream::iter(pending)
            .map(|text| async move {
                let result = self.client.translate_configured(&text).await;
                (text, result)
            })
            .buffer_unordered(self.max_concurrent);

        while let Some((text, result)) = results.next().await {
            let translation = match result {
                Ok(translated) => {
                    if let Err(e) = cache.put(&text, &translated) {
                        warn!("{}", e);
                    }
                    let stored = cache.get(&text).map(str::to_string).unwrap_or(translated);
                    Translation::Translated(stored)
                }
                Err(e) => {
                    warn!("Translation failed: {}", e);
                    Translation::Failed(e.to_string())
                }
            };
            resolved.insert(text, translation);
        }

        resolved
    }
}
