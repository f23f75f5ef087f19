//! Persistent translation cache.
//!
//! A single JSON object mapping sanitized source text to its translation.
//! Entries are immutable: once a text has a translation it keeps it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::storage::{read_json, write_json_atomic};
use crate::{FeedlingError, Result};

/// Write-through translation cache, loaded on first access.
#[derive(Debug)]
pub struct TranslationCache {
    path: Option<PathBuf>,
    entries: Option<BTreeMap<String, String>>,
}

impl TranslationCache {
    /// Cache persisted at `path`. Nothing is read until the first lookup.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            entries: None,
        }
    }

    /// Cache that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Some(BTreeMap::new()),
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Exact-match lookup.
    pub fn get(&mut self, text: &str) -> Option<&str> {
        self.entries().get(text).map(String::as_str)
    }

    /// Insert a translation unless `text` already has one, then flush.
    ///
    /// Returns `Ok(false)` when an existing value was kept. When the flush
    /// fails the entry stays in memory and the error is returned.
    pub fn put(&mut self, text: &str, translated: &str) -> Result<bool> {
        let entries = self.entries();
        if entries.contains_key(text) {
            return Ok(false);
        }
        entries.insert(text.to_string(), translated.to_string());
        self.flush()?;
        Ok(true)
    }

    /// Persist the full mapping.
    pub fn flush(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        let entries = self.entries();
        write_json_atomic(&path, &*entries).map_err(|e| {
            FeedlingError::CacheIo(format!(
                "failed to write translation cache {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!(
            "Flushed {} translation(s) to {}",
            entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Number of cached translations.
    pub fn len(&mut self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    fn entries(&mut self) -> &mut BTreeMap<String, String> {
        let path = &self.path;
        self.entries.get_or_insert_with(|| {
            let Some(path) = path else {
                return BTreeMap::new();
            };
            match read_json(path) {
                Ok(Some(map)) => map,
                Ok(None) => BTreeMap::new(),
                Err(e) => {
                    warn!(
                        "Translation cache {} unreadable, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            }
        })
    }
}
