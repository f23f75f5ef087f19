//! Persistent per-source item cache.
//!
//! One pretty-printed JSON file per source, named after the SHA-256 digest of
//! the source URL:
//! ```text
//! {cache_dir}/
//! ├── 3a7bd3e2360a3d29eea436fcfb7e44c735d117c42d1c1835420b6b9942dd4f1b.json
//! └── ...
//! ```
//! Entries are loaded lazily, written through on every `put`, and never
//! evicted. If the directory cannot be created the cache works in memory only.
//! A failed write suspends further writes until the next run; reads from disk
//! carry on.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::datetime::now_timestamp;
use crate::rss::types::{CachedItem, ItemCacheEntry, Source};
use crate::storage::{read_json, write_json_atomic};
use crate::{FeedlingError, Result};

/// Stable cache key for a source URL (lowercase hex SHA-256).
pub fn fingerprint(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}

/// Per-source item cache.
#[derive(Debug)]
pub struct ItemCache {
    dir: PathBuf,
    ttl_secs: u64,
    entries: HashMap<String, ItemCacheEntry>,
    memory_only: bool,
    writes_suspended: bool,
}

impl ItemCache {
    /// Open the cache rooted at `dir`, creating the directory if needed.
    ///
    /// Falls back to memory-only operation when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        let dir = dir.into();
        let memory_only = match fs::create_dir_all(&dir) {
            Ok(()) => false,
            Err(e) => {
                warn!(
                    "Item cache directory {} unavailable, caching in memory only: {}",
                    dir.display(),
                    e
                );
                true
            }
        };

        Self {
            dir,
            ttl_secs,
            entries: HashMap::new(),
            memory_only,
            writes_suspended: false,
        }
    }

    /// A cache that never touches the filesystem.
    pub fn in_memory(ttl_secs: u64) -> Self {
        Self {
            dir: PathBuf::new(),
            ttl_secs,
            entries: HashMap::new(),
            memory_only: true,
            writes_suspended: false,
        }
    }

    /// Whether the cache never touches the filesystem.
    pub fn is_memory_only(&self) -> bool {
        self.memory_only
    }

    /// Whether a failed write has stopped `put` from writing files.
    pub fn writes_suspended(&self) -> bool {
        self.writes_suspended
    }

    /// Allow writes again after a failure. Called at the start of each run.
    pub fn resume_writes(&mut self) {
        self.writes_suspended = false;
    }

    /// Fresh entry for `source`, if any. Never fetches.
    pub fn get(&mut self, source: &Source) -> Option<ItemCacheEntry> {
        let ttl_secs = self.ttl_secs;
        self.load(&source.url)
            .filter(|entry| !entry.is_expired(ttl_secs, now_timestamp()))
            .cloned()
    }

    /// Entry for `source` regardless of its age.
    pub fn get_stale(&mut self, source: &Source) -> Option<ItemCacheEntry> {
        self.load(&source.url).cloned()
    }

    /// Replace the entry for `source` and persist it.
    ///
    /// The in-memory entry is always updated. A failed write is returned as
    /// [`FeedlingError::CacheIo`] and suspends writes until [`resume_writes`].
    /// Existing files stay readable.
    ///
    /// [`resume_writes`]: ItemCache::resume_writes
    pub fn put(&mut self, source: &Source, items: Vec<CachedItem>) -> Result<()> {
        self.put_at(source, items, now_timestamp())
    }

    pub(crate) fn put_at(
        &mut self,
        source: &Source,
        items: Vec<CachedItem>,
        fetched_at: i64,
    ) -> Result<()> {
        let key = fingerprint(&source.url);
        let entry = ItemCacheEntry {
            source_fingerprint: key.clone(),
            items,
            fetched_at,
        };

        let result = if self.memory_only || self.writes_suspended {
            Ok(())
        } else {
            write_json_atomic(&self.entry_path(&key), &entry).map_err(|e| {
                self.writes_suspended = true;
                FeedlingError::CacheIo(format!("failed to write cache for {}: {}", source.url, e))
            })
        };

        debug!(
            "Cached {} item(s) for {} ({})",
            entry.items.len(),
            source.url,
            key
        );
        self.entries.insert(key, entry);
        result
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load(&mut self, url: &str) -> Option<&ItemCacheEntry> {
        let key = fingerprint(url);

        if !self.entries.contains_key(&key) && !self.memory_only {
            match read_json::<ItemCacheEntry>(&self.entry_path(&key)) {
                Ok(Some(entry)) => {
                    self.entries.insert(key.clone(), entry);
                }
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cache entry for {}: {}", url, e),
            }
        }

        self.entries.get(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(title: &str, published_at: i64) -> CachedItem {
        CachedItem {
            title: title.to_string(),
            body_text: format!("{title} body"),
            link: format!("https://example.com/{title}"),
            published_at,
            source_name: "Example".to_string(),
        }
    }

    fn source() -> Source {
        Source::new("https://example.com/feed.xml", "Example")
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = fingerprint("https://example.com/feed.xml");
        let b = fingerprint("https://example.com/feed.xml");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, fingerprint("https://example.com/other.xml"));
    }

    #[test]
    fn test_get_miss() {
        let dir = TempDir::new().unwrap();
        let mut cache = ItemCache::open(dir.path(), 3600);
        assert!(cache.get(&source()).is_none());
    }

    #[test]
    fn test_round_trip_across_instances() {
        let dir = TempDir::new().unwrap();
        let items = vec![item("one", 1704067200), item("two", 0)];

        let mut cache = ItemCache::open(dir.path(), 3600);
        cache.put(&source(), items.clone()).unwrap();

        let file = dir
            .path()
            .join(format!("{}.json", fingerprint(&source().url)));
        assert!(file.exists());

        let mut reopened = ItemCache::open(dir.path(), 3600);
        let entry = reopened.get(&source()).unwrap();
        assert_eq!(entry.items, items);
        assert_eq!(entry.source_fingerprint, fingerprint(&source().url));
    }

    #[test]
    fn test_survives_source_rename() {
        let dir = TempDir::new().unwrap();
        let mut cache = ItemCache::open(dir.path(), 0);
        cache.put(&source(), vec![item("one", 1)]).unwrap();

        let renamed = Source::new("https://example.com/feed.xml", "Renamed");
        assert!(cache.get(&renamed).is_some());
    }

    #[test]
    fn test_expired_entry_only_stale() {
        let dir = TempDir::new().unwrap();
        let mut cache = ItemCache::open(dir.path(), 60);
        cache
            .put_at(&source(), vec![item("old", 1)], now_timestamp() - 120)
            .unwrap();

        assert!(cache.get(&source()).is_none());
        assert_eq!(cache.get_stale(&source()).unwrap().items.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut cache = ItemCache::open(dir.path(), 3600);
        cache.put(&source(), vec![item("one", 1)]).unwrap();
        cache.put(&source(), vec![item("two", 2)]).unwrap();

        let mut reopened = ItemCache::open(dir.path(), 3600);
        let entry = reopened.get(&source()).unwrap();
        assert_eq!(entry.items, vec![item("two", 2)]);
    }

    #[test]
    fn test_corrupt_file_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let path = dir
            .path()
            .join(format!("{}.json", fingerprint(&source().url)));
        fs::write(&path, "{not json").unwrap();

        let mut cache = ItemCache::open(dir.path(), 3600);
        assert!(cache.get(&source()).is_none());
    }

    #[test]
    fn test_unusable_directory_degrades_to_memory() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file").unwrap();

        let mut cache = ItemCache::open(blocker.join("cache"), 3600);
        assert!(cache.is_memory_only());

        cache.put(&source(), vec![item("one", 1)]).unwrap();
        assert_eq!(cache.get(&source()).unwrap().items.len(), 1);
    }

    #[test]
    fn test_failed_write_keeps_reading_other_entries() {
        let dir = TempDir::new().unwrap();
        let other = Source::new("https://other.example.com/feed.xml", "Other");
        ItemCache::open(dir.path(), 0)
            .put(&other, vec![item("kept", 1)])
            .unwrap();

        // A directory in place of the temp file makes the write fail.
        let key = fingerprint(&source().url);
        fs::create_dir(dir.path().join(format!("{key}.json.tmp"))).unwrap();

        let mut cache = ItemCache::open(dir.path(), 0);
        let err = cache.put(&source(), vec![item("one", 1)]).unwrap_err();
        assert!(matches!(err, FeedlingError::CacheIo(_)));
        assert!(cache.writes_suspended());
        assert!(!cache.is_memory_only());

        assert_eq!(cache.get(&source()).unwrap().items.len(), 1);
        let entry = cache.get_stale(&other).unwrap();
        assert_eq!(entry.items, vec![item("kept", 1)]);

        cache.put(&other, vec![item("memory", 2)]).unwrap();
        let on_disk = ItemCache::open(dir.path(), 0).get(&other).unwrap();
        assert_eq!(on_disk.items, vec![item("kept", 1)]);

        cache.resume_writes();
        assert!(!cache.writes_suspended());
        cache.put(&other, vec![item("fresh", 3)]).unwrap();
        let on_disk = ItemCache::open(dir.path(), 0).get(&other).unwrap();
        assert_eq!(on_disk.items, vec![item("fresh", 3)]);
    }

    #[test]
    fn test_in_memory() {
        let mut cache = ItemCache::in_memory(3600);
        cache.put(&source(), vec![item("one", 1)]).unwrap();
        assert!(cache.get(&source()).is_some());
        assert!(cache.is_memory_only());
    }
}
