//! Feed registry: the ordered list of configured sources.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::rss::Source;
use crate::storage::{read_json, write_json_atomic};
use crate::{FeedlingError, Result};

/// Registered feeds, persisted as a JSON array of `{url, name}`.
#[derive(Debug)]
pub struct FeedRegistry {
    path: PathBuf,
    feeds: Vec<Source>,
}

impl FeedRegistry {
    /// Load the registry from `path`. A missing file gives an empty registry.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let feeds: Vec<Source> = read_json(&path)?.unwrap_or_default();
        Ok(Self { path, feeds })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sources in registration order.
    pub fn sources(&self) -> &[Source] {
        &self.feeds
    }

    /// Sources paired with their 1-based menu numbers.
    pub fn list(&self) -> impl Iterator<Item = (usize, &Source)> {
        self.feeds.iter().enumerate().map(|(i, feed)| (i + 1, feed))
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Register a feed.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The URL is not a valid http(s) URL
    /// - The name is empty
    /// - A feed with the same URL is already registered
    pub fn add(&mut self, url: &str, name: &str) -> Result<&Source> {
        let url = url.trim();
        let name = name.trim();
        validate_feed_url(url)?;
        if name.is_empty() {
            return Err(FeedlingError::Validation("feed name is empty".to_string()));
        }
        if self.feeds.iter().any(|feed| feed.url == url) {
            return Err(FeedlingError::Validation(format!(
                "feed already registered: {}",
                url
            )));
        }

        self.feeds.push(Source::new(url, name));
        self.save()?;
        info!("Added feed '{}' ({})", name, url);

        let index = self.feeds.len() - 1;
        Ok(&self.feeds[index])
    }

    /// Remove the feed at `index` and return it.
    pub fn remove(&mut self, index: usize) -> Result<Source> {
        if index >= self.feeds.len() {
            return Err(FeedlingError::NotFound(format!("feed #{}", index + 1)));
        }
        let removed = self.feeds.remove(index);
        self.save()?;
        info!("Removed feed '{}'", removed.name);
        Ok(removed)
    }

    /// Change the URL and/or name of the feed at `index`.
    ///
    /// `None` or blank values leave the field unchanged.
    pub fn edit(&mut self, index: usize, url: Option<&str>, name: Option<&str>) -> Result<&Source> {
        if index >= self.feeds.len() {
            return Err(FeedlingError::NotFound(format!("feed #{}", index + 1)));
        }

        let url = url.map(str::trim).filter(|u| !u.is_empty());
        let name = name.map(str::trim).filter(|n| !n.is_empty());

        if let Some(url) = url {
            validate_feed_url(url)?;
            let taken = self
                .feeds
                .iter()
                .enumerate()
                .any(|(i, feed)| i != index && feed.url == url);
            if taken {
                return Err(FeedlingError::Validation(format!(
                    "feed already registered: {}",
                    url
                )));
            }
            self.feeds[index].url = url.to_string();
        }
        if let Some(name) = name {
            self.feeds[index].name = name.to_string();
        }

        self.save()?;
        info!("Updated feed '{}'", self.feeds[index].name);
        Ok(&self.feeds[index])
    }

    fn save(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.feeds)
    }
}

fn validate_feed_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| FeedlingError::Validation(format!("invalid URL: {}", e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FeedlingError::Validation(format!(
            "unsupported URL scheme: {}",
            scheme
        ))),
    }
}
