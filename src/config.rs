//! Configuration module for feedling.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{FeedlingError, Result};

/// Storage locations.
///
/// Relative paths under `data_dir` are resolved with [`StorageConfig::resolve`].
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Base directory for all persisted state.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Feed registry file.
    #[serde(default = "default_feeds_file")]
    pub feeds_file: String,
    /// Settings file.
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
    /// Directory holding one item cache file per source.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Translation cache file.
    #[serde(default = "default_translation_cache_file")]
    pub translation_cache_file: String,
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_feeds_file() -> String {
    "rss_feeds.json".to_string()
}

fn default_settings_file() -> String {
    "settings.json".to_string()
}

fn default_cache_dir() -> String {
    "rss_cache".to_string()
}

fn default_translation_cache_file() -> String {
    "translation_cache.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            feeds_file: default_feeds_file(),
            settings_file: default_settings_file(),
            cache_dir: default_cache_dir(),
            translation_cache_file: default_translation_cache_file(),
        }
    }
}

impl StorageConfig {
    /// Resolve a storage path against `data_dir`. Absolute paths are kept as is.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.data_dir).join(path)
        }
    }

    pub fn feeds_path(&self) -> PathBuf {
        self.resolve(&self.feeds_file)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.resolve(&self.settings_file)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.resolve(&self.cache_dir)
    }

    pub fn translation_cache_path(&self) -> PathBuf {
        self.resolve(&self.translation_cache_file)
    }
}

/// RSS fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RssConfig {
    /// Maximum feed size in bytes.
    #[serde(default = "default_rss_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Maximum items kept per feed.
    #[serde(default = "default_rss_max_items")]
    pub max_items_per_feed: usize,
    /// Maximum body length in characters.
    #[serde(default = "default_rss_max_content_length")]
    pub max_content_length: usize,
    /// Connection timeout in seconds.
    #[serde(default = "default_rss_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_rss_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_rss_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_rss_max_redirects")]
    pub max_redirects: usize,
    /// Age in seconds after which a cached feed is fetched again (0 = never).
    #[serde(default = "default_rss_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum number of feeds fetched at the same time.
    #[serde(default = "default_rss_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Skip the private address check on feed URLs.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_rss_max_feed_size() -> u64 {
    5 * 1024 * 1024 // 5MB
}

fn default_rss_max_items() -> usize {
    100
}

fn default_rss_max_content_length() -> usize {
    10000
}

fn default_rss_connect_timeout() -> u64 {
    10
}

fn default_rss_read_timeout() -> u64 {
    20
}

fn default_rss_total_timeout() -> u64 {
    30
}

fn default_rss_max_redirects() -> usize {
    5
}

fn default_rss_cache_ttl() -> u64 {
    3600 // 1 hour
}

fn default_rss_max_concurrent_fetches() -> usize {
    4
}

impl Default for RssConfig {
    fn default() -> Self {
        Self {
            max_feed_size_bytes: default_rss_max_feed_size(),
            max_items_per_feed: default_rss_max_items(),
            max_content_length: default_rss_max_content_length(),
            connect_timeout_secs: default_rss_connect_timeout(),
            read_timeout_secs: default_rss_read_timeout(),
            total_timeout_secs: default_rss_total_timeout(),
            max_redirects: default_rss_max_redirects(),
            cache_ttl_secs: default_rss_cache_ttl(),
            max_concurrent_fetches: default_rss_max_concurrent_fetches(),
            allow_private_hosts: false,
        }
    }
}

/// Translation service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    /// Chat completions endpoint (OpenAI compatible).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key. Usually left empty and supplied through the environment.
    #[serde(default)]
    pub api_key: String,
    /// Environment variable read for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Source language name used in the instruction.
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Target language name used in the instruction.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Custom system prompt. Empty means the built-in instruction.
    #[serde(default)]
    pub system_prompt: String,
    /// Request timeout in seconds.
    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,
    /// Maximum number of translation requests in flight.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Bodies are cut to this many characters before translation.
    #[serde(default = "default_max_body_chars")]
    pub max_body_chars: usize,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Japanese".to_string()
}

fn default_translation_timeout() -> u64 {
    60
}

fn default_max_concurrent_requests() -> usize {
    4
}

fn default_max_body_chars() -> usize {
    500
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_key: String::new(),
            api_key_env: default_api_key_env(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            system_prompt: String::new(),
            timeout_secs: default_translation_timeout(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_body_chars: default_max_body_chars(),
        }
    }
}

/// Reader (text UI) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReaderConfig {
    /// Articles per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Timezone for displaying dates (e.g., "Asia/Tokyo", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Characters of body text shown under each list entry.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

fn default_preview_chars() -> usize {
    50
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            timezone: default_timezone(),
            preview_chars: default_preview_chars(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/feedling.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Storage locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// RSS fetching.
    #[serde(default)]
    pub rss: RssConfig,
    /// Translation service.
    #[serde(default)]
    pub translation: TranslationConfig,
    /// Text reader.
    #[serde(default)]
    pub reader: ReaderConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FeedlingError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FeedlingError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FEEDLING_API_KEY`: translation API key (highest priority)
    /// - the variable named by `translation.api_key_env` (default `OPENAI_API_KEY`),
    ///   used only when no key is configured yet
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("FEEDLING_API_KEY") {
            if !key.is_empty() {
                self.translation.api_key = key;
                return;
            }
        }

        if self.translation.api_key.is_empty() && !self.translation.api_key_env.is_empty() {
            if let Ok(key) = std::env::var(&self.translation.api_key_env) {
                self.translation.api_key = key;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.reader.page_size == 0 {
            return Err(FeedlingError::Validation(
                "reader.page_size must be at least 1".to_string(),
            ));
        }
        if self.rss.max_concurrent_fetches == 0 {
            return Err(FeedlingError::Validation(
                "rss.max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        if self.translation.max_concurrent_requests == 0 {
            return Err(FeedlingError::Validation(
                "translation.max_concurrent_requests must be at least 1".to_string(),
            ));
        }
        if self.translation.model.trim().is_empty() {
            return Err(FeedlingError::Validation(
                "translation.model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
