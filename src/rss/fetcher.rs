//! RSS feed fetcher.
//!
//! Fetches and parses RSS/Atom feeds into [`RawItem`]s with URL validation
//! and resource limits.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use feed_rs::parser;
use reqwest::Client;
use tracing::debug;

use crate::config::RssConfig;
use crate::error::{FeedlingError, Result};
use crate::rss::types::{ParsedFeed, RawItem, Source, UNTITLED};

/// User agent string for feed fetching.
const USER_AGENT: &str = "feedling/0.1 (RSS Reader)";

/// Source of raw feed items.
///
/// Network, HTTP status and parse failures surface as [`FeedlingError::Fetch`];
/// a URL rejected before any request is made is a [`FeedlingError::Validation`].
pub trait FeedFetcher {
    /// Fetch the items currently published by `source`.
    fn fetch(&self, source: &Source) -> impl Future<Output = Result<Vec<RawItem>>> + Send;

    /// Look up the title a feed gives itself, used to name newly added feeds.
    fn fetch_title(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        let message = format!("no title available for {}", url);
        async move { Err(FeedlingError::Fetch(message)) }
    }
}

/// HTTP feed fetcher.
pub struct RssFetcher {
    client: Client,
    max_feed_size: u64,
    max_items: usize,
    allow_private_hosts: bool,
}

impl RssFetcher {
    /// Create a fetcher from the RSS configuration.
    pub fn new(config: &RssConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedlingError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            max_feed_size: config.max_feed_size_bytes,
            max_items: config.max_items_per_feed,
            allow_private_hosts: config.allow_private_hosts,
        })
    }

    /// Download and parse the feed at `url`.
    pub async fn fetch_parsed(&self, url: &str, source_name: &str) -> Result<ParsedFeed> {
        validate_url(url, self.allow_private_hosts)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedlingError::Fetch(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FeedlingError::Fetch(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_feed_size {
                return Err(too_large(content_length, self.max_feed_size));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedlingError::Fetch(format!("failed to read response: {}", e)))?;

        if bytes.len() as u64 > self.max_feed_size {
            return Err(too_large(bytes.len() as u64, self.max_feed_size));
        }

        let mut parsed = parse_feed(&bytes, source_name)?;
        parsed.items.truncate(self.max_items);
        debug!("Parsed {} item(s) from {}", parsed.items.len(), url);
        Ok(parsed)
    }
}

impl FeedFetcher for RssFetcher {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawItem>> {
        Ok(self.fetch_parsed(&source.url, &source.name).await?.items)
    }

    async fn fetch_title(&self, url: &str) -> Result<String> {
        Ok(self.fetch_parsed(url, "").await?.title)
    }
}

fn too_large(size: u64, max: u64) -> FeedlingError {
    FeedlingError::Fetch(format!(
        "feed too large: {} bytes (max {} bytes)",
        size, max
    ))
}

/// Validate a feed URL.
///
/// Only http and https are accepted. Unless `allow_private_hosts` is set,
/// loopback, private and local-network hosts are rejected.
pub fn validate_url(url: &str, allow_private_hosts: bool) -> Result<()> {
    let parsed = url::Url::parse(url)
        .map_err(|e| FeedlingError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FeedlingError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    let host = parsed
        .host()
        .ok_or_else(|| FeedlingError::Validation("URL has no host".to_string()))?;

    if allow_private_hosts {
        return Ok(());
    }

    let forbidden = match host {
        url::Host::Domain(domain) => is_forbidden_hostname(domain),
        url::Host::Ipv4(ipv4) => is_private_ip(&IpAddr::V4(ipv4)),
        url::Host::Ipv6(ipv6) => is_private_ip(&IpAddr::V6(ipv6)),
    };

    if forbidden {
        return Err(FeedlingError::Validation(format!(
            "private or local host not allowed: {}",
            host
        )));
    }

    Ok(())
}

fn is_forbidden_hostname(host: &str) -> bool {
    const LOCAL_SUFFIXES: [&str; 7] = [
        ".local",
        ".localhost",
        ".internal",
        ".intranet",
        ".corp",
        ".home",
        ".lan",
    ];

    let host = host.to_lowercase();
    host == "localhost" || LOCAL_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || v4.is_documentation()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                // unique local fc00::/7
                || (first & 0xfe00) == 0xfc00
                // link-local fe80::/10
                || (first & 0xffc0) == 0xfe80
        }
    }
}

/// Parse feed bytes into raw items attributed to `source_name`.
pub fn parse_feed(bytes: &[u8], source_name: &str) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)
        .map_err(|e| FeedlingError::Fetch(format!("failed to parse feed: {}", e)))?;

    let title = feed
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "Untitled Feed".to_string());

    let items = feed
        .entries
        .into_iter()
        .map(|entry| {
            let body_html = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            RawItem {
                title: entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| UNTITLED.to_string()),
                body_html,
                link: entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or_default(),
                published_at_raw: entry
                    .published
                    .or(entry.updated)
                    .map(|d| d.to_rfc2822())
                    .unwrap_or_default(),
                source_name: source_name.to_string(),
            }
        })
        .collect();

    Ok(ParsedFeed { title, items })
}
