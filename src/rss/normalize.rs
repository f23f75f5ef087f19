//! Item normalization: markup stripping and date parsing.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::datetime::{parse_feed_date_or_default, UNKNOWN_PUBLISHED_AT};
use crate::rss::types::{CachedItem, RawItem, UNTITLED};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Stand-in for a literal `<` in plain text.
pub const LITERAL_LT: char = '\u{2039}';
/// Stand-in for a literal `>` in plain text.
pub const LITERAL_GT: char = '\u{203A}';

/// Strip markup from text.
///
/// Removes `<...>` tags, decodes common HTML entities and collapses whitespace.
/// The result never contains `<` or `>`: stray brackets and escaped ones
/// (`&lt;`, `&#62;`) come out as `‹` and `›`, so `1 &lt; 2` stays readable.
pub fn strip_markup(html: &str) -> String {
    let without_tags = TAG_PATTERN.replace_all(html, " ");
    let without_brackets: String = without_tags.chars().map(literal_bracket).collect();
    let decoded = decode_entities(&without_brackets);

    decoded.split_whitespace().collect::<Vec<&str>>().join(" ")
}

fn literal_bracket(c: char) -> char {
    match c {
        '<' => LITERAL_LT,
        '>' => LITERAL_GT,
        c => c,
    }
}

/// Decode named and numeric HTML entities.
fn decode_entities(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        result.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        // Entities are short; anything longer is a bare ampersand.
        let end = after
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i);

        match end.and_then(|end| decode_entity(&after[..end]).map(|c| (end, c))) {
            Some((end, decoded)) => {
                result.push(decoded);
                rest = &after[end + 1..];
            }
            None => {
                result.push('&');
                rest = after;
            }
        }
    }

    result.push_str(rest);
    result
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some(LITERAL_LT),
        "gt" => Some(LITERAL_GT),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" => Some(' '),
        _ => parse_numeric_entity(entity)
            .and_then(char::from_u32)
            .map(literal_bracket),
    }
}

/// Parse a numeric HTML entity (e.g., "#123" or "#x7B").
fn parse_numeric_entity(entity: &str) -> Option<u32> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()
    } else {
        None
    }
}

/// Truncate text to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Normalize a raw item.
///
/// Unparsable dates become epoch 0, which sorts the item last.
pub fn normalize_item(raw: RawItem, max_content_length: usize) -> CachedItem {
    let title = strip_markup(&raw.title);
    let title = if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    };

    let body_text = truncate_chars(&strip_markup(&raw.body_html), max_content_length);

    let published_at = parse_feed_date_or_default(&raw.published_at_raw);
    if published_at == UNKNOWN_PUBLISHED_AT {
        debug!(
            "Unparsable date '{}' for '{}', sorting last",
            raw.published_at_raw, title
        );
    }

    CachedItem {
        title,
        body_text,
        link: raw.link.trim().to_string(),
        published_at,
        source_name: raw.source_name,
    }
}
