//! Article list paging and rendering.

use std::ops::Range;

use crate::app::menu::on_off;
use crate::datetime::format_timestamp_default;
use crate::rss::{truncate_chars, Aggregation, DisplayItem, SourceFailure};

/// Width of the wrapped article body.
const WRAP_WIDTH: usize = 70;

/// Reader input on the article list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    Next,
    Previous,
    Back,
    /// Open the article with this 1-based number.
    Open(usize),
    Invalid(String),
}

impl ReaderCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "n" => ReaderCommand::Next,
            "p" => ReaderCommand::Previous,
            "q" => ReaderCommand::Back,
            other => match other.parse::<usize>() {
                Ok(number) => ReaderCommand::Open(number),
                Err(_) => ReaderCommand::Invalid(other.to_string()),
            },
        }
    }
}

/// Page position over a list of `total` items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    page_size: usize,
    page: usize,
}

impl Pager {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
            page: 0,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Current page, 1-based.
    pub fn page_number(&self) -> usize {
        self.page + 1
    }

    /// Number of pages; an empty list still has one page.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Indices of the items on the current page.
    pub fn range(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Move to the next page. Returns false on the last page.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous page. Returns false on the first page.
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Index for a 1-based article number, if it exists.
    pub fn index_for(&self, number: usize) -> Option<usize> {
        (1..=self.total).contains(&number).then(|| number - 1)
    }
}

/// Render per-source failure notes, one per line.
pub fn render_failures(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("! {}\n", failure))
        .collect()
}

/// Render the current page of the article list.
pub fn render_list_page(
    aggregation: &Aggregation,
    pager: &Pager,
    timezone: &str,
    preview_chars: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&render_failures(&aggregation.failures));
    out.push_str(&format!(
        "\n=== Articles (page {}/{}) - translation {} ===\n",
        pager.page_number(),
        pager.total_pages(),
        on_off(aggregation.translated)
    ));

    if aggregation.items.is_empty() {
        out.push_str("No articles.\n");
    }

    for index in pager.range() {
        let shown = &aggregation.items[index];
        out.push_str(&format!(
            "{:>3}: [{}] {}  {}\n",
            index + 1,
            shown.item.source_name,
            shown.title(),
            format_timestamp_default(shown.item.published_at, timezone)
        ));

        let body = shown.body();
        if !body.is_empty() {
            out.push_str(&format!(
                "     {}...\n",
                truncate_chars(&body, preview_chars)
            ));
        }
    }

    let failed = aggregation.translation_failures();
    if failed > 0 {
        out.push_str(&format!(
            "({} article(s) could not be translated)\n",
            failed
        ));
    }

    out.push_str(&format!(
        "\nPage {} / {}\n",
        pager.page_number(),
        pager.total_pages()
    ));
    out.push_str("Commands: n(next) p(previous) q(back) number(details)\n");
    out
}

/// Render the detail view of one article.
pub fn render_detail(shown: &DisplayItem, timezone: &str, max_body_chars: usize) -> String {
    let item = &shown.item;
    let body = truncate_chars(&item.body_text, max_body_chars);

    let mut out = String::from("\n=== Article ===\n");
    match &shown.title_translation {
        Some(_) => {
            out.push_str(&format!("Title (original): {}\n", item.title));
            out.push_str(&format!("Title (translated): {}\n", shown.title()));
        }
        None => out.push_str(&format!("Title: {}\n", item.title)),
    }
    out.push_str(&format!("Feed: {}\n", item.source_name));
    out.push_str(&format!(
        "Published: {}\n",
        format_timestamp_default(item.published_at, timezone)
    ));
    out.push_str(&format!("URL: {}\n", item.link));

    match &shown.body_translation {
        Some(_) => {
            out.push_str("\nContent (original):\n");
            out.push_str(&wrap(&body, WRAP_WIDTH));
            out.push_str("\nContent (translated):\n");
            out.push_str(&wrap(&shown.body(), WRAP_WIDTH));
        }
        None => {
            out.push_str("\nContent:\n");
            out.push_str(&wrap(&body, WRAP_WIDTH));
        }
    }

    out.push_str("\nCommands: b(back)\n");
    out
}

/// Greedy word wrap at `width` characters.
fn wrap(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + word_len + 1 > width {
            out.push_str(&current);
            out.push('\n');
            current.clear();
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        out.push_str(&current);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rss::CachedItem;
    use crate::translation::Translation;

    fn shown(title: &str, body: &str) -> DisplayItem {
        DisplayItem {
            item: CachedItem {
                title: title.to_string(),
                body_text: body.to_string(),
                link: "https://example.com/a".to_string(),
                published_at: 1_704_067_200,
                source_name: "Example".to_string(),
            },
            title_translation: None,
            body_translation: None,
        }
    }

    #[test]
    fn test_pager_bounds() {
        let mut pager = Pager::new(45, 20);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.range(), 0..20);
        assert!(!pager.previous());

        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.range(), 40..45);
        assert!(!pager.next());
        assert_eq!(pager.page_number(), 3);

        assert!(pager.previous());
        assert_eq!(pager.range(), 20..40);
    }

    #[test]
    fn test_pager_empty_and_exact() {
        let pager = Pager::new(0, 20);
        assert_eq!(pager.total_pages(), 1);
        assert!(pager.range().is_empty());
        assert!(!pager.has_next());

        assert_eq!(Pager::new(40, 20).total_pages(), 2);
        assert_eq!(Pager::new(5, 0).total_pages(), 5);
    }

    #[test]
    fn test_pager_index_for() {
        let pager = Pager::new(3, 20);
        assert_eq!(pager.index_for(1), Some(0));
        assert_eq!(pager.index_for(3), Some(2));
        assert_eq!(pager.index_for(0), None);
        assert_eq!(pager.index_for(4), None);
    }

    #[test]
    fn test_reader_command_parse() {
        assert_eq!(ReaderCommand::parse("N"), ReaderCommand::Next);
        assert_eq!(ReaderCommand::parse("p"), ReaderCommand::Previous);
        assert_eq!(ReaderCommand::parse("q"), ReaderCommand::Back);
        assert_eq!(ReaderCommand::parse(" 12 "), ReaderCommand::Open(12));
        assert!(matches!(
            ReaderCommand::parse("x"),
            ReaderCommand::Invalid(_)
        ));
    }

    #[test]
    fn test_render_list_page() {
        let aggregation = Aggregation {
            items: vec![shown("Hello world", "Some body text here")],
            failures: vec![SourceFailure {
                source_name: "Broken".to_string(),
                url: "https://broken.example.com/feed".to_string(),
                reason: "fetch error: timeout".to_string(),
                served_stale: false,
            }],
            translated: false,
        };
        let pager = Pager::new(aggregation.items.len(), 20);

        let page = render_list_page(&aggregation, &pager, "UTC", 9);
        let failure_pos = page.find("! source Broken unavailable").unwrap();
        let item_pos = page
            .find("  1: [Example] Hello world  2024/01/01 00:00")
            .unwrap();
        assert!(failure_pos < item_pos);
        assert!(page.contains("     Some body..."));
        assert!(page.contains("translation off"));
        assert!(page.contains("Page 1 / 1"));
    }

    #[test]
    fn test_render_list_page_marks_failed_translation() {
        let mut item = shown("Hello", "");
        item.title_translation = Some(Translation::Failed("quota".to_string()));
        let aggregation = Aggregation {
            items: vec![item],
            failures: Vec::new(),
            translated: true,
        };

        let page = render_list_page(&aggregation, &Pager::new(1, 20), "UTC", 50);
        assert!(page.contains("[translation failed] Hello"));
        assert!(page.contains("(1 article(s) could not be translated)"));
    }

    #[test]
    fn test_render_detail() {
        let plain = render_detail(&shown("Hello", "Body"), "Asia/Tokyo", 500);
        assert!(plain.contains("Title: Hello"));
        assert!(plain.contains("Published: 2024/01/01 09:00"));
        assert!(plain.contains("URL: https://example.com/a"));

        let mut translated = shown("Hello", "Body");
        translated.title_translation = Some(Translation::Translated("こんにちは".to_string()));
        translated.body_translation = Some(Translation::Translated("本文".to_string()));
        let detail = render_detail(&translated, "UTC", 500);
        assert!(detail.contains("Title (original): Hello"));
        assert!(detail.contains("Title (translated): こんにちは"));
        assert!(detail.contains("Content (translated):\n本文"));
    }

    #[test]
    fn test_wrap() {
        let wrapped = wrap("aaa bbb ccc", 7);
        assert_eq!(wrapped, "aaa bbb\nccc\n");
        assert_eq!(wrap("", 10), "");
    }
}
