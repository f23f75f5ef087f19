//! Scripted reader sessions driven through the console.

mod common;

use tempfile::TempDir;

use common::{aggregator, raw, StubFetcher};
use feedling::config::Config;
use feedling::{App, Console, FeedRegistry, ItemCache, SettingsStore, TranslationCache};

const A_URL: &str = "https://a.example.com/feed.xml";

struct Session {
    dir: TempDir,
}

impl Session {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn config(&self) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = self.dir.path().display().to_string();
        config.reader.timezone = "UTC".to_string();
        config
    }

    fn registry(&self) -> FeedRegistry {
        FeedRegistry::load(self.config().storage.feeds_path()).unwrap()
    }

    fn settings(&self) -> SettingsStore {
        SettingsStore::load(self.config().storage.settings_path()).unwrap()
    }

    /// Run one session over `input` and return everything written.
    async fn run(&self, fetcher: StubFetcher, input: &str) -> String {
        let config = self.config();
        let item_cache = ItemCache::open(config.storage.cache_path(), 3600);
        let translation_cache = TranslationCache::open(config.storage.translation_cache_path());
        let mut app = App::new(
            config,
            self.registry(),
            self.settings(),
            item_cache,
            translation_cache,
            aggregator(fetcher),
        );

        let mut console = Console::new(input.as_bytes(), Vec::new());
        app.run(&mut console).await.unwrap();
        let (_, output) = console.into_parts();
        String::from_utf8(output).unwrap()
    }
}

#[tokio::test]
async fn test_add_feed_uses_feed_title_when_name_blank() {
    let session = Session::new();
    let fetcher = StubFetcher::new().with_title(A_URL, "Alpha News");

    let output = session
        .run(fetcher, &format!("3\n{A_URL}\n\n1\n7\n"))
        .await;

    assert!(output.contains("Added feed 'Alpha News'."));
    assert!(output.contains(&format!("1: Alpha News ({A_URL})")));
    assert!(output.ends_with("Bye.\n"));
    assert_eq!(session.registry().sources()[0].name, "Alpha News");
}

#[tokio::test]
async fn test_edit_and_remove_feed() {
    let session = Session::new();
    session
        .registry()
        .add(A_URL, "Alpha")
        .unwrap();

    let output = session
        .run(
            StubFetcher::new(),
            "5\n1\n\nRenamed\n4\n9\n4\n1\n7\n",
        )
        .await;

    assert!(output.contains("Updated feed 'Renamed'."));
    assert!(output.contains("feed #9 not found"));
    assert!(output.contains("Removed feed 'Renamed'."));
    assert!(session.registry().is_empty());
}

#[tokio::test]
async fn test_toggle_translation_persists() {
    let session = Session::new();

    let output = session.run(StubFetcher::new(), "6\n").await;

    assert!(output.contains("Translation is now on."));
    assert!(session.settings().translation_enabled());
}

#[tokio::test]
async fn test_read_pages_and_opens_detail() {
    let session = Session::new();
    session.registry().add(A_URL, "A").unwrap();

    let items = (1..=25).map(|day| raw(&format!("Story {day}"), "A", day)).collect();
    let fetcher = StubFetcher::new().with_items(A_URL, items);

    let output = session
        .run(fetcher, "2\nn\nn\n25\nx\nb\nq\n7\n")
        .await;

    assert!(output.contains("=== Articles (page 1/2) - translation off ==="));
    assert!(output.contains("  1: [A] Story 25  2024/01/25 00:00"));
    assert!(output.contains("=== Articles (page 2/2)"));
    assert!(output.contains(" 25: [A] Story 1  2024/01/01 00:00"));
    assert!(output.contains("Already on the last page."));
    assert!(output.contains("Title: Story 1"));
    assert!(output.contains("Enter b to go back."));
}

#[tokio::test]
async fn test_read_shows_failure_note_above_list() {
    let session = Session::new();
    session.registry().add(A_URL, "A").unwrap();
    session
        .registry()
        .add("https://b.example.com/feed.xml", "B")
        .unwrap();

    let fetcher = StubFetcher::new().with_items(A_URL, vec![raw("Only A", "A", 1)]);
    let output = session.run(fetcher, "2\nq\n7\n").await;

    let note = output.find("! source B unavailable").unwrap();
    let item = output.find("[A] Only A").unwrap();
    assert!(note < item);
}

#[tokio::test]
async fn test_read_without_feeds() {
    let session = Session::new();
    let output = session.run(StubFetcher::new(), "2\n7\n").await;
    assert!(output.contains("No feeds registered."));
}
