use std::process::ExitCode;

use tracing::{error, info, warn};

use feedling::app::StdConsole;
use feedling::rss::{AggregatorOptions, FeedAggregator, ItemCache, RssFetcher};
use feedling::translation::{OpenAiCompletion, TranslationCache, TranslationClient, Translator};
use feedling::{App, Config, FeedRegistry, SettingsStore};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = feedling::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        feedling::logging::init_console_only(&config.logging.level);
    }

    info!("feedling starting");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> feedling::Result<()> {
    let storage = &config.storage;

    let registry = FeedRegistry::load(storage.feeds_path())?;
    let settings = SettingsStore::load(storage.settings_path())?;
    let item_cache = ItemCache::open(storage.cache_path(), config.rss.cache_ttl_secs);
    let translation_cache = TranslationCache::open(storage.translation_cache_path());

    if config.translation.api_key.is_empty() {
        warn!(
            "No translation API key configured (set {} or FEEDLING_API_KEY)",
            config.translation.api_key_env
        );
    }

    let fetcher = RssFetcher::new(&config.rss)?;
    let completion = OpenAiCompletion::new(&config.translation)?;
    info!("Translation model: {}", completion.model());
    let translator = Translator::new(
        TranslationClient::new(completion, &config.translation),
        config.translation.max_concurrent_requests,
    );
    let aggregator = FeedAggregator::new(
        fetcher,
        translator,
        AggregatorOptions::from_config(&config),
    );

    let mut app = App::new(
        config,
        registry,
        settings,
        item_cache,
        translation_cache,
        aggregator,
    );
    let mut console = StdConsole::stdio();
    app.run(&mut console).await
}
