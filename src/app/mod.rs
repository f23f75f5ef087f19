//! Interactive reader application.
//!
//! Runs the main menu over a [`Console`], manages the feed registry and
//! settings, and pages through the result of an aggregation run.

pub mod console;
pub mod menu;
pub mod reader;

pub use console::{Console, StdConsole};
pub use menu::{render_menu, MenuAction};
pub use reader::{render_detail, render_failures, render_list_page, Pager, ReaderCommand};

use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{info, warn};

use crate::config::Config;
use crate::registry::FeedRegistry;
use crate::rss::{FeedAggregator, FeedFetcher, ItemCache};
use crate::settings::SettingsStore;
use crate::translation::{CompletionClient, TranslationCache};
use crate::Result;

/// Application state for one interactive session.
pub struct App<F, C> {
    config: Config,
    registry: FeedRegistry,
    settings: SettingsStore,
    item_cache: ItemCache,
    translation_cache: TranslationCache,
    aggregator: FeedAggregator<F, C>,
}

impl<F: FeedFetcher, C: CompletionClient> App<F, C> {
    pub fn new(
        config: Config,
        registry: FeedRegistry,
        settings: SettingsStore,
        item_cache: ItemCache,
        translation_cache: TranslationCache,
        aggregator: FeedAggregator<F, C>,
    ) -> Self {
        Self {
            config,
            registry,
            settings,
            item_cache,
            translation_cache,
            aggregator,
        }
    }

    pub fn registry(&self) -> &FeedRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    /// Run the main menu until the user quits or input ends.
    pub async fn run<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Session started with {} feed(s)", self.registry.len());

        loop {
            console
                .send(&render_menu(self.settings.translation_enabled()))
                .await?;
            let Some(input) = console.prompt("\nSelect (1-7): ").await? else {
                break;
            };

            match MenuAction::parse(&input) {
                MenuAction::ListFeeds => self.list_feeds(console).await?,
                MenuAction::Read => self.read(console).await?,
                MenuAction::AddFeed => self.add_feed(console).await?,
                MenuAction::RemoveFeed => self.remove_feed(console).await?,
                MenuAction::EditFeed => self.edit_feed(console).await?,
                MenuAction::ToggleTranslation => self.toggle_translation(console).await?,
                MenuAction::Quit => break,
                MenuAction::Invalid(_) => console.send_line("Invalid choice.").await?,
            }
        }

        console.send_line("Bye.").await?;
        info!("Session ended");
        Ok(())
    }

    async fn list_feeds<R, W>(&self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.registry.is_empty() {
            return console.send_line("No feeds registered.").await;
        }

        console.send_line("Registered feeds:").await?;
        for (number, feed) in self.registry.list() {
            console
                .send_line(&format!("{}: {} ({})", number, feed.name, feed.url))
                .await?;
        }
        Ok(())
    }

    async fn read<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if self.registry.is_empty() {
            return console.send_line("No feeds registered.").await;
        }

        console.send_line("Fetching articles...").await?;
        let aggregation = match self
            .aggregator
            .run(
                self.registry.sources(),
                self.settings.translation_enabled(),
                &mut self.item_cache,
                &mut self.translation_cache,
            )
            .await
        {
            Ok(aggregation) => aggregation,
            Err(e) => {
                warn!("Aggregation failed: {}", e);
                return console.send_line(&e.to_string()).await;
            }
        };

        let reader = &self.config.reader;
        let mut pager = Pager::new(aggregation.items.len(), reader.page_size);
        let mut redraw = true;

        loop {
            if redraw {
                console
                    .send(&render_list_page(
                        &aggregation,
                        &pager,
                        &reader.timezone,
                        reader.preview_chars,
                    ))
                    .await?;
            }
            redraw = false;

            let Some(input) = console.prompt("\nCommand: ").await? else {
                return Ok(());
            };

            match ReaderCommand::parse(&input) {
                ReaderCommand::Next => {
                    redraw = pager.next();
                    if !redraw {
                        console.send_line("Already on the last page.").await?;
                    }
                }
                ReaderCommand::Previous => {
                    redraw = pager.previous();
                    if !redraw {
                        console.send_line("Already on the first page.").await?;
                    }
                }
                ReaderCommand::Back => return Ok(()),
                ReaderCommand::Open(number) => match pager.index_for(number) {
                    Some(index) => {
                        let detail = render_detail(
                            &aggregation.items[index],
                            &reader.timezone,
                            self.config.translation.max_body_chars,
                        );
                        console.send(&detail).await?;
                        if !wait_for_back(console).await? {
                            return Ok(());
                        }
                        redraw = true;
                    }
                    None => console.send_line("Invalid article number.").await?,
                },
                ReaderCommand::Invalid(_) => console.send_line("Invalid command.").await?,
            }
        }
    }

    async fn add_feed<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Some(url) = console.prompt("Feed URL: ").await? else {
            return Ok(());
        };
        let Some(name) = console
            .prompt("Feed name (blank to use the feed's title): ")
            .await?
        else {
            return Ok(());
        };

        let url = url.trim().to_string();
        let name = if name.trim().is_empty() {
            match self.aggregator.fetcher().fetch_title(&url).await {
                Ok(title) => title,
                Err(e) => {
                    warn!("Could not look up title for {}: {}", url, e);
                    url.clone()
                }
            }
        } else {
            name
        };

        match self.registry.add(&url, &name) {
            Ok(feed) => {
                let message = format!("Added feed '{}'.", feed.name);
                console.send_line(&message).await
            }
            Err(e) => console.send_line(&e.to_string()).await,
        }
    }

    async fn remove_feed<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.list_feeds(console).await?;
        if self.registry.is_empty() {
            return Ok(());
        }

        let Some(input) = console.prompt("Number of the feed to remove: ").await? else {
            return Ok(());
        };
        let Some(index) = parse_feed_number(&input) else {
            return console.send_line("Invalid number.").await;
        };

        match self.registry.remove(index) {
            Ok(feed) => {
                console
                    .send_line(&format!("Removed feed '{}'.", feed.name))
                    .await
            }
            Err(e) => console.send_line(&e.to_string()).await,
        }
    }

    async fn edit_feed<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.list_feeds(console).await?;
        if self.registry.is_empty() {
            return Ok(());
        }

        let Some(input) = console.prompt("Number of the feed to edit: ").await? else {
            return Ok(());
        };
        let Some(index) = parse_feed_number(&input) else {
            return console.send_line("Invalid number.").await;
        };
        let Some(url) = console.prompt("New URL (blank to keep): ").await? else {
            return Ok(());
        };
        let Some(name) = console.prompt("New name (blank to keep): ").await? else {
            return Ok(());
        };

        match self.registry.edit(index, Some(&url), Some(&name)) {
            Ok(feed) => {
                let message = format!("Updated feed '{}'.", feed.name);
                console.send_line(&message).await
            }
            Err(e) => console.send_line(&e.to_string()).await,
        }
    }

    async fn toggle_translation<R, W>(&mut self, console: &mut Console<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        match self.settings.toggle_translation() {
            Ok(enabled) => {
                console
                    .send_line(&format!("Translation is now {}.", menu::on_off(enabled)))
                    .await
            }
            Err(e) => console.send_line(&e.to_string()).await,
        }
    }
}

/// Wait on the detail view until `b` is entered. Returns false at end of input.
async fn wait_for_back<R, W>(console: &mut Console<R, W>) -> Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        match console.prompt("\nCommand: ").await? {
            Some(input) if input.trim().eq_ignore_ascii_case("b") => return Ok(true),
            Some(_) => console.send_line("Enter b to go back.").await?,
            None => return Ok(false),
        }
    }
}

/// Parse a 1-based feed number into a registry index.
fn parse_feed_number(input: &str) -> Option<usize> {
    input.trim().parse::<usize>().ok()?.checked_sub(1)
}
