//! Translation of item text through a remote language model.
//!
//! [`Translator`] resolves text cache-first: [`TranslationCache`] is consulted
//! before [`TranslationClient`] is called, and every new translation is
//! flushed to disk immediately.

pub mod cache;
pub mod client;
pub mod service;

pub use cache::TranslationCache;
pub use client::{CompletionClient, OpenAiCompletion, TranslationClient};
pub use service::{Translation, Translator};
