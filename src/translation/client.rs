//! Translation client backed by a chat completions service.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::TranslationConfig;
use crate::{FeedlingError, Result};

/// One-shot chat completion.
///
/// Every failure surfaces as [`FeedlingError::RemoteService`].
pub trait CompletionClient {
    /// Send `prompt` under the `system` instruction and return the reply text.
    fn complete(&self, system: &str, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// OpenAI-compatible `/v1/chat/completions` client.
pub struct OpenAiCompletion {
    client: Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompletion {
    /// Create a client from the translation configuration.
    pub fn new(config: &TranslationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                FeedlingError::RemoteService(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl CompletionClient for OpenAiCompletion {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(FeedlingError::RemoteService("API key not set".to_string()));
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ]
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedlingError::RemoteService(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let text = response
            .text()
            .await
            .map_err(|e| FeedlingError::RemoteService(format!("failed to read response: {}", e)))?;

        parse_completion(&text)
    }
}

fn status_error(status: StatusCode) -> FeedlingError {
    let reason = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication failed",
        StatusCode::TOO_MANY_REQUESTS => "rate limit or quota exceeded",
        _ => "HTTP error",
    };
    FeedlingError::RemoteService(format!("{}: {}", reason, status))
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

/// Extract the first choice's text from a chat completions response body.
fn parse_completion(body: &str) -> Result<String> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| FeedlingError::RemoteService(format!("malformed response: {}", e)))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if content.is_empty() {
        return Err(FeedlingError::RemoteService("empty response".to_string()));
    }
    Ok(content)
}

/// Translator for one fixed language pair.
pub struct TranslationClient<C> {
    completion: C,
    source_language: String,
    target_language: String,
    system_prompt: Option<String>,
}

impl<C: CompletionClient> TranslationClient<C> {
    /// Wrap a completion client with the configured language pair.
    pub fn new(completion: C, config: &TranslationConfig) -> Self {
        let system_prompt = if config.system_prompt.trim().is_empty() {
            None
        } else {
            Some(config.system_prompt.clone())
        };

        Self {
            completion,
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            system_prompt,
        }
    }

    /// Underlying completion client.
    pub fn completion(&self) -> &C {
        &self.completion
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate sanitized `text` from `source_lang` to `target_lang`.
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let system = match &self.system_prompt {
            Some(prompt) => prompt.clone(),
            None => instruction(source_lang, target_lang),
        };

        debug!(
            "Translating {} chars {} -> {}",
            text.chars().count(),
            source_lang,
            target_lang
        );
        self.completion.complete(&system, text).await
    }

    /// Translate with the configured language pair.
    pub async fn translate_configured(&self, text: &str) -> Result<String> {
        self.translate(text, &self.source_language, &self.target_language)
            .await
    }
}

fn instruction(source_lang: &str, target_lang: &str) -> String {
    format!(
        "You are an expert {target_lang} translator. Translate the {source_lang} text \
         into natural {target_lang}. Output only the translation."
    )
}
