//! Optional AI cleanup: ask a chat model to tidy normalised text.
//!
//! The collaborator sits between normalisation and formatting. It is
//! strictly best-effort: any failure is reported as a [`CleanupError`] and
//! the orchestrator continues with the normalised text.
//!
//! ## Retry Strategy
//!
//! Provider errors are retried with exponential backoff
//! (`retry_backoff_ms * 2^(attempt-1)`): with 500 ms base and 3 retries the
//! waits are 500 ms → 1 s → 2 s. Each call is bounded by `timeout_secs`.
//!
//! ## Chunking
//!
//! Texts over [`CHUNK_THRESHOLD`] characters are split on paragraph
//! boundaries into chunks of about [`CHUNK_SIZE`] characters and cleaned one
//! by one. If any chunk fails, the whole cleanup fails; a half-cleaned
//! document is not returned.

use crate::error::{BrailleError, CleanupError};
use crate::pipeline::normalize::strip_code_fences;
use crate::prompts::{cleanup_user_prompt, CLEANUP_SYSTEM_PROMPT};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, info, warn};

/// Texts longer than this many characters are cleaned in chunks.
pub const CHUNK_THRESHOLD: usize = 3000;

/// Target chunk size in characters.
pub const CHUNK_SIZE: usize = 2500;

/// Default model when a provider is named without one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// "Given raw text, return cleaned text."
///
/// Implementations must be `Send + Sync`; one cleaner is shared by every
/// document of a batch.
pub trait TextCleaner: Send + Sync {
    fn clean<'a>(
        &'a self,
        text: &'a str,
        document_type: &'a str,
    ) -> BoxFuture<'a, Result<String, CleanupError>>;
}

/// [`TextCleaner`] backed by an `edgequake-llm` chat provider.
#[derive(Clone)]
pub struct LlmCleaner {
    provider: Arc<dyn LLMProvider>,
    /// Sampling temperature. Default: 0.3.
    pub temperature: f32,
    /// Default: 4096.
    pub max_tokens: usize,
    /// Retries after the first attempt. Default: 2.
    pub max_retries: u32,
    /// Base backoff in milliseconds. Default: 500.
    pub retry_backoff_ms: u64,
    /// Per-call timeout. Default: 30.
    pub timeout_secs: u64,
    /// Line width the prompt asks for. Default: 40.
    pub column_budget: usize,
}

impl std::fmt::Debug for LlmCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmCleaner")
            .field("provider", &"<dyn LLMProvider>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LlmCleaner {
    /// Wrap an already-configured provider.
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            temperature: 0.3,
            max_tokens: 4096,
            max_retries: 2,
            retry_backoff_ms: 500,
            timeout_secs: 30,
            column_budget: crate::config::DEFAULT_COLUMN_BUDGET,
        }
    }

    /// Resolve a provider, from most-specific to least-specific:
    ///
    /// 1. `provider_name` (+ `model`, default [`DEFAULT_MODEL`])
    /// 2. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, when both are set
    /// 3. `OPENAI_API_KEY` present → OpenAI
    /// 4. [`ProviderFactory::from_env`] auto-detection
    pub fn from_env(provider_name: Option<&str>, model: Option<&str>) -> Result<Self, BrailleError> {
        if let Some(name) = provider_name {
            return named_provider(name, model.unwrap_or(DEFAULT_MODEL)).map(Self::new);
        }

        if let (Ok(prov), Ok(env_model)) = (
            std::env::var("EDGEQUAKE_LLM_PROVIDER"),
            std::env::var("EDGEQUAKE_MODEL"),
        ) {
            if !prov.is_empty() && !env_model.is_empty() {
                return named_provider(&prov, &env_model).map(Self::new);
            }
        }

        if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.is_empty()) {
            return named_provider("openai", model.unwrap_or(DEFAULT_MODEL)).map(Self::new);
        }

        let (llm, _embedding) =
            ProviderFactory::from_env().map_err(|e| BrailleError::ProviderNotConfigured {
                provider: "auto".to_string(),
                hint: format!(
                    "No LLM provider could be auto-detected from environment.\n\
                    Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                    Error: {e}"
                ),
            })?;
        Ok(Self::new(llm))
    }

    pub fn with_column_budget(mut self, columns: usize) -> Self {
        self.column_budget = columns;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_retries(mut self, max_retries: u32, backoff_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    async fn clean_all(&self, text: &str, document_type: &str) -> Result<String, CleanupError> {
        let chunks = split_into_chunks(text, CHUNK_SIZE, CHUNK_THRESHOLD);
        info!(
            "AI cleanup: {} chars in {} chunk(s)",
            text.chars().count(),
            chunks.len()
        );

        let mut cleaned = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let chunk_num = i + 1;
            debug!("AI cleanup: chunk {}/{}", chunk_num, chunks.len());
            cleaned.push(self.clean_chunk(chunk_num, chunk, document_type).await?);
        }
        Ok(cleaned.join("\n\n"))
    }

    async fn clean_chunk(
        &self,
        chunk_num: usize,
        chunk: &str,
        document_type: &str,
    ) -> Result<String, CleanupError> {
        let messages = vec![
            ChatMessage::system(CLEANUP_SYSTEM_PROMPT),
            ChatMessage::user(cleanup_user_prompt(chunk, document_type, self.column_budget)),
        ];
        let options = self.build_options();

        let mut last_err = CleanupError::ProviderFailed {
            chunk: chunk_num,
            retries: 0,
            detail: "no attempt made".to_string(),
        };

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let backoff = self.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Cleanup chunk {}: retry {}/{} after {}ms",
                    chunk_num, attempt, self.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            let call = self.provider.chat(&messages, Some(&options));
            match timeout(Duration::from_secs(self.timeout_secs), call).await {
                Ok(Ok(response)) => {
                    let text = strip_code_fences(response.content.trim());
                    let text = text.trim();
                    if text.is_empty() {
                        warn!("Cleanup chunk {}: empty response", chunk_num);
                        last_err = CleanupError::EmptyResponse { chunk: chunk_num };
                        continue;
                    }
                    return Ok(text.to_string());
                }
                Ok(Err(e)) => {
                    warn!("Cleanup chunk {}: attempt {} failed: {}", chunk_num, attempt + 1, e);
                    last_err = CleanupError::ProviderFailed {
                        chunk: chunk_num,
                        retries: self.max_retries,
                        detail: e.to_string(),
                    };
                }
                Err(_) => {
                    warn!(
                        "Cleanup chunk {}: attempt {} timed out after {}s",
                        chunk_num,
                        attempt + 1,
                        self.timeout_secs
                    );
                    last_err = CleanupError::Timeout {
                        chunk: chunk_num,
                        secs: self.timeout_secs,
                    };
                }
            }
        }
        Err(last_err)
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            ..Default::default()
        }
    }
}

impl TextCleaner for LlmCleaner {
    fn clean<'a>(
        &'a self,
        text: &'a str,
        document_type: &'a str,
    ) -> BoxFuture<'a, Result<String, CleanupError>> {
        self.clean_all(text, document_type).boxed()
    }
}

/// Split `text` into chunks on blank-line boundaries.
///
/// Text at or under `threshold` characters is returned as one chunk. A
/// single paragraph longer than `chunk_size` becomes its own chunk.
pub fn split_into_chunks(text: &str, chunk_size: usize, threshold: usize) -> Vec<String> {
    if text.chars().count() <= threshold {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        let para_len = para.chars().count();
        if current_len > 0 && current_len + para_len + 2 >= chunk_size {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push_str("\n\n");
            current_len += 2;
        }
        current.push_str(para);
        current_len += para_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn named_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, BrailleError> {
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        BrailleError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split_into_chunks("one\n\ntwo", CHUNK_SIZE, CHUNK_THRESHOLD);
        assert_eq!(chunks, vec!["one\n\ntwo".to_string()]);
    }

    #[test]
    fn test_long_text_split_on_paragraphs() {
        let para = "word ".repeat(100); // 500 chars
        let text = vec![para.trim(); 10].join("\n\n");
        let chunks = split_into_chunks(&text, CHUNK_SIZE, CHUNK_THRESHOLD);
        assert!(chunks.len() >= 2, "got {} chunks", chunks.len());
        for chunk in &chunks {
            assert!(chunk.chars().count() < CHUNK_SIZE, "chunk too long");
        }
        let rejoined = chunks.join("\n\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_oversized_paragraph_kept_whole() {
        let huge = "x".repeat(4000);
        let chunks = split_into_chunks(&format!("intro\n\n{huge}"), CHUNK_SIZE, CHUNK_THRESHOLD);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], huge);
    }
}
