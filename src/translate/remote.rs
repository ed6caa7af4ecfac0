//! Client for an external Braille translation service.
//!
//! ## Wire contract
//!
//! ```text
//! POST <base>/convert   {"text": "...", "grade": 2, "table": "en-us-g2.ctb"}
//!   ← {"status": "success", "braille_text": "⠓⠑⠇⠇⠕", "pagination": {...}}
//!   ← {"status": "error", "error": "..."}
//! GET  <base>/health    ← 2xx when the engine is ready
//! ```
//!
//! The service's own pagination is ignored; pages are always computed
//! locally from `braille_text` with the configured layout.
//!
//! ## Failure kinds
//!
//! Connection failures, timeouts, 5xx, 404, 408 and 429 mean the engine could
//! not be used at all: [`BrailleError::TranslationUnavailable`]. A reply
//! that arrives but carries `status: "error"`, an empty `braille_text` or an
//! unreadable body is [`BrailleError::TranslationContent`].

use super::BrailleTranslator;
use crate::config::Grade;
use crate::error::BrailleError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const ENGINE: &str = "remote";

/// Translator that delegates to an HTTP translation service.
#[derive(Debug, Clone)]
pub struct RemoteTranslator {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct ConvertRequest<'a> {
    text: &'a str,
    grade: Grade,
    table: &'static str,
}

#[derive(Deserialize)]
struct ConvertResponse {
    status: String,
    #[serde(default)]
    braille_text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl RemoteTranslator {
    /// Build a client for the service at `base_url` (e.g. `http://localhost:5001`).
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, BrailleError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BrailleError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `GET <base>/health`.
    pub async fn health(&self) -> Result<(), BrailleError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(unavailable(format!("health check returned HTTP {}", response.status())))
        }
    }

    async fn convert(&self, text: &str, grade: Grade) -> Result<String, BrailleError> {
        let url = format!("{}/convert", self.base_url);
        info!("Remote translation: {} chars, {} → {}", text.len(), grade, url);

        let body = ConvertRequest {
            text,
            grade,
            table: grade.table_name(),
        };
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if is_unavailable_status(status) {
            return Err(unavailable(format!("HTTP {status}")));
        }

        let parsed: ConvertResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                content(format!("unreadable response (HTTP {status}): {e}"))
            }
        })?;

        if parsed.status == "error" {
            return Err(content(
                parsed
                    .error
                    .unwrap_or_else(|| "engine reported an error".to_string()),
            ));
        }
        if !status.is_success() {
            return Err(content(format!("HTTP {status}")));
        }

        match parsed.braille_text {
            Some(cells) if !cells.trim().is_empty() => {
                debug!("Remote translation returned {} cells", cells.chars().count());
                Ok(cells)
            }
            _ => Err(content("engine returned empty output".to_string())),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> BrailleError {
        if e.is_timeout() {
            unavailable(format!("no answer within {}s", self.timeout_secs))
        } else {
            unavailable(e.to_string())
        }
    }
}

impl BrailleTranslator for RemoteTranslator {
    fn name(&self) -> &'static str {
        ENGINE
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        grade: Grade,
    ) -> BoxFuture<'a, Result<String, BrailleError>> {
        self.convert(text, grade).boxed()
    }
}

fn is_unavailable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::NOT_FOUND
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

fn unavailable(reason: String) -> BrailleError {
    BrailleError::TranslationUnavailable {
        engine: ENGINE.into(),
        reason,
    }
}

fn content(reason: String) -> BrailleError {
    BrailleError::TranslationContent {
        engine: ENGINE.into(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let t = RemoteTranslator::new("http://localhost:5001/", 30).unwrap();
        assert_eq!(t.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ConvertRequest {
            text: "hi",
            grade: Grade::One,
            table: Grade::One.table_name(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["grade"], 1);
        assert_eq!(json["table"], "en-us-g1.ctb");
    }

    #[test]
    fn test_unavailable_statuses() {
        assert!(is_unavailable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_unavailable_status(StatusCode::NOT_FOUND));
        assert!(!is_unavailable_status(StatusCode::BAD_REQUEST));
        assert!(!is_unavailable_status(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Port 9 (discard) is closed on CI hosts.
        let t = RemoteTranslator::new("http://127.0.0.1:9", 2).unwrap();
        let err = t.translate("hello", Grade::Two).await.unwrap_err();
        assert!(err.is_unavailable(), "got: {err}");
    }
}
