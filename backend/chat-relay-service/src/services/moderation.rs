//! Moderation gateway
//!
//! Every TALK text is sent to an external classifier before it is stored or
//! relayed. The gateway fails open: transport errors, non-success statuses,
//! undecodable bodies and timeouts all yield [`ModerationVerdict::pass_through`]
//! so chat keeps flowing when the classifier is down.

use crate::error::AppError;
use crate::metrics;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use resilience::{with_timeout_result, TimeoutError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Result of classifying one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub flagged: bool,
    /// Replacement text supplied by the classifier, if any.
    pub rewritten_text: Option<String>,
}

impl ModerationVerdict {
    /// Unflagged verdict that carries the original text unchanged.
    pub fn pass_through(text: &str) -> Self {
        Self {
            flagged: false,
            rewritten_text: Some(text.to_string()),
        }
    }

    /// Text to store and relay: the rewrite when present, else `original`.
    pub fn display_text(&self, original: &str) -> String {
        self.rewritten_text
            .clone()
            .unwrap_or_else(|| original.to_string())
    }

    fn outcome(&self) -> &'static str {
        if self.flagged {
            "flagged"
        } else {
            "pass"
        }
    }
}

#[async_trait]
pub trait ModerationGateway: Send + Sync {
    /// Classify `text`. Never fails; failures degrade to a pass-through verdict.
    async fn evaluate(&self, text: &str) -> ModerationVerdict;
}

/// Gateway used when no classifier endpoint is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughGateway;

#[async_trait]
impl ModerationGateway for PassThroughGateway {
    async fn evaluate(&self, text: &str) -> ModerationVerdict {
        ModerationVerdict::pass_through(text)
    }
}

#[derive(Debug, Error)]
enum ModerationError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    final_decision: Option<serde_json::Value>,
    #[serde(default)]
    result: Option<ClassifyResult>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResult {
    #[serde(default)]
    rewritten_text: Option<String>,
}

impl From<ClassifyResponse> for ModerationVerdict {
    fn from(response: ClassifyResponse) -> Self {
        // The classifier reports its decision as 1/0, either numeric or as a string.
        let flagged = match response.final_decision {
            Some(serde_json::Value::String(s)) => s == "1",
            Some(serde_json::Value::Number(n)) => n.to_string() == "1",
            _ => false,
        };
        Self {
            flagged,
            rewritten_text: response.result.and_then(|r| r.rewritten_text),
        }
    }
}

/// Calls the classifier at `url` with `POST {"text": ...}`.
#[derive(Clone)]
pub struct HttpModerationGateway {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpModerationGateway {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build moderation client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    async fn classify(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(ModerationError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModerationError::Status(status));
        }

        let body: ClassifyResponse = response.json().await.map_err(ModerationError::Decode)?;
        Ok(body.into())
    }
}

#[async_trait]
impl ModerationGateway for HttpModerationGateway {
    async fn evaluate(&self, text: &str) -> ModerationVerdict {
        let started = Instant::now();
        let result = with_timeout_result(self.timeout, self.classify(text)).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(verdict) => {
                metrics::record_moderation(verdict.outcome(), elapsed);
                verdict
            }
            Err(err) => {
                let reason = match err {
                    TimeoutError::Elapsed(after) => format!("timed out after {after:?}"),
                    TimeoutError::Failed(inner) => inner.to_string(),
                };
                tracing::warn!(
                    url = %self.url,
                    reason = %reason,
                    "moderation unavailable, passing message through"
                );
                metrics::record_moderation("failed_open", elapsed);
                ModerationVerdict::pass_through(text)
            }
        }
    }
}
