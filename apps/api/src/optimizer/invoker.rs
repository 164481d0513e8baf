//! Completion Invoker: tries each candidate model in strict order until one
//! returns non-empty text.
//!
//! One attempt per candidate, no backoff, no racing. Every failure kind is
//! absorbed the same way; only exhaustion is reported.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{CompletionBackend, LlmError};
use crate::optimizer::model_selector::is_flash_model;

/// What happened to one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Name failed the flash pattern; never sent to the provider.
    SkippedInvalid,
    Failed(String),
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub model: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// A successful completion and the model that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("No valid gemini flash model candidates to try")]
    NoCandidates { attempts: Vec<Attempt> },

    #[error("All candidate Gemini flash models failed. Last error: {last_error}")]
    Exhausted {
        last_error: String,
        attempts: Vec<Attempt>,
    },
}

impl InvokeError {
    pub fn attempts(&self) -> &[Attempt] {
        match self {
            InvokeError::NoCandidates { attempts } => attempts,
            InvokeError::Exhausted { attempts, .. } => attempts,
        }
    }
}

/// Requests `prompt` from each candidate in order, returning the first non-empty text.
pub async fn invoke<S: AsRef<str>>(
    backend: &dyn CompletionBackend,
    api_key: &str,
    prompt: &str,
    candidates: &[S],
) -> Result<Completion, InvokeError> {
    let mut attempts = Vec::with_capacity(candidates.len());
    let mut last_error: Option<LlmError> = None;

    for candidate in candidates {
        let model = candidate.as_ref();

        // The list may come from a caller; re-check it before spending a request.
        if !is_flash_model(model) {
            warn!("Skipping invalid model name format: {model}");
            attempts.push(Attempt {
                model: model.to_string(),
                outcome: AttemptOutcome::SkippedInvalid,
            });
            continue;
        }

        info!("Trying model: {model}");
        let result = match backend.generate(api_key, model, prompt).await {
            Ok(text) if text.trim().is_empty() => Err(LlmError::EmptyContent),
            other => other,
        };

        match result {
            Ok(text) => {
                info!("Optimized with {model}");
                attempts.push(Attempt {
                    model: model.to_string(),
                    outcome: AttemptOutcome::Succeeded,
                });
                return Ok(Completion {
                    text,
                    model: model.to_string(),
                    attempts,
                });
            }
            Err(e) => {
                warn!("Model {model} failed: {e}");
                attempts.push(Attempt {
                    model: model.to_string(),
                    outcome: AttemptOutcome::Failed(e.to_string()),
                });
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) => Err(InvokeError::Exhausted {
            last_error: e.to_string(),
            attempts,
        }),
        None => Err(InvokeError::NoCandidates { attempts }),
    }
}
