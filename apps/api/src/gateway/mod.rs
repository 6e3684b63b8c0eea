//! Generation Gateway: every agent call goes through `Gateway::generate`.
//!
//! The gateway is total for provider-side failures: it always hands back a
//! non-empty string, substituting the caller's fallback when the provider is
//! unconfigured, out of quota, or failing. Which of those happened is returned
//! as an explicit `FallbackCause` so callers never have to guess from the text.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::{OutputMode, TextGenerator};
use crate::workflow::state::{Severity, WorkflowState};

/// Why a generation used its fallback instead of live output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// No credential configured; no network attempt was made.
    Offline,
    /// Provider reported quota/rate exhaustion. Already counted in `api_fallbacks`.
    QuotaExhausted,
    /// Any other provider failure. Logged as an error, not counted.
    ProviderError,
}

impl FallbackCause {
    /// Whether the gateway already recorded this fallback in the metrics.
    pub fn is_counted(self) -> bool {
        self == FallbackCause::QuotaExhausted
    }
}

/// A generated value plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub fallback: Option<FallbackCause>,
}

impl Generation {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    fn fallback(text: &str, cause: FallbackCause) -> Self {
        Self {
            text: text.to_string(),
            fallback: Some(cause),
        }
    }
}

#[derive(Clone, Default)]
pub struct Gateway {
    backend: Option<Arc<dyn TextGenerator>>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A gateway with no credential: every call returns its fallback.
    pub fn offline() -> Self {
        Self { backend: None }
    }

    /// Generates text for `prompt`, degrading to `fallback` on any provider failure.
    ///
    /// Errors only when the fallback itself is unusable (blank, or not JSON in
    /// structured mode): that is a programming mistake, not a runtime condition.
    pub async fn generate(
        &self,
        state: &mut WorkflowState,
        prompt: &str,
        fallback: &str,
        mode: OutputMode,
    ) -> Result<Generation, AppError> {
        check_fallback(fallback, mode)?;

        let Some(backend) = &self.backend else {
            debug!("No generation credential configured; using fallback");
            return Ok(Generation::fallback(fallback, FallbackCause::Offline));
        };

        match backend.generate(prompt, mode).await {
            Ok(text) if !text.trim().is_empty() => Ok(Generation {
                text,
                fallback: None,
            }),
            Ok(_) => {
                state.error("Generation API returned empty content. Using fallback template.");
                Ok(Generation::fallback(fallback, FallbackCause::ProviderError))
            }
            Err(e) if e.is_quota_exhausted() => {
                state.record_log(
                    "Generation API quota exceeded (429). Using fallback template engine.",
                    Severity::Fallback,
                );
                Ok(Generation::fallback(fallback, FallbackCause::QuotaExhausted))
            }
            Err(e) => {
                state.error(format!("Generation API error: {e}"));
                Ok(Generation::fallback(fallback, FallbackCause::ProviderError))
            }
        }
    }
}

fn check_fallback(fallback: &str, mode: OutputMode) -> Result<(), AppError> {
    if fallback.trim().is_empty() {
        return Err(AppError::Configuration(
            "generation fallback must not be blank".to_string(),
        ));
    }
    if mode == OutputMode::Structured {
        serde_json::from_str::<serde_json::Value>(fallback).map_err(|e| {
            AppError::Configuration(format!("structured fallback is not valid JSON: {e}"))
        })?;
    }
    Ok(())
}
