//! Hand-written fakes for the workflow's seams. Test builds only.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::Config;
use crate::document::TextExtractor;
use crate::llm_client::{LlmError, OutputMode, TextGenerator};
use crate::mailer::{MailTransport, OutgoingMail, SendError};
use crate::workflow::dispatch::{DEFAULT_DISPATCH_DELAY, DEFAULT_SANDBOX_DELAY, DEFAULT_SANDBOX_DOMAINS};
use crate::workflow::rate_limiter::RateLimiter;

/// Offline configuration with no sender identity.
pub fn test_config() -> Config {
    Config {
        gemini_api_key: None,
        sender_email: None,
        smtp_app_password: None,
        smtp_host: "smtp.gmail.com".to_string(),
        smtp_port: 587,
        preferred_location: "Remote".to_string(),
        dispatch_delay: DEFAULT_DISPATCH_DELAY,
        sandbox_delay: DEFAULT_SANDBOX_DELAY,
        sandbox_domains: DEFAULT_SANDBOX_DOMAINS.iter().map(|d| d.to_string()).collect(),
        port: 8080,
        rust_log: "info".to_string(),
    }
}

/// Replays a fixed list of provider outcomes and records every prompt.
/// Once the script runs out, every call fails with a 503.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<(String, OutputMode)>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, OutputMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, mode: OutputMode) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((prompt.to_string(), mode));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 503,
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// Returns immediately and remembers each requested delay.
#[derive(Default)]
pub struct RecordingRateLimiter {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingRateLimiter {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl RateLimiter for RecordingRateLimiter {
    async fn wait_before_next(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

type FailureFactory = Box<dyn Fn() -> SendError + Send + Sync>;

/// Transport double. Succeeds, or fails for every (or one) recipient.
pub struct FakeMailer {
    failure: Option<FailureFactory>,
    fail_only_for: Option<String>,
    attempts: Mutex<usize>,
    sent: Mutex<Vec<OutgoingMail>>,
}

impl FakeMailer {
    pub fn succeeding() -> Self {
        Self {
            failure: None,
            fail_only_for: None,
            attempts: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: impl Fn() -> SendError + Send + Sync + 'static) -> Self {
        Self {
            failure: Some(Box::new(failure)),
            ..Self::succeeding()
        }
    }

    pub fn failing_for(
        recipient: &str,
        failure: impl Fn() -> SendError + Send + Sync + 'static,
    ) -> Self {
        Self {
            fail_only_for: Some(recipient.to_string()),
            ..Self::failing(failure)
        }
    }

    /// Mails that were accepted.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), SendError> {
        *self.attempts.lock().unwrap() += 1;
        let targeted = self
            .fail_only_for
            .as_ref()
            .map_or(true, |r| r == &mail.recipient);
        match &self.failure {
            Some(failure) if targeted => Err(failure()),
            _ => {
                self.sent.lock().unwrap().push(mail.clone());
                Ok(())
            }
        }
    }
}

/// Extractor that ignores the document and returns fixed text.
pub struct StaticExtractor(pub &'static str);

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract_text(&self, _document: Bytes) -> String {
        self.0.to_string()
    }
}
