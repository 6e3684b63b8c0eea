//! Dispatch Loop: one pass over the discovered opportunities, in order.
//!
//! Per opportunity: Pending → LetterGenerated → RateLimitWait → Sent | Failed.
//! Every opportunity gets exactly one attempt and exactly one record; a failed
//! send is logged and the loop moves on.

use std::time::Duration;

use bytes::Bytes;
use tracing::debug;

use crate::agents::cover_letter::generate_cover_letter;
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::mailer::{MailAttachment, MailTransport, OutgoingMail, SenderIdentity};
use crate::models::candidate::CandidateProfile;
use crate::models::dispatch::{DispatchRecord, DispatchStage};
use crate::models::opportunity::JobOpportunity;
use crate::workflow::rate_limiter::RateLimiter;
use crate::workflow::state::{Severity, WorkflowState};

pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_secs(20);
pub const DEFAULT_SANDBOX_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_SANDBOX_DOMAINS: [&str; 4] = ["example", "test", "invalid", "localhost"];

/// Throttling and sandbox routing rules for the loop.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    pub dispatch_delay: Duration,
    pub sandbox_delay: Duration,
    /// Domain labels that mark a recipient as a test target.
    pub sandbox_domains: Vec<String>,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            dispatch_delay: DEFAULT_DISPATCH_DELAY,
            sandbox_delay: DEFAULT_SANDBOX_DELAY,
            sandbox_domains: DEFAULT_SANDBOX_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl DispatchPolicy {
    /// A recipient is sandboxed when any label of its domain is a sandbox label,
    /// e.g. `careers@technova.example.com` or `hr@acme.test`.
    pub fn is_sandbox(&self, opportunity: &JobOpportunity) -> bool {
        opportunity.recipient_domain().is_some_and(|domain| {
            domain
                .split('.')
                .any(|label| self.sandbox_domains.iter().any(|s| s == label))
        })
    }

    pub fn delay_for(&self, simulated: bool) -> Duration {
        if simulated {
            self.sandbox_delay
        } else {
            self.dispatch_delay
        }
    }
}

/// The uploaded resume, attached verbatim to every application.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub filename: String,
    pub bytes: Bytes,
}

impl ResumeDocument {
    fn attachment(&self) -> MailAttachment {
        MailAttachment {
            filename: self.filename.clone(),
            content_type: "application/pdf".to_string(),
            bytes: self.bytes.clone(),
        }
    }
}

pub struct Dispatcher<'a> {
    pub gateway: &'a Gateway,
    pub mailer: &'a dyn MailTransport,
    pub rate_limiter: &'a dyn RateLimiter,
    pub policy: &'a DispatchPolicy,
}

impl Dispatcher<'_> {
    /// Dispatches to every opportunity in `state`, appending one record each.
    pub async fn dispatch_all(
        &self,
        state: &mut WorkflowState,
        candidate: &CandidateProfile,
        sender: &SenderIdentity,
        resume: &ResumeDocument,
    ) -> Result<(), AppError> {
        let opportunities = state.opportunities().to_vec();
        let total = opportunities.len();

        for (index, opportunity) in opportunities.into_iter().enumerate() {
            state.info(format!(
                "--- Processing {}/{}: {} ---",
                index + 1,
                total,
                opportunity.company_name
            ));
            let record = self
                .dispatch_one(state, candidate, sender, resume, opportunity)
                .await?;
            state.push_dispatch(record);
        }

        state.mark_dispatched();
        Ok(())
    }

    async fn dispatch_one(
        &self,
        state: &mut WorkflowState,
        candidate: &CandidateProfile,
        sender: &SenderIdentity,
        resume: &ResumeDocument,
        opportunity: JobOpportunity,
    ) -> Result<DispatchRecord, AppError> {
        let company = opportunity.company_name.as_str();
        let title = opportunity.job_title.as_str();
        let recipient = opportunity.contact_email.as_str();
        let mut stage = DispatchStage::Pending;

        state.info(format!(
            "Generating hyper-personalized cover letter targeting {title} at {company}..."
        ));
        let letter = generate_cover_letter(self.gateway, state, candidate, company, title).await?;
        stage = advance(stage, DispatchStage::LetterGenerated, company);

        match letter.fallback {
            Some(cause) if cause.is_counted() => {
                state.info("Notice: Used fallback template for cover letter.");
            }
            Some(_) => {
                state.record_log("Notice: Used fallback template for cover letter.", Severity::Fallback);
            }
            None => {}
        }

        let simulated = self.policy.is_sandbox(&opportunity);
        let delay = self.policy.delay_for(simulated);
        stage = advance(stage, DispatchStage::RateLimitWait, company);

        if simulated {
            state.info(format!(
                "Mocking sent email to {recipient} (simulated {}s delay)...",
                delay.as_secs_f64()
            ));
        } else {
            state.info(format!(
                "Preparing dispatch to {recipient} (includes {}s rate limit buffer)...",
                delay.as_secs_f64()
            ));
        }
        self.rate_limiter.wait_before_next(delay).await;

        let outcome = if simulated {
            Ok(())
        } else {
            let mail = OutgoingMail {
                sender: sender.clone(),
                recipient: recipient.to_string(),
                subject: format!("Application for {title} - {}", candidate.role),
                body: letter.text.clone(),
                attachment: resume.attachment(),
            };
            self.mailer.send(&mail).await
        };

        let failure = match outcome {
            Ok(()) => {
                stage = advance(stage, DispatchStage::Sent, company);
                state.info(format!("Successfully dispatched application to {company}"));
                None
            }
            Err(e) => {
                stage = advance(stage, DispatchStage::Failed, company);
                state.error(format!("Failed to dispatch to {company}: {e}"));
                Some(e.to_string())
            }
        };

        Ok(DispatchRecord {
            used_fallback: letter.used_fallback(),
            cover_letter: letter.text,
            simulated,
            stage,
            delay,
            failure,
            opportunity,
        })
    }
}

fn advance(from: DispatchStage, to: DispatchStage, company: &str) -> DispatchStage {
    debug_assert!(from.can_advance_to(to), "illegal dispatch transition {from:?} -> {to:?}");
    debug!("Dispatch {company}: {from:?} -> {to:?}");
    to
}
