//! Workflow Runner: one end-to-end run for one resume.
//!
//! Flow: extract text → parse resume → role override → discover jobs →
//!       dispatch loop → interview prep.
//!
//! Provider, decode and transport failures degrade inside the stages. Only a
//! missing sender identity (checked up front) or an unreadable resume aborts.

use std::sync::Arc;

use crate::agents::interview_prep::generate_interview_prep;
use crate::agents::job_discovery::discover_jobs;
use crate::agents::resume_parser::parse_resume;
use crate::document::TextExtractor;
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::mailer::{MailTransport, SenderIdentity};
use crate::workflow::dispatch::{DispatchPolicy, Dispatcher, ResumeDocument};
use crate::workflow::rate_limiter::RateLimiter;
use crate::workflow::state::{WorkflowPhase, WorkflowState};

/// Operator input for one run.
#[derive(Debug, Clone)]
pub struct WorkflowInput {
    pub resume: ResumeDocument,
    pub sender: Option<SenderIdentity>,
    pub role_override: Option<String>,
    pub location: String,
}

/// The wired-up pipeline. Cheap to share behind an `Arc`.
pub struct Workflow {
    gateway: Gateway,
    mailer: Arc<dyn MailTransport>,
    rate_limiter: Arc<dyn RateLimiter>,
    extractor: Arc<dyn TextExtractor>,
    policy: DispatchPolicy,
}

impl Workflow {
    pub fn new(
        gateway: Gateway,
        mailer: Arc<dyn MailTransport>,
        rate_limiter: Arc<dyn RateLimiter>,
        extractor: Arc<dyn TextExtractor>,
        policy: DispatchPolicy,
    ) -> Self {
        Self {
            gateway,
            mailer,
            rate_limiter,
            extractor,
            policy,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Runs every stage against `state`. On error the state is left in the
    /// `Aborted` phase with the reason logged.
    pub async fn run(&self, input: WorkflowInput, state: &mut WorkflowState) -> Result<(), AppError> {
        let result = self.run_stages(input, state).await;
        settle(state, result)
    }

    async fn run_stages(
        &self,
        input: WorkflowInput,
        state: &mut WorkflowState,
    ) -> Result<(), AppError> {
        let Some(sender) = input.sender.filter(|s| {
            !s.email.trim().is_empty() && !s.app_password.trim().is_empty()
        }) else {
            state.error("Workflow aborted: Missing SMTP credentials");
            state.abort();
            return Err(AppError::Validation(
                "Please configure your sender email and app password.".to_string(),
            ));
        };

        state.info("Initializing application workflow...");

        // Step 1: Extraction
        state.info("Reading PDF resume...");
        let resume_text = self.extractor.extract_text(input.resume.bytes.clone()).await;
        if resume_text.trim().is_empty() {
            state.error("Failed to extract text from PDF.");
            state.abort();
            return Err(AppError::Extraction(
                "Could not extract text. Check the PDF format.".to_string(),
            ));
        }

        // Step 2: Parsing + override
        state.info("Analyzing resume content via LLM agent...");
        let mut candidate = parse_resume(&self.gateway, state, &resume_text).await?;
        if let Some(role) = input
            .role_override
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            state.info(format!("Applying manual role override: {role}"));
            candidate = candidate.with_role_override(Some(role));
        }
        state.info(format!(
            "Analysis complete -> Role: {} | Level: {}",
            candidate.role, candidate.experience_level
        ));
        state.set_candidate(candidate.clone());

        // Step 3: Discovery
        state.info(format!(
            "Initiating discovery agent for {} positions in {}...",
            candidate.role, input.location
        ));
        let opportunities =
            discover_jobs(&self.gateway, state, &candidate.role, &input.location).await?;
        state.info(format!("Discovered {} targeted opportunities.", opportunities.len()));
        state.set_opportunities(opportunities);

        // Step 4: Dispatch
        let dispatcher = Dispatcher {
            gateway: &self.gateway,
            mailer: self.mailer.as_ref(),
            rate_limiter: self.rate_limiter.as_ref(),
            policy: &self.policy,
        };
        dispatcher
            .dispatch_all(state, &candidate, &sender, &input.resume)
            .await?;

        // Step 5: Interview prep
        state.info("Initializing post-process action: interview prep agent...");
        let guide = generate_interview_prep(&self.gateway, state, &candidate.role).await?;
        state.set_interview_guide(guide.text);
        state.info("Interview guide ready.");

        state.complete();
        state.info("All tasks completed.");
        Ok(())
    }
}

/// Stages that abort on their own have already logged why. Anything else
/// escaping a stage is logged here before the run is marked aborted.
fn settle(state: &mut WorkflowState, result: Result<(), AppError>) -> Result<(), AppError> {
    if let Err(e) = &result {
        if state.phase() != WorkflowPhase::Aborted {
            state.error(format!("Workflow aborted: {e}"));
            state.abort();
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::agents::prompts::INTERVIEW_PREP_FALLBACK;
    use crate::mailer::SendError;
    use crate::models::dispatch::DispatchStage;
    use crate::testing::{FakeMailer, RecordingRateLimiter, ScriptedGenerator, StaticExtractor};
    use crate::workflow::state::Severity;

    const RESUME_TEXT: &str = "Jane Doe - Data Scientist - Python, SQL, PyTorch";

    fn workflow(
        gateway: Gateway,
        mailer: Arc<FakeMailer>,
        limiter: Arc<RecordingRateLimiter>,
        text: &'static str,
    ) -> Workflow {
        Workflow::new(
            gateway,
            mailer,
            limiter,
            Arc::new(StaticExtractor(text)),
            DispatchPolicy::default(),
        )
    }

    fn input(role_override: Option<&str>) -> WorkflowInput {
        WorkflowInput {
            resume: ResumeDocument {
                filename: "jane.pdf".to_string(),
                bytes: Bytes::from_static(b"%PDF-1.7"),
            },
            sender: Some(SenderIdentity {
                email: "jane@mail.com".to_string(),
                app_password: "app-pass".to_string(),
            }),
            role_override: role_override.map(str::to_string),
            location: "Remote".to_string(),
        }
    }

    #[tokio::test]
    async fn test_offline_run_completes_with_fallbacks() {
        let mailer = Arc::new(FakeMailer::succeeding());
        let limiter = Arc::new(RecordingRateLimiter::default());
        let wf = workflow(Gateway::offline(), mailer.clone(), limiter.clone(), RESUME_TEXT);
        let mut state = WorkflowState::new();

        wf.run(input(None), &mut state).await.unwrap();

        let snapshot = state.snapshot();
        assert_eq!(snapshot.phase, WorkflowPhase::Completed);
        assert_eq!(snapshot.candidate.unwrap().role, "Software Engineer");
        assert_eq!(snapshot.metrics.jobs_identified, 3);
        assert_eq!(snapshot.metrics.successful_dispatches, 3);
        assert_eq!(snapshot.metrics.api_fallbacks, 3);
        assert_eq!(snapshot.interview_guide.as_deref(), Some(INTERVIEW_PREP_FALLBACK));
        // Fallback leads are all sandbox addresses.
        assert!(mailer.sent().is_empty());
        assert_eq!(limiter.delays().len(), 3);
    }

    #[tokio::test]
    async fn test_role_override_drives_discovery() {
        let mailer = Arc::new(FakeMailer::succeeding());
        let limiter = Arc::new(RecordingRateLimiter::default());
        let wf = workflow(Gateway::offline(), mailer, limiter, RESUME_TEXT);
        let mut state = WorkflowState::new();

        wf.run(input(Some("Data Scientist")), &mut state).await.unwrap();

        let titles: Vec<_> = state
            .opportunities()
            .iter()
            .map(|o| o.job_title.clone())
            .collect();
        assert_eq!(
            titles,
            vec!["Senior Data Scientist", "Lead Data Scientist", "Data Scientist"]
        );
    }

    #[tokio::test]
    async fn test_empty_extraction_aborts_before_any_generation() {
        let backend = ScriptedGenerator::new(vec![]);
        let mailer = Arc::new(FakeMailer::succeeding());
        let limiter = Arc::new(RecordingRateLimiter::default());
        let wf = workflow(Gateway::new(backend.clone()), mailer.clone(), limiter.clone(), "  ");
        let mut state = WorkflowState::new();

        let result = wf.run(input(None), &mut state).await;

        assert!(matches!(result, Err(AppError::Extraction(_))));
        assert_eq!(state.phase(), WorkflowPhase::Aborted);
        assert!(backend.calls().is_empty());
        assert!(limiter.delays().is_empty());
        assert!(state.dispatches().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_abort_up_front() {
        let mailer = Arc::new(FakeMailer::succeeding());
        let limiter = Arc::new(RecordingRateLimiter::default());
        let wf = workflow(Gateway::offline(), mailer, limiter, RESUME_TEXT);
        let mut state = WorkflowState::new();

        let mut no_password = input(None);
        no_password.sender = Some(SenderIdentity {
            email: "jane@mail.com".to_string(),
            app_password: String::new(),
        });
        let result = wf.run(no_password, &mut state).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(state.phase(), WorkflowPhase::Aborted);
        assert!(state.log().any(|e| e.message.contains("Missing SMTP credentials")));
    }

    #[test]
    fn test_stage_error_marks_the_run_aborted() {
        let mut state = WorkflowState::new();
        state.info("Analyzing resume content via LLM agent...");

        let result = settle(
            &mut state,
            Err(AppError::Configuration("fallback payload does not decode".to_string())),
        );

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert_eq!(state.phase(), WorkflowPhase::Aborted);
        let last = state.log().last().unwrap();
        assert_eq!(last.severity, Severity::Error);
        assert!(last.message.contains("fallback payload does not decode"));
    }

    #[test]
    fn test_settle_does_not_relog_an_aborted_run() {
        let mut state = WorkflowState::new();
        state.error("Failed to extract text from PDF.");
        state.abort();

        let _ = settle(&mut state, Err(AppError::Extraction("unreadable".to_string())));

        assert_eq!(state.log().count(), 1);
    }

    #[test]
    fn test_settle_leaves_successful_runs_alone() {
        let mut state = WorkflowState::new();
        state.complete();
        assert!(settle(&mut state, Ok(())).is_ok());
        assert_eq!(state.phase(), WorkflowPhase::Completed);
    }

    #[tokio::test]
    async fn test_transport_failures_do_not_abort_the_run() {
        let live_profile = r#"{"role": "Data Scientist", "skills": ["Python", "SQL", "PyTorch", "Statistics", "Spark"], "experience_level": "Mid"}"#;
        let live_leads = r#"[
            {"company_name": "Orbital", "job_title": "Data Scientist", "contact_email": "hr@orbital.io"},
            {"company_name": "Fjord", "job_title": "ML Scientist", "contact_email": "hr@fjord.io"},
            {"company_name": "Helix", "job_title": "Analyst", "contact_email": "hr@helix.io"}
        ]"#;
        let backend = ScriptedGenerator::new(vec![
            Ok(live_profile.to_string()),
            Ok(live_leads.to_string()),
            Ok("Letter one".to_string()),
            Ok("Letter two".to_string()),
            Ok("Letter three".to_string()),
            Ok("1. Explain bias vs variance.".to_string()),
        ]);
        let mailer = Arc::new(FakeMailer::failing(|| SendError::Authentication));
        let limiter = Arc::new(RecordingRateLimiter::default());
        let wf = workflow(Gateway::new(backend), mailer.clone(), limiter.clone(), RESUME_TEXT);
        let mut state = WorkflowState::new();

        wf.run(input(None), &mut state).await.unwrap();

        assert_eq!(state.phase(), WorkflowPhase::Completed);
        assert_eq!(state.dispatches().len(), 3);
        assert!(state
            .dispatches()
            .iter()
            .all(|r| r.stage == DispatchStage::Failed && !r.used_fallback));
        assert_eq!(state.metrics().successful_dispatches, 0);
        assert_eq!(state.metrics().api_fallbacks, 0);
        assert_eq!(mailer.attempts(), 3);
        assert_eq!(limiter.delays(), vec![crate::workflow::dispatch::DEFAULT_DISPATCH_DELAY; 3]);
    }
}
