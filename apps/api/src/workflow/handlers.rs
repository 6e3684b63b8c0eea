//! Axum route handlers for the Workflow API.

use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::agents::interview_prep::generate_interview_prep;
use crate::config::Config;
use crate::errors::AppError;
use crate::gateway::FallbackCause;
use crate::mailer::SenderIdentity;
use crate::state::AppState;
use crate::workflow::dispatch::ResumeDocument;
use crate::workflow::runner::WorkflowInput;
use crate::workflow::state::{WorkflowSnapshot, WorkflowState};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Fields accepted by the run endpoint's multipart form.
#[derive(Debug, Default)]
pub struct RunForm {
    pub resume: Option<ResumeDocument>,
    pub role_override: Option<String>,
    pub location: Option<String>,
    pub sender_email: Option<String>,
    pub app_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct InterviewPrepRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct InterviewPrepResponse {
    pub role: String,
    pub guide: String,
    pub fallback: Option<FallbackCause>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/workflow/run
///
/// Multipart: `resume` (PDF file), optional `role_override`, `location`,
/// `sender_email`, `app_password`. Runs the whole workflow on its own task and
/// responds with the final snapshot. A disconnected client does not stop the run;
/// its snapshot still lands in `latest`.
pub async fn handle_run(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<WorkflowSnapshot>, AppError> {
    let mut form = read_run_form(multipart).await?;
    let resume = form
        .resume
        .take()
        .filter(|r| !r.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("a non-empty 'resume' file is required".to_string()))?;

    let guard = Arc::clone(&state.run_lock)
        .try_lock_owned()
        .map_err(|_| AppError::Conflict("a workflow run is already in progress".to_string()))?;

    let input = WorkflowInput {
        sender: resolve_sender(&form, &state.config),
        location: non_blank(form.location.as_deref())
            .unwrap_or(&state.config.preferred_location)
            .to_string(),
        role_override: form.role_override,
        resume,
    };

    // The run owns its task: a client that hangs up does not cancel it.
    let workflow = Arc::clone(&state.workflow);
    let latest = Arc::clone(&state.latest);
    let task = tokio::spawn(async move {
        let _guard = guard;
        let mut run = WorkflowState::new();
        info!("Starting workflow run {}", run.run_id());
        let result = workflow.run(input, &mut run).await;

        let snapshot = run.snapshot();
        *latest.write().await = Some(snapshot.clone());
        result.map(|()| snapshot)
    });

    let snapshot = task
        .await
        .map_err(|e| AppError::Internal(anyhow!("workflow task failed: {e}")))??;

    Ok(Json(snapshot))
}

/// GET /api/v1/workflow/latest
pub async fn handle_latest(
    State(state): State<AppState>,
) -> Result<Json<WorkflowSnapshot>, AppError> {
    state
        .latest
        .read()
        .await
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("no workflow has run yet".to_string()))
}

/// POST /api/v1/interview-prep
///
/// Interview guide for any role, outside a workflow run.
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    Json(request): Json<InterviewPrepRequest>,
) -> Result<Json<InterviewPrepResponse>, AppError> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }

    // Scratch state: log entries still reach tracing.
    let mut scratch = WorkflowState::new();
    let guide = generate_interview_prep(state.workflow.gateway(), &mut scratch, role).await?;

    Ok(Json(InterviewPrepResponse {
        role: role.to_string(),
        guide: guide.text,
        fallback: guide.fallback,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_run_form(mut multipart: Multipart) -> Result<RunForm, AppError> {
    let mut form = RunForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| "resume.pdf".to_string());
                let bytes: Bytes = field.bytes().await?;
                form.resume = Some(ResumeDocument { filename, bytes });
            }
            "role_override" => form.role_override = Some(field.text().await?),
            "location" => form.location = Some(field.text().await?),
            "sender_email" => form.sender_email = Some(field.text().await?),
            "app_password" => form.app_password = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

/// Request fields win over configured defaults, field by field.
fn resolve_sender(form: &RunForm, config: &Config) -> Option<SenderIdentity> {
    let email = non_blank(form.sender_email.as_deref()).or(config.sender_email.as_deref())?;
    let app_password =
        non_blank(form.app_password.as_deref()).or(config.smtp_app_password.as_deref())?;
    Some(SenderIdentity {
        email: email.to_string(),
        app_password: app_password.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
