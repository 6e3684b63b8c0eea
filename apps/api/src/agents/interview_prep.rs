//! Interview Prep: ten questions for the target role.
//!
//! The role shapes only the live prompt. The fallback guide is the same
//! generic list for every role.

use crate::agents::prompts::{INTERVIEW_PREP_FALLBACK, INTERVIEW_PREP_PROMPT_TEMPLATE};
use crate::errors::AppError;
use crate::gateway::{Gateway, Generation};
use crate::llm_client::OutputMode;
use crate::workflow::state::WorkflowState;

pub fn build_prompt(role: &str) -> String {
    INTERVIEW_PREP_PROMPT_TEMPLATE.replace("{role}", role)
}

pub async fn generate_interview_prep(
    gateway: &Gateway,
    state: &mut WorkflowState,
    role: &str,
) -> Result<Generation, AppError> {
    gateway
        .generate(state, &build_prompt(role), INTERVIEW_PREP_FALLBACK, OutputMode::FreeText)
        .await
}
