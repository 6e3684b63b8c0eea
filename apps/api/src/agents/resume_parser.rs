//! Resume Parser: turns extracted resume text into a `CandidateProfile`.

use crate::agents::decode::decode_or_fallback;
use crate::agents::prompts::RESUME_PARSE_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::OutputMode;
use crate::models::candidate::{CandidateProfile, ExperienceLevel};
use crate::workflow::state::WorkflowState;

/// Profile assumed when the resume cannot be parsed.
pub fn fallback_profile() -> CandidateProfile {
    CandidateProfile {
        role: "Software Engineer".to_string(),
        skills: vec![
            "Python".to_string(),
            "Problem Solving".to_string(),
            "Communication".to_string(),
        ],
        experience_level: ExperienceLevel::Mid,
    }
}

pub fn build_prompt(resume_text: &str) -> String {
    RESUME_PARSE_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{resume_text}", resume_text)
}

/// Parses a resume. Decode failures are absorbed: the caller always gets a
/// valid profile, the fallback one if need be.
pub async fn parse_resume(
    gateway: &Gateway,
    state: &mut WorkflowState,
    resume_text: &str,
) -> Result<CandidateProfile, AppError> {
    let fallback = serde_json::to_string(&fallback_profile())
        .map_err(|e| AppError::Configuration(format!("fallback profile does not serialize: {e}")))?;

    let generation = gateway
        .generate(state, &build_prompt(resume_text), &fallback, OutputMode::Structured)
        .await?;

    let (profile, _) = decode_or_fallback::<CandidateProfile>(&generation.text, &fallback)?;
    Ok(profile)
}
