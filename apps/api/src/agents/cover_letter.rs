//! Cover Letter: free-text letter per opportunity. No decode step.

use crate::agents::prompts::COVER_LETTER_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::gateway::{Gateway, Generation};
use crate::llm_client::prompts::NO_PLACEHOLDER_INSTRUCTION;
use crate::llm_client::OutputMode;
use crate::models::candidate::CandidateProfile;
use crate::workflow::state::WorkflowState;

/// Skills quoted in the fallback letter.
const FALLBACK_SKILL_COUNT: usize = 3;

pub fn fallback_letter(candidate: &CandidateProfile, company_name: &str, job_title: &str) -> String {
    format!(
        "Dear Hiring Manager at {company_name},\n\n\
        I am writing to express my strong interest in the {job_title} role. \
        As a {level}-level {role} with experience in {skills}, \
        I am confident I would be a valuable addition to your team.\n\n\
        Please find my resume attached.\n\n\
        Best regards,\n\
        A Dedicated Professional",
        level = candidate.experience_level,
        role = candidate.role,
        skills = candidate.leading_skills(FALLBACK_SKILL_COUNT),
    )
}

pub fn build_prompt(candidate: &CandidateProfile, company_name: &str, job_title: &str) -> String {
    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{role}", &candidate.role)
        .replace("{experience_level}", &candidate.experience_level.to_string())
        .replace("{skills}", &candidate.skills.join(", "))
        .replace("{company_name}", company_name)
        .replace("{job_title}", job_title)
        .replace("{no_placeholders}", NO_PLACEHOLDER_INSTRUCTION)
}

/// Generates the letter. The returned `Generation` says whether the template was used.
pub async fn generate_cover_letter(
    gateway: &Gateway,
    state: &mut WorkflowState,
    candidate: &CandidateProfile,
    company_name: &str,
    job_title: &str,
) -> Result<Generation, AppError> {
    gateway
        .generate(
            state,
            &build_prompt(candidate, company_name, job_title),
            &fallback_letter(candidate, company_name, job_title),
            OutputMode::FreeText,
        )
        .await
}
