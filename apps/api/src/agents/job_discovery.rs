//! Job Discovery: synthesizes exactly three leads for a role and location.

use serde::Deserialize;

use crate::agents::decode::decode_or_fallback;
use crate::agents::prompts::JOB_DISCOVERY_PROMPT_TEMPLATE;
use crate::errors::AppError;
use crate::gateway::Gateway;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::OutputMode;
use crate::models::opportunity::{JobOpportunity, OPPORTUNITY_COUNT};
use crate::models::Validate;
use crate::workflow::state::WorkflowState;

/// The discovery result. Wraps the list so the count is part of validation.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct Discovered(Vec<JobOpportunity>);

impl Validate for Discovered {
    fn validate(&self) -> Result<(), String> {
        if self.0.len() != OPPORTUNITY_COUNT {
            return Err(format!(
                "expected {OPPORTUNITY_COUNT} opportunities, got {}",
                self.0.len()
            ));
        }
        self.0.validate()
    }
}

/// Deterministic leads used when discovery is unavailable. Titles follow the role.
pub fn fallback_opportunities(role: &str) -> Vec<JobOpportunity> {
    vec![
        JobOpportunity {
            company_name: "TechNova Solutions".to_string(),
            job_title: format!("Senior {role}"),
            contact_email: "careers@technova.example.com".to_string(),
        },
        JobOpportunity {
            company_name: "Quantum Innovations".to_string(),
            job_title: format!("Lead {role}"),
            contact_email: "hr@quantuminnovations.example.com".to_string(),
        },
        JobOpportunity {
            company_name: "CloudNine Systems".to_string(),
            job_title: role.to_string(),
            contact_email: "jobs@cloudninesystems.example.com".to_string(),
        },
    ]
}

pub fn build_prompt(role: &str, location: &str) -> String {
    JOB_DISCOVERY_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{location}", location)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

/// Discovers leads in insertion order. Always returns exactly three.
pub async fn discover_jobs(
    gateway: &Gateway,
    state: &mut WorkflowState,
    role: &str,
    location: &str,
) -> Result<Vec<JobOpportunity>, AppError> {
    let fallback = serde_json::to_string(&fallback_opportunities(role)).map_err(|e| {
        AppError::Configuration(format!("fallback opportunities do not serialize: {e}"))
    })?;

    let generation = gateway
        .generate(state, &build_prompt(role, location), &fallback, OutputMode::Structured)
        .await?;

    let (Discovered(opportunities), _) = decode_or_fallback::<Discovered>(&generation.text, &fallback)?;
    Ok(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_fallback_titles_derive_from_role() {
        let mut state = WorkflowState::new();
        let jobs = discover_jobs(&Gateway::offline(), &mut state, "Data Scientist", "Remote")
            .await
            .unwrap();

        let titles: Vec<_> = jobs.iter().map(|j| j.job_title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Senior Data Scientist", "Lead Data Scientist", "Data Scientist"]
        );
        assert!(jobs.iter().all(|j| j.contact_email.ends_with(".example.com")));
    }

    #[tokio::test]
    async fn test_live_leads_keep_their_order() {
        let live = r#"[
            {"company_name": "Orbital", "job_title": "ML Engineer", "contact_email": "orbital@example.recruiting.com"},
            {"company_name": "Fjord", "job_title": "Data Scientist", "contact_email": "fjord@example.recruiting.com"},
            {"company_name": "Helix", "job_title": "Analyst", "contact_email": "helix@example.recruiting.com"}
        ]"#;
        let gateway = Gateway::new(ScriptedGenerator::new(vec![Ok(live.to_string())]));
        let mut state = WorkflowState::new();

        let jobs = discover_jobs(&gateway, &mut state, "Data Scientist", "Berlin")
            .await
            .unwrap();
        let companies: Vec<_> = jobs.iter().map(|j| j.company_name.as_str()).collect();
        assert_eq!(companies, vec!["Orbital", "Fjord", "Helix"]);
    }

    #[tokio::test]
    async fn test_wrong_count_falls_back() {
        let two = r#"[
            {"company_name": "Orbital", "job_title": "ML Engineer", "contact_email": "a@orbital.io"},
            {"company_name": "Fjord", "job_title": "Data Scientist", "contact_email": "b@fjord.io"}
        ]"#;
        let gateway = Gateway::new(ScriptedGenerator::new(vec![Ok(two.to_string())]));
        let mut state = WorkflowState::new();

        let jobs = discover_jobs(&gateway, &mut state, "Data Scientist", "Remote")
            .await
            .unwrap();
        assert_eq!(jobs, fallback_opportunities("Data Scientist"));
    }

    #[tokio::test]
    async fn test_malformed_lead_falls_back_whole_list() {
        let bad = r#"[
            {"company_name": "Orbital", "job_title": "ML Engineer", "contact_email": "a@orbital.io"},
            {"company_name": "Fjord", "job_title": "", "contact_email": "b@fjord.io"},
            {"company_name": "Helix", "job_title": "Analyst", "contact_email": "c@helix.io"}
        ]"#;
        let gateway = Gateway::new(ScriptedGenerator::new(vec![Ok(bad.to_string())]));
        let mut state = WorkflowState::new();

        let jobs = discover_jobs(&gateway, &mut state, "Analyst", "Remote")
            .await
            .unwrap();
        assert_eq!(jobs, fallback_opportunities("Analyst"));
    }

    #[test]
    fn test_prompt_mentions_role_and_location() {
        let prompt = build_prompt("Data Scientist", "Lisbon");
        assert!(prompt.contains("for a Data Scientist in Lisbon"));
    }
}
