use std::fmt;

use serde::{Deserialize, Serialize};

use super::Validate;

/// Upper bound on skills a profile may carry. The parse prompt asks for 5-10.
pub const MAX_SKILLS: usize = 10;

/// Seniority bucket assigned by the resume parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    #[default]
    Mid,
    Senior,
    Executive,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        };
        f.write_str(label)
    }
}

/// Structured view of a resume. Exactly these three keys are accepted when
/// decoding; anything extra or missing sends the parser down its fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CandidateProfile {
    pub role: String,
    pub skills: Vec<String>,
    pub experience_level: ExperienceLevel,
}

impl CandidateProfile {
    /// Replaces the role when the operator supplied a non-blank override.
    /// The role is the only field an override may touch.
    pub fn with_role_override(mut self, role_override: Option<&str>) -> Self {
        if let Some(role) = role_override.map(str::trim).filter(|r| !r.is_empty()) {
            self.role = role.to_string();
        }
        self
    }

    /// The first `n` skills joined for prose, e.g. "Rust, SQL, Kafka".
    pub fn leading_skills(&self, n: usize) -> String {
        self.skills
            .iter()
            .take(n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Validate for CandidateProfile {
    fn validate(&self) -> Result<(), String> {
        if self.role.trim().is_empty() {
            return Err("role is blank".to_string());
        }
        if self.skills.is_empty() || self.skills.len() > MAX_SKILLS {
            return Err(format!(
                "expected 1-{MAX_SKILLS} skills, got {}",
                self.skills.len()
            ));
        }
        if self.skills.iter().any(|s| s.trim().is_empty()) {
            return Err("skills contain a blank entry".to_string());
        }
        Ok(())
    }
}
