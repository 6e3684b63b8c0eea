use serde::{Deserialize, Serialize};

use super::Validate;

/// Discovery always yields exactly this many opportunities.
pub const OPPORTUNITY_COUNT: usize = 3;

/// A (synthesized) job lead. Read-only once discovery produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOpportunity {
    pub company_name: String,
    pub job_title: String,
    pub contact_email: String,
}

impl JobOpportunity {
    /// Domain part of the contact address, lowercased.
    pub fn recipient_domain(&self) -> Option<String> {
        self.contact_email
            .rsplit_once('@')
            .map(|(_, domain)| domain.trim().to_lowercase())
            .filter(|d| !d.is_empty())
    }
}

impl Validate for JobOpportunity {
    fn validate(&self) -> Result<(), String> {
        if self.company_name.trim().is_empty() {
            return Err("company_name is blank".to_string());
        }
        if self.job_title.trim().is_empty() {
            return Err("job_title is blank".to_string());
        }
        let well_formed = match self.contact_email.trim().split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !well_formed {
            return Err(format!("contact_email '{}' is not an address", self.contact_email));
        }
        Ok(())
    }
}
