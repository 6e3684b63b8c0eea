use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::opportunity::JobOpportunity;

/// Lifecycle of one opportunity inside the dispatch loop.
/// `Sent` and `Failed` are terminal; a failed dispatch is never retried within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStage {
    Pending,
    LetterGenerated,
    RateLimitWait,
    Sent,
    Failed,
}

impl DispatchStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, DispatchStage::Sent | DispatchStage::Failed)
    }

    /// Whether the loop may move from `self` to `next`.
    pub fn can_advance_to(self, next: DispatchStage) -> bool {
        use DispatchStage::*;
        matches!(
            (self, next),
            (Pending, LetterGenerated)
                | (LetterGenerated, RateLimitWait)
                | (RateLimitWait, Sent)
                | (RateLimitWait, Failed)
        )
    }
}

/// Outcome of dispatching to one opportunity. Built once, never mutated.
///
/// `used_fallback` and `simulated` are independent: a real recipient can
/// still receive a template letter, and a sandbox recipient can get a live one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchRecord {
    pub opportunity: JobOpportunity,
    pub cover_letter: String,
    pub used_fallback: bool,
    pub simulated: bool,
    pub stage: DispatchStage,
    #[serde(with = "duration_secs")]
    pub delay: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl DispatchRecord {
    pub fn sent(&self) -> bool {
        self.stage == DispatchStage::Sent
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_transitions_follow_the_happy_path() {
        use DispatchStage::*;
        assert!(Pending.can_advance_to(LetterGenerated));
        assert!(LetterGenerated.can_advance_to(RateLimitWait));
        assert!(RateLimitWait.can_advance_to(Sent));
        assert!(RateLimitWait.can_advance_to(Failed));
    }

    #[test]
    fn test_terminal_stages_do_not_advance() {
        use DispatchStage::*;
        for next in [Pending, LetterGenerated, RateLimitWait, Sent, Failed] {
            assert!(!Sent.can_advance_to(next));
            assert!(!Failed.can_advance_to(next));
        }
        assert!(Sent.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!RateLimitWait.is_terminal());
    }

    #[test]
    fn test_letter_cannot_skip_the_rate_limit() {
        assert!(!DispatchStage::LetterGenerated.can_advance_to(DispatchStage::Sent));
        assert!(!DispatchStage::Pending.can_advance_to(DispatchStage::RateLimitWait));
    }

    #[test]
    fn test_record_serializes_delay_in_seconds() {
        let record = DispatchRecord {
            opportunity: JobOpportunity {
                company_name: "Acme".to_string(),
                job_title: "SRE".to_string(),
                contact_email: "hr@acme.example.com".to_string(),
            },
            cover_letter: "Dear Hiring Manager".to_string(),
            used_fallback: true,
            simulated: true,
            stage: DispatchStage::Sent,
            delay: Duration::from_secs(3),
            failure: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["delay"], 3.0);
        assert_eq!(value["stage"], "sent");
        assert!(value.get("failure").is_none());
        assert!(record.sent());
    }
}
