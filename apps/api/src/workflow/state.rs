//! Per-run workflow state: counters, the bounded execution log, and the
//! artifacts each stage produced. Constructed fresh for every run and handed
//! to the outside world only as a `WorkflowSnapshot`.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::candidate::CandidateProfile;
use crate::models::dispatch::DispatchRecord;
use crate::models::opportunity::JobOpportunity;

/// Number of log entries retained. Older entries are dropped silently.
pub const LOG_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
    /// A generation fell back to its template. Counted in `api_fallbacks`.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowMetrics {
    pub jobs_identified: usize,
    pub successful_dispatches: usize,
    pub api_fallbacks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Started,
    Parsed,
    Discovered,
    Dispatched,
    Completed,
    Aborted,
}

#[derive(Debug)]
pub struct WorkflowState {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    phase: WorkflowPhase,
    metrics: WorkflowMetrics,
    log: VecDeque<LogEntry>,
    candidate: Option<CandidateProfile>,
    opportunities: Vec<JobOpportunity>,
    dispatches: Vec<DispatchRecord>,
    interview_guide: Option<String>,
}

/// Read-only copy of a run, serialized for API consumers.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub phase: WorkflowPhase,
    pub metrics: WorkflowMetrics,
    pub log: Vec<LogEntry>,
    pub candidate: Option<CandidateProfile>,
    pub opportunities: Vec<JobOpportunity>,
    pub dispatches: Vec<DispatchRecord>,
    pub interview_guide: Option<String>,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowState {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            phase: WorkflowPhase::Started,
            metrics: WorkflowMetrics::default(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            candidate: None,
            opportunities: Vec::new(),
            dispatches: Vec::new(),
            interview_guide: None,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn metrics(&self) -> WorkflowMetrics {
        self.metrics
    }

    /// Retained entries, oldest first.
    pub fn log(&self) -> impl Iterator<Item = &LogEntry> {
        self.log.iter()
    }

    /// Appends a timestamped entry and mirrors it to tracing.
    /// `Fallback` entries bump `api_fallbacks`.
    pub fn record_log(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Info => info!(run_id = %self.run_id, "{message}"),
            Severity::Error => error!(run_id = %self.run_id, "{message}"),
            Severity::Fallback => {
                self.metrics.api_fallbacks += 1;
                warn!(run_id = %self.run_id, "{message}");
            }
        }

        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(LogEntry {
            timestamp: Utc::now(),
            severity,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.record_log(message, Severity::Info);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.record_log(message, Severity::Error);
    }

    pub fn set_candidate(&mut self, candidate: CandidateProfile) {
        self.candidate = Some(candidate);
        self.phase = WorkflowPhase::Parsed;
    }

    /// Stores the discovered leads; `jobs_identified` always mirrors their count.
    pub fn set_opportunities(&mut self, opportunities: Vec<JobOpportunity>) {
        self.metrics.jobs_identified = opportunities.len();
        self.opportunities = opportunities;
        self.phase = WorkflowPhase::Discovered;
    }

    pub fn opportunities(&self) -> &[JobOpportunity] {
        &self.opportunities
    }

    pub fn push_dispatch(&mut self, record: DispatchRecord) {
        if record.sent() {
            self.metrics.successful_dispatches += 1;
        }
        self.dispatches.push(record);
    }

    pub fn dispatches(&self) -> &[DispatchRecord] {
        &self.dispatches
    }

    pub fn mark_dispatched(&mut self) {
        self.phase = WorkflowPhase::Dispatched;
    }

    pub fn set_interview_guide(&mut self, guide: String) {
        self.interview_guide = Some(guide);
    }

    pub fn complete(&mut self) {
        self.phase = WorkflowPhase::Completed;
    }

    pub fn abort(&mut self) {
        self.phase = WorkflowPhase::Aborted;
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        WorkflowSnapshot {
            run_id: self.run_id,
            started_at: self.started_at,
            phase: self.phase,
            metrics: self.metrics,
            log: self.log.iter().cloned().collect(),
            candidate: self.candidate.clone(),
            opportunities: self.opportunities.clone(),
            dispatches: self.dispatches.clone(),
            interview_guide: self.interview_guide.clone(),
        }
    }
}
