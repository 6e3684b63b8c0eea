use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::config::Config;
use crate::workflow::runner::Workflow;
use crate::workflow::state::WorkflowSnapshot;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub config: Config,
    /// Held for the whole duration of a run. Only one run may be active.
    pub run_lock: Arc<Mutex<()>>,
    /// Snapshot of the most recent run, completed or aborted.
    pub latest: Arc<RwLock<Option<WorkflowSnapshot>>>,
}

impl AppState {
    pub fn new(workflow: Workflow, config: Config) -> Self {
        Self {
            workflow: Arc::new(workflow),
            config,
            run_lock: Arc::new(Mutex::new(())),
            latest: Arc::new(RwLock::new(None)),
        }
    }
}
