// Workflow: per-run state, throttling, the dispatch loop, and the runner
// that strings the agents together. Handlers expose it over HTTP.

pub mod dispatch;
pub mod handlers;
pub mod rate_limiter;
pub mod runner;
pub mod state;
