//! The run flow: submit code, await the verdict, render, settle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod advisory;
pub mod effects;
pub mod guard;
pub mod orchestrator;
pub mod sink;

pub use advisory::{AdvisoryRule, CodeAdvisor};
pub use effects::{RunControl, UiEffect};
pub use orchestrator::RunOrchestrator;
pub use sink::EffectSink;

/// Whether a run is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Submitting,
}

/// How a call to `run` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Another run was in flight; nothing happened.
    Skipped,
    Passed,
    Failed,
    SystemError(String),
}

impl RunOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, RunOutcome::Passed)
    }
}

/// Correlation id for one run, used in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(format!("run_{}", Uuid::new_v4()))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
