use std::fmt;

use serde::Serialize;

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Accepted,
    Exhausted,
    Aborted,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunStatus::Accepted => "accepted",
            RunStatus::Exhausted => "exhausted",
            RunStatus::Aborted => "aborted",
        };
        write!(f, "{label}")
    }
}

/// Suspension points at which a run can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Generating,
    Evaluating,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Generating => "generating",
            Phase::Evaluating => "evaluating",
        };
        write!(f, "{label}")
    }
}
