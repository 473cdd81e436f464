//! Workflow outcomes

use std::fmt;
use tracing::{error, info};

/// How a workflow that ran to completion ended.
///
/// A `Failed` outcome means the tool worked but the task did not: an external
/// command exited non-zero or a file could not be moved. The process still
/// exits successfully in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Something was created, changed, or written.
    Success(String),
    /// Nothing needed doing; existing state was confirmed.
    Skipped(String),
    /// The task was attempted and did not complete; holds the reason.
    Failed(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(msg) | Self::Skipped(msg) | Self::Failed(msg) => msg,
        }
    }

    /// Log the outcome at the level it deserves.
    pub fn report(&self) {
        match self {
            Self::Success(msg) | Self::Skipped(msg) => info!("{}", msg),
            Self::Failed(reason) => error!("{}", reason),
        }
    }

    /// Build a `Failed` outcome from a context message and its cause.
    pub(crate) fn failed(context: impl fmt::Display, cause: impl Into<anyhow::Error>) -> Self {
        Self::Failed(format!("{} {:#}", context, cause.into()))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
