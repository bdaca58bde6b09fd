//! Execution state shared by TES tasks and WES runs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// State of a TES task or WES run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// State cannot be determined.
    #[default]
    Unknown,
    /// Queued, not yet started.
    Queued,
    /// Resources are being prepared.
    Initializing,
    /// Executing.
    Running,
    /// Paused by the system or user.
    Paused,
    /// Finished successfully.
    Complete,
    /// An executor exited with a non-zero code.
    ExecutorError,
    /// The system failed independently of the executors.
    SystemError,
    /// Cancelled by the user.
    #[serde(alias = "CANCELLED")]
    Canceled,
    /// Cancellation in progress.
    Canceling,
    /// Preempted by the system.
    Preempted,
}

impl State {
    /// Wire spelling of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Queued => "QUEUED",
            Self::Initializing => "INITIALIZING",
            Self::Running => "RUNNING",
            Self::Paused => "PAUSED",
            Self::Complete => "COMPLETE",
            Self::ExecutorError => "EXECUTOR_ERROR",
            Self::SystemError => "SYSTEM_ERROR",
            Self::Canceled => "CANCELED",
            Self::Canceling => "CANCELING",
            Self::Preempted => "PREEMPTED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
