//! Wire types for asynchronous control-plane tasks.
//!
//! Mutating API calls that provision infrastructure return a task handle
//! (`taskUUID`) instead of a finished resource. The task itself is owned by
//! the remote system; this client only observes it through the task-status
//! endpoint until it reaches a terminal condition.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle status reported by the task-status endpoint.
///
/// Statuses not known to this client deserialize as [`TaskStatus::Unknown`]
/// rather than failing, since the control plane may add states over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task has been accepted but not yet scheduled.
    Created,
    /// Task is preparing to run.
    Initializing,
    /// Task is actively running.
    Running,
    /// Task finished successfully (terminal).
    Success,
    /// Task failed (terminal).
    Failure,
    /// Task abort has been requested.
    Abort,
    /// Task was aborted (terminal).
    Aborted,
    /// Any status string this client does not recognize.
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// Returns `true` if this status alone means the task will make no
    /// further progress, regardless of the reported percentage.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failure | Self::Aborted)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "Created",
            Self::Initializing => "Initializing",
            Self::Running => "Running",
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Abort => "Abort",
            Self::Aborted => "Aborted",
            Self::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// A snapshot of a remote task's progress.
///
/// Fields beyond the ones this client branches on are preserved verbatim in
/// `extra` so callers can inspect the full last-known document, which
/// matters when a poll times out and the snapshot is all they get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub percent: u32,
    /// Lifecycle status reported by the control plane.
    pub status: TaskStatus,
    /// Remaining response fields, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Returns `true` if this snapshot is terminal: the task reported full
    /// completion or a status that rules out further progress.
    ///
    /// A task at 100 percent is terminal whatever its status says, and a
    /// `Failure` or `Aborted` status is terminal at any percentage.
    pub fn is_terminal(&self) -> bool {
        self.percent >= 100 || self.status.is_failed()
    }
}

/// Outcome of observing a submission that may have produced a task.
///
/// The tagged shape lets callers tell a genuinely terminal task apart from
/// one that merely exhausted the wait budget, without re-deriving that from
/// the snapshot's fields.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// The submission carried no task handle, or waiting was not requested;
    /// the original response is returned unchanged.
    Immediate(Value),
    /// The task reached a terminal condition within the wait budget.
    Completed(Task),
    /// The wait budget elapsed; this is the last snapshot observed and may
    /// describe work that is still in progress.
    TimedOut(Task),
}

impl TaskOutcome {
    /// The task snapshot, if polling happened at all.
    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Immediate(_) => None,
            Self::Completed(task) | Self::TimedOut(task) => Some(task),
        }
    }

    /// Returns `true` if the task was observed in a terminal state.
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}
