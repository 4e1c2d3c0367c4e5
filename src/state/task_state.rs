/// Task state definitions for tracking mirror progress
///
/// This module defines the lifecycle a task moves through during a run.
use std::fmt;

/// How a completed task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskOutcome {
    /// The resource was fetched, rewritten if needed, and written to disk
    Saved,

    /// Transport failure or non-2xx status
    NetworkFailed,

    /// Directory creation or file write failed
    StoreFailed,
}

impl TaskOutcome {
    /// Returns true if the resource made it to disk
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Returns the short name used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::NetworkFailed => "network_failed",
            Self::StoreFailed => "store_failed",
        }
    }
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents the current state of a task in the mirror process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// A reference was found but not yet admitted
    Discovered,

    /// Admitted through the visited set and counted as live
    Enqueued,

    /// Holding a pool slot and fetching or processing
    InFlight,

    /// Finished, successfully or not
    Completed(TaskOutcome),
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Returns true if the task counts towards the live-task counter
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Enqueued | Self::InFlight)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Tasks only move forward: Discovered → Enqueued → InFlight →
    /// Completed. An enqueued task may also complete without ever getting a
    /// slot.
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Enqueued)
                | (Self::Enqueued, Self::InFlight)
                | (Self::Enqueued, Self::Completed(_))
                | (Self::InFlight, Self::Completed(_))
        )
    }

    /// Returns the short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Enqueued => "enqueued",
            Self::InFlight => "in_flight",
            Self::Completed(outcome) => outcome.as_str(),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!TaskState::Discovered.is_terminal());
        assert!(!TaskState::Enqueued.is_terminal());
        assert!(!TaskState::InFlight.is_terminal());
        assert!(TaskState::Completed(TaskOutcome::Saved).is_terminal());
        assert!(TaskState::Completed(TaskOutcome::NetworkFailed).is_terminal());
    }

    #[test]
    fn test_is_live() {
        assert!(TaskState::Enqueued.is_live());
        assert!(TaskState::InFlight.is_live());
        assert!(!TaskState::Discovered.is_live());
        assert!(!TaskState::Completed(TaskOutcome::StoreFailed).is_live());
    }

    #[test]
    fn test_forward_transitions() {
        assert!(TaskState::Discovered.can_transition_to(TaskState::Enqueued));
        assert!(TaskState::Enqueued.can_transition_to(TaskState::InFlight));
        assert!(TaskState::InFlight.can_transition_to(TaskState::Completed(TaskOutcome::Saved)));
        assert!(TaskState::Enqueued
            .can_transition_to(TaskState::Completed(TaskOutcome::NetworkFailed)));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!TaskState::InFlight.can_transition_to(TaskState::Enqueued));
        assert!(!TaskState::Completed(TaskOutcome::Saved).can_transition_to(TaskState::InFlight));
        assert!(!TaskState::Discovered.can_transition_to(TaskState::InFlight));
        assert!(!TaskState::Enqueued.can_transition_to(TaskState::Enqueued));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", TaskState::InFlight), "in_flight");
        assert_eq!(
            format!("{}", TaskState::Completed(TaskOutcome::NetworkFailed)),
            "network_failed"
        );
        assert!(TaskOutcome::Saved.is_success());
        assert!(!TaskOutcome::StoreFailed.is_success());
    }
}
