//! Common types used throughout pageloader
//!
//! Shared enums describing load cycle progress, used by the loader,
//! the scroll trigger and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Loading Phase
// ============================================================================

/// Phase of the current load cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingPhase {
    /// Nothing started, or the last cycle was cancelled
    #[default]
    Idle,
    /// A cycle was requested and is about to fetch
    Starting,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Success,
    /// The last fetch failed
    Error,
}

impl LoadingPhase {
    /// True while a cycle owns the loader (Starting or Loading)
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Starting | Self::Loading)
    }
}

impl fmt::Display for LoadingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Load Outcome
// ============================================================================

/// What a call to `start()` or `load_next()` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new load cycle was spawned
    Started,
    /// A cycle was already running; nothing was spawned
    AlreadyLoading,
    /// `start()` was called on a loader that has already started
    AlreadyStarted,
    /// End of data was reached; the one-time notice flag was just flipped
    EndNotice,
    /// End of data was reached and the notice was already shown
    Exhausted,
}

impl LoadOutcome {
    /// Whether this call caused a fetch
    pub fn is_started(self) -> bool {
        matches!(self, Self::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_default_is_idle() {
        assert_eq!(LoadingPhase::default(), LoadingPhase::Idle);
    }

    #[test]
    fn test_phase_busy() {
        assert!(LoadingPhase::Starting.is_busy());
        assert!(LoadingPhase::Loading.is_busy());
        assert!(!LoadingPhase::Idle.is_busy());
        assert!(!LoadingPhase::Success.is_busy());
        assert!(!LoadingPhase::Error.is_busy());
    }

    #[test]
    fn test_phase_serde() {
        let json = serde_json::to_string(&LoadingPhase::Success).unwrap();
        assert_eq!(json, "\"success\"");
        assert_eq!(LoadingPhase::Loading.to_string(), "loading");
    }

    #[test]
    fn test_outcome_is_started() {
        assert!(LoadOutcome::Started.is_started());
        assert!(!LoadOutcome::EndNotice.is_started());
        assert!(!LoadOutcome::AlreadyLoading.is_started());
    }
}
