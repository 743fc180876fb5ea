//! Run state, guard limits, and termination accounting

use std::collections::HashSet;
use std::fmt;

use super::ProblemId;

/// Guard ceilings checked before each loop iteration
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    /// Stop once this many submissions are accepted
    pub target_success: u32,
    /// Stop once this many attempts were blocked by the judge
    pub blocked_limit: u32,
    /// Stop once this many attempts were made overall
    pub attempt_limit: u32,
}

/// Why the run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalReason {
    /// Target number of accepted submissions reached
    TargetReached,
    /// Too many attempts intercepted by the judge's anti-automation layer
    BlockedLimit,
    /// Overall attempt ceiling reached
    AttemptLimit,
    /// External stop request
    Cancelled,
}

impl fmt::Display for TerminalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetReached => write!(f, "target reached"),
            Self::BlockedLimit => write!(f, "blocked limit reached"),
            Self::AttemptLimit => write!(f, "attempt limit reached"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Transient, in-memory state for one invocation
///
/// Owned exclusively by the engine and injectable for tests; nothing here
/// is persisted.
#[derive(Debug, Clone, Default)]
pub struct RunState {
    /// Accepted submissions so far
    pub success_count: u32,
    /// Submission cycles so far (every selected candidate counts)
    pub attempt_count: u32,
    /// Attempts intercepted by the judge's anti-automation layer
    pub blocked_count: u32,
    /// Problems ineligible for selection
    pub exclude: HashSet<ProblemId>,
}

impl RunState {
    pub fn new(exclude: HashSet<ProblemId>) -> Self {
        Self {
            exclude,
            ..Default::default()
        }
    }

    /// First failing guard, or `None` while the loop may continue
    ///
    /// Checked in a fixed order so the reported reason is deterministic
    /// when several ceilings fire at once.
    pub fn check_guards(&self, limits: &RunLimits) -> Option<TerminalReason> {
        if self.success_count >= limits.target_success {
            return Some(TerminalReason::TargetReached);
        }
        if self.blocked_count >= limits.blocked_limit {
            return Some(TerminalReason::BlockedLimit);
        }
        if self.attempt_count >= limits.attempt_limit {
            return Some(TerminalReason::AttemptLimit);
        }
        None
    }
}

/// Final counts handed to the summary reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub success_count: u32,
    pub attempt_count: u32,
    pub blocked_count: u32,
    pub reason: TerminalReason,
}
