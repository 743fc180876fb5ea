//! Attempt outcome classification

use std::fmt;

/// Classification of a single submission attempt
///
/// Terminal outcomes end the problem's lifecycle; `RateLimited` and
/// `TransportError` mean the problem was never actually judged and stays
/// eligible for a future retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Submission accepted by the judge
    Success,
    /// Judged, answer rejected
    WrongAnswer,
    /// Judged, solution failed to compile
    CompileError,
    /// Judged, solution crashed or exceeded a resource limit
    RuntimeError,
    /// The judge's anti-automation layer intercepted the request
    RateLimited,
    /// The judge could not be reached at all
    TransportError,
    /// Judged, verdict string not recognized
    Unknown,
}

impl AttemptOutcome {
    /// Whether this outcome ends the problem's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::RateLimited | Self::TransportError)
    }

    /// Map a judge verdict string to an outcome
    ///
    /// Verdict strings are owned by the remote service; anything
    /// unrecognized is `Unknown` rather than an error.
    pub fn from_verdict(verdict: &str) -> Self {
        match verdict {
            "Accepted" => Self::Success,
            "Wrong Answer" => Self::WrongAnswer,
            "Compile Error" => Self::CompileError,
            "Runtime Error" | "Time Limit Exceeded" | "Memory Limit Exceeded" | "Output Limit Exceeded" => {
                Self::RuntimeError
            }
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "accepted"),
            Self::WrongAnswer => write!(f, "wrong answer"),
            Self::CompileError => write!(f, "compile error"),
            Self::RuntimeError => write!(f, "runtime error"),
            Self::RateLimited => write!(f, "rate limited"),
            Self::TransportError => write!(f, "transport error"),
            Self::Unknown => write!(f, "unknown verdict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_mapping() {
        assert_eq!(AttemptOutcome::from_verdict("Accepted"), AttemptOutcome::Success);
        assert_eq!(AttemptOutcome::from_verdict("Wrong Answer"), AttemptOutcome::WrongAnswer);
        assert_eq!(AttemptOutcome::from_verdict("Compile Error"), AttemptOutcome::CompileError);
        assert_eq!(
            AttemptOutcome::from_verdict("Time Limit Exceeded"),
            AttemptOutcome::RuntimeError
        );
        assert_eq!(AttemptOutcome::from_verdict("???"), AttemptOutcome::Unknown);
    }

    #[test]
    fn test_only_blocked_and_transport_are_non_terminal() {
        assert!(AttemptOutcome::Success.is_terminal());
        assert!(AttemptOutcome::WrongAnswer.is_terminal());
        assert!(AttemptOutcome::Unknown.is_terminal());
        assert!(!AttemptOutcome::RateLimited.is_terminal());
        assert!(!AttemptOutcome::TransportError.is_terminal());
    }
}
