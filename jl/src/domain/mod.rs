//! Domain types for judge submission runs
//!
//! [`AttemptOutcome`] classifies a single submission; [`RunState`] and
//! [`RunLimits`] carry the counters and guards the engine loops over.

mod outcome;
mod run;

pub use outcome::AttemptOutcome;
pub use run::{RunLimits, RunReport, RunState, TerminalReason};

/// Integer identifier of a single problem in the judge's catalog
pub use progresstore::ProblemId;
