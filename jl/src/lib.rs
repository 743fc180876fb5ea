//! JudgeLoop - automated judge submission runner
//!
//! JudgeLoop drives repeated submission attempts against a remote coding
//! judge until a target number of accepted submissions is reached or a
//! failure budget is exhausted. Each cycle selects a random eligible
//! problem, submits its stored solution, classifies the verdict, persists
//! progress, and paces itself before the next attempt.
//!
//! # Core Concepts
//!
//! - **One channel, no client retries**: the judge client is transport
//!   only; retry and back-off policy live in the engine.
//! - **State in files**: terminal outcomes persist via [`progresstore`],
//!   flushed after every mutation.
//! - **Bounded everything**: random draws, attempts, and blocked responses
//!   all run against explicit budgets, so every run terminates.
//!
//! # Modules
//!
//! - [`judge`] - judge client trait and LeetCode implementation
//! - [`engine`] - the select/submit/classify/pace loop
//! - [`select`] - bounded random candidate selection
//! - [`exclusion`] - solved+skipped exclusion set construction
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod exclusion;
pub mod judge;
pub mod select;
pub mod summary;

// Re-export commonly used types
pub use config::{Config, ResolvedConfig};
pub use domain::{AttemptOutcome, ProblemId, RunLimits, RunReport, RunState, TerminalReason};
pub use engine::{EngineConfig, SubmitEngine};
pub use exclusion::build_exclusion;
pub use judge::{JudgeClient, JudgeError, LeetCodeClient};
pub use select::pick_candidate;
pub use summary::render_summary;
