//! ProgressStore - durable solve/skip progress for judge submission runs
//!
//! Persists which problem identifiers have reached a terminal outcome
//! (accepted, or attempted and definitively failed) so they are never
//! re-selected in this or future runs, plus an append-only audit trail of
//! skipped attempts.
//!
//! # Architecture
//!
//! ```text
//! <store>/
//! ├── progress.json    # {"questions": {"17": true, "42": false}}
//! ├── skipped.log      # one JSON line per terminal non-success outcome
//! └── lock             # advisory lock, at most one run per store
//! ```
//!
//! `progress.json` is the authoritative exclusion state; `skipped.log` is
//! informational only. Saves go through a temp-file-then-rename so a crash
//! mid-save never corrupts the record for the next load.
//!
//! # Example
//!
//! ```ignore
//! use progresstore::{ProgressStore, SkippedEntry};
//!
//! let store = ProgressStore::open(".judgeloop")?;
//! let mut record = store.load()?;
//! record.mark_solved(17);
//! store.save(&record)?;
//! store.append_skipped(&SkippedEntry::new(42, "wrong answer"))?;
//! ```

pub mod cli;
pub mod config;
mod record;
mod store;

pub use record::{ProblemId, ProgressRecord, SkippedEntry};
pub use store::ProgressStore;

/// File name of the authoritative progress record
pub const PROGRESS_FILE: &str = "progress.json";

/// File name of the append-only skipped-attempts log
pub const SKIPPED_FILE: &str = "skipped.log";

/// File name of the advisory run lock
pub const LOCK_FILE: &str = "lock";
