//! Progress record and skipped-log entry types

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// Integer identifier of a single problem in the judge's catalog
pub type ProblemId = u32;

/// Mapping from problem id to its terminal flag
///
/// A key being present means the problem is terminal and must never be
/// re-selected. The value records how it got there: `true` = accepted,
/// `false` = attempted and definitively failed. The JSON shape matches the
/// original `progress.json` files, so existing records load unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    #[serde(default)]
    pub questions: BTreeMap<String, bool>,
}

impl ProgressRecord {
    /// Mark a problem as accepted
    pub fn mark_solved(&mut self, id: ProblemId) {
        self.questions.insert(id.to_string(), true);
    }

    /// Mark a problem as attempted-and-failed terminally
    ///
    /// Never downgrades an accepted entry.
    pub fn mark_skipped(&mut self, id: ProblemId) {
        self.questions.entry(id.to_string()).or_insert(false);
    }

    /// Whether this problem has already reached a terminal outcome
    pub fn is_terminal(&self, id: ProblemId) -> bool {
        self.questions.contains_key(&id.to_string())
    }

    /// All terminal problem ids (accepted and failed alike)
    ///
    /// Keys that do not parse as problem ids are skipped with a warning
    /// rather than failing the whole load.
    pub fn terminal_ids(&self) -> HashSet<ProblemId> {
        self.questions
            .keys()
            .filter_map(|key| match key.parse::<ProblemId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("ignoring non-numeric progress key: {key:?}");
                    None
                }
            })
            .collect()
    }

    /// Only the accepted problem ids
    pub fn solved_ids(&self) -> HashSet<ProblemId> {
        self.questions
            .iter()
            .filter(|(_, accepted)| **accepted)
            .filter_map(|(key, _)| key.parse().ok())
            .collect()
    }

    /// Remove a single problem's terminal marking, returning whether it existed
    pub fn remove(&mut self, id: ProblemId) -> bool {
        self.questions.remove(&id.to_string()).is_some()
    }

    /// Number of terminal problems recorded
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether any progress has been recorded
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One line of the append-only skipped-attempts audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEntry {
    /// Problem that produced the terminal non-success outcome
    pub problem_id: ProblemId,
    /// Outcome label, e.g. "wrong answer"
    pub outcome: String,
    /// When the outcome was recorded
    pub noted_at: DateTime<Utc>,
}

impl SkippedEntry {
    pub fn new(problem_id: ProblemId, outcome: impl Into<String>) -> Self {
        Self {
            problem_id,
            outcome: outcome.into(),
            noted_at: Utc::now(),
        }
    }
}
