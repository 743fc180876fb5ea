//! JudgeClient trait definition

use std::collections::HashSet;

use async_trait::async_trait;

use super::JudgeError;
use crate::domain::{AttemptOutcome, ProblemId};

/// Transport-only client for the remote judge
///
/// Session and anti-forgery credentials are supplied at construction and
/// immutable for the client's lifetime. Implementations must not retry
/// internally - the engine owns retry policy, the client owns the wire.
#[async_trait]
pub trait JudgeClient: Send + Sync {
    /// Submit the stored solution for one problem and classify the verdict
    async fn submit(&self, problem: ProblemId) -> Result<AttemptOutcome, JudgeError>;

    /// Fetch the set of problems the authenticated user has already solved
    async fn fetch_solved(&self) -> Result<HashSet<ProblemId>, JudgeError>;
}
