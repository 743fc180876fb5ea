//! Exclusion set construction

use std::collections::HashSet;

use crate::domain::ProblemId;

/// Merge the judge-reported solved set and the locally skipped set
///
/// Pure union; overlap collapses silently. The result is the set of
/// problems the selector must never draw.
pub fn build_exclusion(solved: &HashSet<ProblemId>, skipped: &HashSet<ProblemId>) -> HashSet<ProblemId> {
    solved.union(skipped).copied().collect()
}
