//! Bounded random candidate selection

use std::collections::HashSet;

use rand::Rng;
use tracing::debug;

use crate::domain::ProblemId;

/// Pick a random eligible problem in `[1, max_questions]`
///
/// Fast path: uniform draws, redrawing on collision with the exclusion
/// set, up to `draw_budget` times. When the budget exhausts - the common
/// case only once the pool is nearly drained - the complement is
/// materialized once and a uniform choice made from it, so selection stays
/// bounded without failing while eligible problems remain. Returns `None`
/// only when every problem in range is excluded.
pub fn pick_candidate<R: Rng>(
    rng: &mut R,
    max_questions: ProblemId,
    exclude: &HashSet<ProblemId>,
    draw_budget: u32,
) -> Option<ProblemId> {
    if max_questions == 0 {
        return None;
    }

    for _ in 0..draw_budget {
        let candidate = rng.random_range(1..=max_questions);
        if !exclude.contains(&candidate) {
            return Some(candidate);
        }
    }

    debug!(draw_budget, "random draws exhausted, scanning complement");
    let complement: Vec<ProblemId> = (1..=max_questions).filter(|id| !exclude.contains(id)).collect();
    if complement.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..complement.len());
    Some(complement[idx])
}
