//! SubmitEngine - drives the select/submit/classify/pace cycle
//!
//! One strictly sequential control loop: load persisted progress, fetch
//! the solved set, merge the exclusion set, then select-submit-classify
//! until a guard fires. Concurrent submissions would trip the judge's
//! anti-automation defenses, so there is exactly one in flight at a time.

use std::sync::Arc;
use std::time::Duration;

use eyre::{Context, eyre};
use progresstore::{ProgressRecord, ProgressStore, SkippedEntry};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ResolvedConfig;
use crate::domain::{AttemptOutcome, ProblemId, RunLimits, RunReport, RunState, TerminalReason};
use crate::exclusion::build_exclusion;
use crate::judge::JudgeClient;
use crate::select::pick_candidate;

/// Knobs the engine loops over
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound of the problem-identifier range
    pub max_questions: ProblemId,
    /// Accepted submissions to stop at
    pub target_success: u32,
    /// Blocked responses to stop at
    pub blocked_limit: u32,
    /// Overall attempt ceiling
    pub attempt_limit: u32,
    /// Random draws before the selector scans the complement
    pub draw_budget: u32,
    /// Pause between attempts
    pub delay_between_attempts: Duration,
}

impl From<&ResolvedConfig> for EngineConfig {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            max_questions: config.max_questions,
            target_success: config.target_success,
            blocked_limit: config.blocked_limit,
            attempt_limit: config.attempt_limit,
            draw_budget: config.draw_budget,
            delay_between_attempts: Duration::from_millis(config.delay_between_attempts_ms),
        }
    }
}

/// The submission control loop
pub struct SubmitEngine {
    config: EngineConfig,
    client: Arc<dyn JudgeClient>,
    store: ProgressStore,
    rng: StdRng,
    cancel: Option<watch::Receiver<bool>>,
}

impl SubmitEngine {
    pub fn new(config: EngineConfig, client: Arc<dyn JudgeClient>, store: ProgressStore) -> Self {
        Self {
            config,
            client,
            store,
            rng: StdRng::from_os_rng(),
            cancel: None,
        }
    }

    /// Use a fixed RNG, for reproducible selection
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Watch a cancellation channel; `true` stops the run at the next
    /// loop boundary and cuts the pacing delay short
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run the loop until a guard fires
    ///
    /// Fatal conditions - progress unreadable, solved set unfetchable, no
    /// eligible candidate - propagate as errors; everything else ends in a
    /// report for the summary.
    pub async fn run(&mut self) -> eyre::Result<RunReport> {
        // Loading: either sub-call failing aborts the run. Continuing
        // without prior progress would re-submit solved problems.
        let mut record = self.store.load().context("Failed to load progress")?;
        let solved = self
            .client
            .fetch_solved()
            .await
            .context("Failed to fetch solved set from the judge")?;
        let skipped = record.terminal_ids();
        info!(
            solved = solved.len(),
            skipped = skipped.len(),
            "building exclusion set"
        );

        let mut state = RunState::new(build_exclusion(&solved, &skipped));
        let limits = RunLimits {
            target_success: self.config.target_success,
            blocked_limit: self.config.blocked_limit,
            attempt_limit: self.config.attempt_limit,
        };

        let reason = loop {
            if self.is_cancelled() {
                break TerminalReason::Cancelled;
            }
            if let Some(reason) = state.check_guards(&limits) {
                debug!(%reason, "guard fired");
                break reason;
            }

            // Selecting: an empty pool is fatal, not a retryable failure.
            let Some(candidate) = pick_candidate(
                &mut self.rng,
                self.config.max_questions,
                &state.exclude,
                self.config.draw_budget,
            ) else {
                return Err(eyre!(
                    "no eligible questions left in [1, {}]",
                    self.config.max_questions
                ));
            };

            state.attempt_count += 1;
            info!(
                problem = candidate,
                attempt = state.attempt_count,
                "submitting candidate"
            );

            // Submitting
            let outcome = match self.client.submit(candidate).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_transport() => {
                    warn!(problem = candidate, error = %e, "could not reach the judge, skipping attempt");
                    AttemptOutcome::TransportError
                }
                Err(e) => {
                    // Reached the judge, response unclassifiable and not a
                    // known anti-bot shape: conservative terminal skip.
                    warn!(problem = candidate, error = %e, "unclassifiable response, marking skipped");
                    AttemptOutcome::Unknown
                }
            };

            self.classify(candidate, outcome, &mut record, &mut state);
            self.pace().await;
        };

        Ok(RunReport {
            success_count: state.success_count,
            attempt_count: state.attempt_count,
            blocked_count: state.blocked_count,
            reason,
        })
    }

    /// Map one outcome onto counters, exclusion set, and durable state
    fn classify(&self, problem: ProblemId, outcome: AttemptOutcome, record: &mut ProgressRecord, state: &mut RunState) {
        match outcome {
            AttemptOutcome::Success => {
                state.success_count += 1;
                state.exclude.insert(problem);
                record.mark_solved(problem);
                self.persist(record);
                info!(problem, successes = state.success_count, "submission accepted");
            }
            AttemptOutcome::RateLimited => {
                // Never actually judged: not excluded, not persisted, so
                // the problem stays eligible for a later retry.
                state.blocked_count += 1;
                warn!(
                    problem,
                    blocked = state.blocked_count,
                    "blocked by the judge's anti-automation layer"
                );
            }
            AttemptOutcome::TransportError => {
                debug!(problem, "transport failure, problem stays eligible");
            }
            outcome => {
                // Terminal non-success: excluded now and in future runs.
                state.exclude.insert(problem);
                record.mark_skipped(problem);
                self.persist(record);
                if let Err(e) = self.store.append_skipped(&SkippedEntry::new(problem, outcome.to_string())) {
                    warn!(problem, error = %e, "could not append skipped-log entry");
                }
                info!(problem, %outcome, "terminal non-success, excluded from future draws");
            }
        }
    }

    /// Flush the record, retrying once before downgrading to a warning
    ///
    /// Losing one write is less harmful than aborting mid-run; the next
    /// terminal outcome flushes the full record again anyway.
    fn persist(&self, record: &ProgressRecord) {
        if let Err(first) = self.store.save(record) {
            warn!(error = %first, "progress save failed, retrying");
            if let Err(second) = self.store.save(record) {
                warn!(error = %second, "progress save failed twice, continuing without flush");
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Non-busy pacing delay, cut short by cancellation
    async fn pace(&mut self) {
        let delay = self.config.delay_between_attempts;
        match self.cancel.as_mut() {
            Some(rx) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = wait_cancelled(rx) => {
                        debug!("pacing interrupted by cancellation");
                    }
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }
}

/// Resolve once the channel reads `true`; pend forever if the sender is
/// gone, so a dropped handle never cuts the pacing delay short
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgeError;
    use crate::judge::client::mock::MockJudgeClient;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn engine_config(max_questions: ProblemId) -> EngineConfig {
        EngineConfig {
            max_questions,
            target_success: 1,
            blocked_limit: 4,
            attempt_limit: 2000,
            draw_budget: 4,
            delay_between_attempts: Duration::from_millis(0),
        }
    }

    fn engine(temp: &TempDir, config: EngineConfig, client: Arc<MockJudgeClient>) -> SubmitEngine {
        let store = ProgressStore::open(temp.path().join("store")).unwrap();
        SubmitEngine::new(config, client, store).with_rng(StdRng::seed_from_u64(7))
    }

    fn reopen_store(temp: &TempDir) -> ProgressStore {
        ProgressStore::open(temp.path().join("store")).unwrap()
    }

    #[tokio::test]
    async fn test_success_stops_at_target() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::Success));
        let mut engine = engine(&temp, engine_config(100), client);

        let report = engine.run().await.unwrap();

        assert_eq!(report.reason, TerminalReason::TargetReached);
        assert_eq!(report.success_count, 1);
        assert!(report.success_count <= 1);
        assert_eq!(report.attempt_count, 1);
    }

    #[tokio::test]
    async fn test_attempt_ceiling_bounds_the_run() {
        // Ceiling 5 with an unreachable target: the run must stop at
        // attempt 5 and report the attempt limit.
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::WrongAnswer));
        let mut config = engine_config(100);
        config.target_success = 100;
        config.attempt_limit = 5;
        let mut engine = engine(&temp, config, client);

        let report = engine.run().await.unwrap();

        assert_eq!(report.reason, TerminalReason::AttemptLimit);
        assert_eq!(report.attempt_count, 5);
        assert_eq!(report.success_count, 0);
    }

    #[tokio::test]
    async fn test_blocked_ceiling_fires_with_zero_successes() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::RateLimited));
        let mut engine = engine(&temp, engine_config(100), client.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.reason, TerminalReason::BlockedLimit);
        assert_eq!(report.blocked_count, 4);
        assert_eq!(report.success_count, 0);

        // Blocked problems were never judged: nothing may be persisted.
        drop(engine);
        let store = reopen_store(&temp);
        assert!(store.load().unwrap().is_empty());
        assert!(store.read_skipped().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_problem_stays_eligible() {
        // Pool of one: after a blocked attempt the same problem must be
        // drawn again, and the eventual success persists it as solved.
        let temp = TempDir::new().unwrap();
        let client = Arc::new(
            MockJudgeClient::new(HashSet::new())
                .with_script(vec![Ok(AttemptOutcome::RateLimited), Ok(AttemptOutcome::Success)]),
        );
        let mut engine = engine(&temp, engine_config(1), client.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.reason, TerminalReason::TargetReached);
        assert_eq!(client.submitted_ids(), vec![1, 1]);

        drop(engine);
        let record = reopen_store(&temp).load().unwrap();
        assert_eq!(record.solved_ids(), HashSet::from([1]));
    }

    #[tokio::test]
    async fn test_terminal_failure_is_persisted_and_not_redrawn() {
        // Pool of two: the wrong-answer problem must be excluded for the
        // rest of the run and land in both the record and the audit log.
        let temp = TempDir::new().unwrap();
        let client = Arc::new(
            MockJudgeClient::new(HashSet::new())
                .with_script(vec![Ok(AttemptOutcome::WrongAnswer), Ok(AttemptOutcome::Success)]),
        );
        let mut engine = engine(&temp, engine_config(2), client.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.success_count, 1);
        assert_eq!(report.attempt_count, 2);
        let submitted = client.submitted_ids();
        assert_ne!(submitted[0], submitted[1]);

        drop(engine);
        let store = reopen_store(&temp);
        let record = store.load().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.solved_ids().len(), 1);
        let skipped = store.read_skipped().unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].problem_id, submitted[0]);
        assert_eq!(skipped[0].outcome, "wrong answer");
    }

    #[tokio::test]
    async fn test_transport_error_skips_attempt_without_marking() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(
            MockJudgeClient::new(HashSet::new())
                .with_script(vec![Err(JudgeError::Status { status: 502 })])
                .with_repeat(AttemptOutcome::Success),
        );
        let mut engine = engine(&temp, engine_config(1), client.clone());

        let report = engine.run().await.unwrap();

        // Pool of one: the transport failure left problem 1 eligible.
        assert_eq!(client.submitted_ids(), vec![1, 1]);
        assert_eq!(report.attempt_count, 2);
        assert_eq!(report.success_count, 1);

        drop(engine);
        let store = reopen_store(&temp);
        assert!(store.read_skipped().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_decode_failure_is_a_conservative_terminal_skip() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(
            MockJudgeClient::new(HashSet::new())
                .with_script(vec![Err(JudgeError::Decode("garbled".into())), Ok(AttemptOutcome::Success)]),
        );
        let mut engine = engine(&temp, engine_config(2), client.clone());

        let report = engine.run().await.unwrap();
        assert_eq!(report.success_count, 1);

        drop(engine);
        let store = reopen_store(&temp);
        let skipped = store.read_skipped().unwrap();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].outcome, "unknown verdict");
    }

    #[tokio::test]
    async fn test_persisted_terminal_problem_exhausts_pool() {
        // A problem marked terminal in a previous run is never re-selected:
        // with a pool of one it leaves nothing to draw, which is fatal.
        let temp = TempDir::new().unwrap();
        {
            let store = ProgressStore::open(temp.path().join("store")).unwrap();
            let mut record = ProgressRecord::default();
            record.mark_solved(1);
            store.save(&record).unwrap();
        }
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::Success));
        let mut engine = engine(&temp, engine_config(1), client.clone());

        let err = engine.run().await.unwrap_err();
        assert!(err.to_string().contains("no eligible questions"));
        assert!(client.submitted_ids().is_empty());
    }

    #[tokio::test]
    async fn test_solved_and_skipped_leave_only_candidate_five() {
        // End-to-end: solved {1,2,3} from the judge, skipped {4} from the
        // store, pool [1,5] - problem 5 is the only possible submission.
        let temp = TempDir::new().unwrap();
        {
            let store = ProgressStore::open(temp.path().join("store")).unwrap();
            let mut record = ProgressRecord::default();
            record.mark_skipped(4);
            store.save(&record).unwrap();
        }
        let client = Arc::new(MockJudgeClient::new(HashSet::from([1, 2, 3])).with_repeat(AttemptOutcome::Success));
        let mut engine = engine(&temp, engine_config(5), client.clone());

        let report = engine.run().await.unwrap();

        assert_eq!(report.reason, TerminalReason::TargetReached);
        assert_eq!(client.submitted_ids(), vec![5]);
        assert_eq!(client.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_failing_fetch());
        let mut engine = engine(&temp, engine_config(10), client);

        assert!(engine.run().await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_progress_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let store_dir = temp.path().join("store");
        std::fs::create_dir_all(&store_dir).unwrap();
        std::fs::write(store_dir.join(progresstore::PROGRESS_FILE), "{ not json").unwrap();

        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::Success));
        let mut engine = engine(&temp, engine_config(10), client.clone());

        assert!(engine.run().await.is_err());
        assert_eq!(client.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_does_not_submit() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockJudgeClient::new(HashSet::new()).with_repeat(AttemptOutcome::Success));
        let (tx, rx) = watch::channel(true);
        let store = ProgressStore::open(temp.path().join("store")).unwrap();
        let mut engine = SubmitEngine::new(engine_config(10), client.clone(), store).with_cancel(rx);

        let report = engine.run().await.unwrap();

        drop(tx);
        assert_eq!(report.reason, TerminalReason::Cancelled);
        assert_eq!(report.attempt_count, 0);
        assert!(client.submitted_ids().is_empty());
    }
}
