//! Per-execution progress tracking
//!
//! One `ProgressTracker` exists per execution. The runner is the only
//! writer; any number of observers read via `snapshot()`. All mutation
//! happens under a single mutex so a reader never sees a half-applied
//! update; steps and logs share one consistency domain.

use chrono::Utc;
use parking_lot::Mutex;

use crate::models::{
    ExecutionProgress, ExecutionStatus, ExecutionStep, LogEntry, LogLevel, PlanAction, StepStatus,
};

/// Maximum log entries retained; oldest are dropped first.
const MAX_LOG_ENTRIES: usize = 100;

pub struct ProgressTracker {
    execution_id: String,
    progress: Mutex<ExecutionProgress>,
}

impl ProgressTracker {
    pub fn new(execution_id: &str) -> Self {
        Self {
            execution_id: execution_id.to_string(),
            progress: Mutex::new(ExecutionProgress::pending()),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Reset the record for a plan: one pending step per action, in plan
    /// order, overall status RUNNING. Called once before any step update.
    pub fn initialize(&self, plan_id: &str, actions: &[PlanAction]) {
        let steps: Vec<ExecutionStep> = actions
            .iter()
            .enumerate()
            .map(|(idx, action)| ExecutionStep::pending(idx + 1, &action.id, &action.description))
            .collect();

        let mut progress = self.progress.lock();
        *progress = ExecutionProgress {
            plan_id: plan_id.to_string(),
            overall_percent: 0.0,
            current_step: 0,
            total_steps: steps.len(),
            steps,
            logs: Vec::new(),
            status: ExecutionStatus::Running,
            updated_at: Utc::now(),
        };
    }

    /// Update one step's status. Out-of-range indices and regressing
    /// transitions are a guarded no-op: a step only ever moves
    /// pending -> active -> completed | failed.
    ///
    /// ACTIVE stamps the start time and advances `current_step`; COMPLETED
    /// stamps completion and forces the step to 100%; FAILED records the
    /// error message. Overall percent is recomputed from the full step
    /// list after every transition.
    pub fn update_step(
        &self,
        index: usize,
        status: StepStatus,
        progress_percent: Option<f64>,
        error_message: Option<String>,
    ) {
        let mut progress = self.progress.lock();
        if index >= progress.steps.len() {
            return;
        }
        let current = progress.steps[index].status;
        if step_rank(status) < step_rank(current)
            || (step_rank(current) == 2 && status != current)
        {
            return;
        }

        {
            let step = &mut progress.steps[index];
            step.status = status;
            match status {
                StepStatus::Active => {
                    step.started_at = Some(Utc::now());
                }
                StepStatus::Completed => {
                    step.completed_at = Some(Utc::now());
                    step.progress_percent = Some(100.0);
                }
                StepStatus::Failed => {
                    step.error_message = error_message;
                }
                StepStatus::Pending => {}
            }
            if let Some(percent) = progress_percent {
                step.progress_percent = Some(percent);
            }
        }

        if status == StepStatus::Active {
            progress.current_step = index + 1;
        }

        let completed = progress
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        if progress.total_steps > 0 {
            progress.overall_percent = completed as f64 / progress.total_steps as f64 * 100.0;
        }
        progress.updated_at = Utc::now();
    }

    /// Append a log entry, truncating to the most recent 100
    pub fn add_log(&self, level: LogLevel, message: impl Into<String>) {
        let mut progress = self.progress.lock();
        progress.logs.push(LogEntry::new(level, message));
        if progress.logs.len() > MAX_LOG_ENTRIES {
            let excess = progress.logs.len() - MAX_LOG_ENTRIES;
            progress.logs.drain(..excess);
        }
        progress.updated_at = Utc::now();
    }

    /// Set the overall status. COMPLETED forces overall percent to 100 so
    /// the terminal snapshot is clean regardless of step rounding.
    pub fn set_status(&self, status: ExecutionStatus) {
        let mut progress = self.progress.lock();
        progress.status = status;
        if status == ExecutionStatus::Completed {
            progress.overall_percent = 100.0;
        }
        progress.updated_at = Utc::now();
    }

    pub fn status(&self) -> ExecutionStatus {
        self.progress.lock().status
    }

    /// Independent deep copy of the full progress record
    pub fn snapshot(&self) -> ExecutionProgress {
        self.progress.lock().clone()
    }
}

/// Position in the step lifecycle; terminal states share the top rank
fn step_rank(status: StepStatus) -> u8 {
    match status {
        StepStatus::Pending => 0,
        StepStatus::Active => 1,
        StepStatus::Completed | StepStatus::Failed => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionType;

    fn test_actions(count: usize) -> Vec<PlanAction> {
        (1..=count)
            .map(|i| PlanAction {
                id: format!("action_{}", i),
                action_type: ActionType::Cleanup,
                description: format!("Clean target {}", i),
                source_path: None,
                target_path: None,
                command: None,
                size_bytes: 1024,
                safety_explanation: "safe".to_string(),
                rollback_option: "none".to_string(),
                estimated_seconds: 1,
            })
            .collect()
    }

    #[test]
    fn test_initialize_builds_pending_steps() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(3));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.plan_id, "balanced");
        assert_eq!(snapshot.status, ExecutionStatus::Running);
        assert_eq!(snapshot.total_steps, 3);
        assert_eq!(snapshot.overall_percent, 0.0);
        assert_eq!(snapshot.current_step, 0);
        assert!(snapshot.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert_eq!(snapshot.steps[1].id, "step_2");
        assert_eq!(snapshot.steps[1].action_id, "action_2");
    }

    #[test]
    fn test_overall_percent_is_completed_over_total() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(4));

        tracker.update_step(0, StepStatus::Active, None, None);
        assert_eq!(tracker.snapshot().overall_percent, 0.0);

        tracker.update_step(0, StepStatus::Completed, None, None);
        assert!((tracker.snapshot().overall_percent - 25.0).abs() < 1e-9);

        tracker.update_step(1, StepStatus::Active, None, None);
        tracker.update_step(1, StepStatus::Completed, None, None);
        assert!((tracker.snapshot().overall_percent - 50.0).abs() < 1e-9);

        // failed steps do not count toward overall percent
        tracker.update_step(2, StepStatus::Failed, None, Some("boom".to_string()));
        assert!((tracker.snapshot().overall_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_active_sets_current_step_and_start_time() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(3));

        tracker.update_step(1, StepStatus::Active, None, None);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.current_step, 2);
        assert!(snapshot.steps[1].started_at.is_some());
        assert!(snapshot.steps[0].started_at.is_none());
    }

    #[test]
    fn test_completed_forces_step_percent() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(1));

        tracker.update_step(0, StepStatus::Active, Some(40.0), None);
        assert_eq!(tracker.snapshot().steps[0].progress_percent, Some(40.0));

        tracker.update_step(0, StepStatus::Completed, None, None);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.steps[0].progress_percent, Some(100.0));
        assert!(snapshot.steps[0].completed_at.is_some());
    }

    #[test]
    fn test_steps_never_regress() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(2));

        tracker.update_step(0, StepStatus::Active, None, None);
        tracker.update_step(0, StepStatus::Completed, None, None);

        // completed is terminal for the step
        tracker.update_step(0, StepStatus::Pending, None, None);
        assert_eq!(tracker.snapshot().steps[0].status, StepStatus::Completed);
        tracker.update_step(0, StepStatus::Failed, None, Some("late".to_string()));
        assert_eq!(tracker.snapshot().steps[0].status, StepStatus::Completed);

        tracker.update_step(1, StepStatus::Failed, None, Some("boom".to_string()));
        tracker.update_step(1, StepStatus::Active, None, None);
        assert_eq!(tracker.snapshot().steps[1].status, StepStatus::Failed);
    }

    #[test]
    fn test_out_of_range_update_is_a_no_op() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(2));

        let before = tracker.snapshot();
        tracker.update_step(5, StepStatus::Completed, None, None);
        let after = tracker.snapshot();
        assert_eq!(before.overall_percent, after.overall_percent);
        assert_eq!(before.current_step, after.current_step);
    }

    #[test]
    fn test_log_ring_keeps_last_100_in_order() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(1));

        for i in 1..=105 {
            tracker.add_log(LogLevel::Info, format!("entry {}", i));
        }

        let logs = tracker.snapshot().logs;
        assert_eq!(logs.len(), 100);
        assert_eq!(logs[0].message, "entry 6");
        assert_eq!(logs[99].message, "entry 105");
    }

    #[test]
    fn test_completed_status_forces_overall_percent() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(3));

        tracker.set_status(ExecutionStatus::Completed);
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.status, ExecutionStatus::Completed);
        assert_eq!(snapshot.overall_percent, 100.0);
    }

    #[test]
    fn test_concurrent_readers_see_consistent_snapshots() {
        use std::sync::Arc;

        let tracker = Arc::new(ProgressTracker::new("exec-1"));
        tracker.initialize("balanced", &test_actions(50));

        let writer = {
            let tracker = Arc::clone(&tracker);
            std::thread::spawn(move || {
                for i in 0..50 {
                    tracker.update_step(i, StepStatus::Active, None, None);
                    tracker.update_step(i, StepStatus::Completed, None, None);
                    tracker.add_log(LogLevel::Info, format!("step {}", i + 1));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let snapshot = tracker.snapshot();
                        let completed = snapshot
                            .steps
                            .iter()
                            .filter(|s| s.status == StepStatus::Completed)
                            .count();
                        // percent always matches the step list it came with
                        let expected = completed as f64 / snapshot.total_steps as f64 * 100.0;
                        assert!((snapshot.overall_percent - expected).abs() < 1e-9);
                        // a completed step never follows a pending gap
                        let first_pending = snapshot
                            .steps
                            .iter()
                            .position(|s| s.status == StepStatus::Pending);
                        if let Some(first_pending) = first_pending {
                            assert!(snapshot.steps[first_pending..]
                                .iter()
                                .all(|s| s.status != StepStatus::Completed));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(tracker.snapshot().overall_percent, 100.0);
    }

    #[test]
    fn test_snapshot_is_independent_of_live_state() {
        let tracker = ProgressTracker::new("exec-1");
        tracker.initialize("balanced", &test_actions(2));

        let mut snapshot = tracker.snapshot();
        snapshot.steps[0].status = StepStatus::Failed;
        snapshot.logs.push(LogEntry::new(LogLevel::Error, "tampered"));
        snapshot.overall_percent = 99.0;

        let fresh = tracker.snapshot();
        assert_eq!(fresh.steps[0].status, StepStatus::Pending);
        assert!(fresh.logs.is_empty());
        assert_eq!(fresh.overall_percent, 0.0);
    }
}
