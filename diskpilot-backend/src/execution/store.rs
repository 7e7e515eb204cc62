//! Process-wide execution registry
//!
//! Maps execution ids to their progress trackers and cancellation tokens.
//! Owned by `AppState` rather than living in a global, so tests can spin
//! up isolated instances. Entries must be released once a client is done
//! observing a terminal state, either explicitly via `remove` or by the
//! periodic `cleanup_old` sweep.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::progress::ProgressTracker;

pub struct ProgressStore {
    trackers: DashMap<String, Arc<ProgressTracker>>,
    cancellation_tokens: DashMap<String, CancellationToken>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self {
            trackers: DashMap::new(),
            cancellation_tokens: DashMap::new(),
        }
    }

    /// Get the tracker for an execution, creating it on first reference
    pub fn get_or_create(&self, execution_id: &str) -> Arc<ProgressTracker> {
        self.trackers
            .entry(execution_id.to_string())
            .or_insert_with(|| Arc::new(ProgressTracker::new(execution_id)))
            .clone()
    }

    pub fn get(&self, execution_id: &str) -> Option<Arc<ProgressTracker>> {
        self.trackers.get(execution_id).map(|t| t.clone())
    }

    /// Get the cancellation token for an execution, creating one if needed
    pub fn cancellation_token(&self, execution_id: &str) -> CancellationToken {
        self.cancellation_tokens
            .entry(execution_id.to_string())
            .or_insert_with(CancellationToken::new)
            .clone()
    }

    /// Request cooperative cancellation of an execution.
    /// Returns false when the execution id is unknown.
    pub fn cancel(&self, execution_id: &str) -> bool {
        if !self.trackers.contains_key(execution_id) {
            return false;
        }
        log::info!("[PROGRESS_STORE] Cancelling execution {}", execution_id);
        self.cancellation_token(execution_id).cancel();
        true
    }

    /// Drop all state for an execution
    pub fn remove(&self, execution_id: &str) {
        self.trackers.remove(execution_id);
        self.cancellation_tokens.remove(execution_id);
    }

    /// Remove terminal executions whose last update is older than the
    /// cutoff. Running executions are never evicted.
    pub fn cleanup_old(&self, max_age_hours: i64) -> usize {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        let stale: Vec<String> = self
            .trackers
            .iter()
            .filter(|entry| {
                let snapshot = entry.value().snapshot();
                snapshot.status.is_terminal() && snapshot.updated_at < cutoff
            })
            .map(|entry| entry.key().clone())
            .collect();

        let count = stale.len();
        for execution_id in stale {
            self.remove(&execution_id);
        }
        if count > 0 {
            log::info!("[PROGRESS_STORE] Cleaned up {} old executions", count);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}
