//! Execution progress data types
//!
//! `ExecutionProgress` is the record the progress tracker owns and the
//! snapshot shape observers receive; consumers always get clones, never
//! references into live state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall status of one plan execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    /// Terminal states stop the observer relay
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Pending => write!(f, "pending"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Status of a single step within an execution
///
/// Transitions are monotonic: pending -> active -> completed | failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepStatus::Pending => write!(f, "pending"),
            StepStatus::Active => write!(f, "active"),
            StepStatus::Completed => write!(f, "completed"),
            StepStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One step of a running execution, backed by a plan action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: String,
    pub action_id: String,
    pub status: StepStatus,
    pub description: String,
    pub progress_percent: Option<f64>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExecutionStep {
    /// Build the pending step for an action, 1-based index
    pub fn pending(index: usize, action_id: &str, description: &str) -> Self {
        Self {
            id: format!("step_{}", index),
            action_id: action_id.to_string(),
            status: StepStatus::Pending,
            description: description.to_string(),
            progress_percent: Some(0.0),
            error_message: None,
            started_at: None,
            completed_at: None,
        }
    }
}

/// Severity of a progress log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Success => write!(f, "success"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Timestamped entry in an execution's log ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time formatted HH:MM:SS
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().format("%H:%M:%S").to_string(),
            level,
            message: message.into(),
        }
    }
}

/// Point-in-time progress of one execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionProgress {
    pub plan_id: String,
    pub overall_percent: f64,
    /// 1-based index of the most recently activated step, 0 before any
    pub current_step: usize,
    pub total_steps: usize,
    pub steps: Vec<ExecutionStep>,
    pub logs: Vec<LogEntry>,
    pub status: ExecutionStatus,
    pub updated_at: DateTime<Utc>,
}

impl ExecutionProgress {
    /// Empty record for an execution that has not been initialized yet
    pub fn pending() -> Self {
        Self {
            plan_id: String::new(),
            overall_percent: 0.0,
            current_step: 0,
            total_steps: 0,
            steps: Vec::new(),
            logs: Vec::new(),
            status: ExecutionStatus::Pending,
            updated_at: Utc::now(),
        }
    }
}

/// Request body for starting a plan execution
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub plan_id: String,
    #[serde(default)]
    pub dry_run: bool,
}

/// Response after an execution has been accepted
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub execution_id: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Cancelled.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(!ExecutionStatus::Pending.is_terminal());
    }

    #[test]
    fn test_pending_step_shape() {
        let step = ExecutionStep::pending(3, "action_3", "Clear Temp");
        assert_eq!(step.id, "step_3");
        assert_eq!(step.action_id, "action_3");
        assert_eq!(step.status, StepStatus::Pending);
        assert_eq!(step.progress_percent, Some(0.0));
        assert!(step.started_at.is_none());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ExecutionStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
        assert_eq!(serde_json::to_string(&StepStatus::Active).unwrap(), "\"active\"");
        assert_eq!(serde_json::to_string(&LogLevel::Warning).unwrap(), "\"warning\"");
    }
}
