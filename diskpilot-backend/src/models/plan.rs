//! Cleanup plan data types
//!
//! Plans are immutable once generated; the execution runner only ever
//! reads them. Wire names for `ActionType` stay uppercase so journals and
//! API payloads match what the frontend and the AI prompt schema use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of cleanup action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Relocate a directory to another drive, leaving a symlink behind
    Move,
    /// Run a tool-specific prune command (e.g. docker system prune)
    Prune,
    /// Move a path into the recycle area instead of deleting it outright
    DeleteToRecycle,
    /// Relocate a WSL distribution via export/import
    ExportImportWsl,
    /// Delete the contents of a cache or temp directory
    Cleanup,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Move => write!(f, "MOVE"),
            ActionType::Prune => write!(f, "PRUNE"),
            ActionType::DeleteToRecycle => write!(f, "DELETE_TO_RECYCLE"),
            ActionType::ExportImportWsl => write!(f, "EXPORT_IMPORT_WSL"),
            ActionType::Cleanup => write!(f, "CLEANUP"),
        }
    }
}

/// One atomic step of a cleanup plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanAction {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub description: String,
    #[serde(default)]
    pub source_path: Option<String>,
    #[serde(default)]
    pub target_path: Option<String>,
    /// Shell command for PRUNE actions
    #[serde(default)]
    pub command: Option<String>,
    pub size_bytes: u64,
    /// Human-readable explanation of why the action is safe
    pub safety_explanation: String,
    /// How the action can be undone, for display purposes
    pub rollback_option: String,
    #[serde(default = "default_estimated_seconds")]
    pub estimated_seconds: u64,
}

fn default_estimated_seconds() -> u64 {
    60
}

/// Risk tier of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A named, ordered set of cleanup actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub space_saved_bytes: u64,
    pub risk_level: RiskLevel,
    pub estimated_minutes: u64,
    pub rationale: String,
    pub actions: Vec<PlanAction>,
    #[serde(default)]
    pub recommended: bool,
    /// AI responses omit this; stamp generation time on parse
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}
