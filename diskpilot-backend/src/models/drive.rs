//! Drive and space-consumer data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage severity of a single drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveStatus {
    /// More than 80% used
    Critical,
    /// Between 50% and 80% used
    Warning,
    /// Less than 50% used
    Healthy,
}

impl DriveStatus {
    /// Classify a usage percentage
    pub fn from_percent_used(percent: f64) -> Self {
        if percent > 80.0 {
            DriveStatus::Critical
        } else if percent > 50.0 {
            DriveStatus::Warning
        } else {
            DriveStatus::Healthy
        }
    }
}

impl std::fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriveStatus::Critical => write!(f, "critical"),
            DriveStatus::Warning => write!(f, "warning"),
            DriveStatus::Healthy => write!(f, "healthy"),
        }
    }
}

/// A mounted drive and its usage numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drive {
    /// Drive identifier ("C" on Windows, mount path elsewhere)
    pub letter: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub percent_used: f64,
    pub status: DriveStatus,
    pub filesystem: String,
}

/// Category of a space consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerType {
    Docker,
    Wsl,
    Downloads,
    Temp,
    Cache,
    Other,
}

impl std::fmt::Display for ConsumerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumerType::Docker => write!(f, "docker"),
            ConsumerType::Wsl => write!(f, "wsl"),
            ConsumerType::Downloads => write!(f, "downloads"),
            ConsumerType::Temp => write!(f, "temp"),
            ConsumerType::Cache => write!(f, "cache"),
            ConsumerType::Other => write!(f, "other"),
        }
    }
}

/// A directory that occupies a meaningful amount of space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConsumer {
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
    #[serde(rename = "type")]
    pub consumer_type: ConsumerType,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Full result of a drive analysis pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub drives: Vec<Drive>,
    pub top_consumers: Vec<SpaceConsumer>,
    pub total_recoverable_bytes: u64,
    pub has_imbalance: bool,
    pub imbalance_message: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(DriveStatus::from_percent_used(95.0), DriveStatus::Critical);
        assert_eq!(DriveStatus::from_percent_used(80.0), DriveStatus::Warning);
        assert_eq!(DriveStatus::from_percent_used(65.0), DriveStatus::Warning);
        assert_eq!(DriveStatus::from_percent_used(20.0), DriveStatus::Healthy);
    }

    #[test]
    fn test_consumer_type_wire_names() {
        let json = serde_json::to_string(&ConsumerType::Docker).unwrap();
        assert_eq!(json, "\"docker\"");
        let parsed: ConsumerType = serde_json::from_str("\"wsl\"").unwrap();
        assert_eq!(parsed, ConsumerType::Wsl);
    }
}
