//! Rollback journal persistence
//!
//! One JSON file per execution records every reversible operation the
//! runner has performed, in execution order. Replaying the list in
//! reverse undoes the plan, provided no single operation was itself left
//! half-applied. The file is the sole recovery artifact after a process
//! restart, so every append is written to a temp file and renamed into
//! place before the runner continues; the rename is the commit point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A reversible operation and the parameters needed to invert it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type")]
pub enum RollbackOperation {
    #[serde(rename = "MOVE")]
    Move { source: String, target: String },
    #[serde(rename = "DELETE_TO_RECYCLE")]
    DeleteToRecycle {
        original_path: String,
        recycle_path: String,
    },
    #[serde(rename = "EXPORT_IMPORT_WSL")]
    ExportImportWsl {
        distro: String,
        backup_tar: String,
        source: String,
        target: String,
    },
}

/// On-disk journal layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalData {
    pub execution_id: String,
    pub plan_id: String,
    pub started_at: DateTime<Utc>,
    pub operations: Vec<RollbackOperation>,
}

#[derive(Debug)]
pub enum JournalError {
    /// No journal exists for the execution id
    NotFound(String),
    Io(String),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::NotFound(id) => write!(f, "No rollback data found for {}", id),
            JournalError::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for JournalError {}

/// Result of replaying a journal
#[derive(Debug, Clone, Serialize)]
pub struct RollbackReport {
    pub execution_id: String,
    pub operations_rolled_back: usize,
    pub status: String,
}

pub struct RollbackJournal {
    path: PathBuf,
    data: JournalData,
}

fn journal_path(data_dir: &Path, execution_id: &str) -> PathBuf {
    data_dir.join("rollback").join(format!("{}.json", execution_id))
}

impl RollbackJournal {
    /// Start an empty journal for an execution. Nothing touches disk
    /// until the first append.
    pub fn create(data_dir: &Path, execution_id: &str, plan_id: &str) -> Self {
        Self {
            path: journal_path(data_dir, execution_id),
            data: JournalData {
                execution_id: execution_id.to_string(),
                plan_id: plan_id.to_string(),
                started_at: Utc::now(),
                operations: Vec::new(),
            },
        }
    }

    /// Append one operation and persist the journal before returning
    pub fn append(&mut self, operation: RollbackOperation) -> Result<(), String> {
        self.data.operations.push(operation);
        self.persist()
    }

    fn persist(&self) -> Result<(), String> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| format!("Journal path has no parent: {}", self.path.display()))?;
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;

        let payload = serde_json::to_string_pretty(&self.data)
            .map_err(|e| format!("Failed to serialize journal: {}", e))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)
            .map_err(|e| format!("Failed to create {}: {}", tmp.display(), e))?;
        file.write_all(payload.as_bytes())
            .map_err(|e| format!("Failed to write {}: {}", tmp.display(), e))?;
        file.sync_all()
            .map_err(|e| format!("Failed to sync {}: {}", tmp.display(), e))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| format!("Failed to commit {}: {}", self.path.display(), e))
    }

    /// Remove the journal after a fully successful, non-rolled-back run
    pub fn cleanup(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                log::warn!(
                    "[ROLLBACK] Failed to remove journal {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }

    pub fn operation_count(&self) -> usize {
        self.data.operations.len()
    }
}

/// Load a persisted journal, failing with NotFound when none exists
pub fn load(data_dir: &Path, execution_id: &str) -> Result<JournalData, JournalError> {
    let path = journal_path(data_dir, execution_id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(JournalError::NotFound(execution_id.to_string()));
        }
        Err(e) => {
            return Err(JournalError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };
    serde_json::from_str(&raw)
        .map_err(|e| JournalError::Io(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Replay a journal's operations in reverse order, inverting each with
/// the given function. The journal file is deleted after a clean replay,
/// so a second rollback of the same execution observes NotFound.
pub fn rollback_with<F>(
    data_dir: &Path,
    execution_id: &str,
    mut invert: F,
) -> Result<RollbackReport, JournalError>
where
    F: FnMut(&RollbackOperation) -> Result<(), String>,
{
    let data = load(data_dir, execution_id)?;

    let mut rolled_back = 0;
    let mut failures = Vec::new();
    for operation in data.operations.iter().rev() {
        match invert(operation) {
            Ok(()) => rolled_back += 1,
            Err(e) => {
                log::error!("[ROLLBACK] Failed to invert operation: {}", e);
                failures.push(e);
            }
        }
    }

    let status = if failures.is_empty() {
        let path = journal_path(data_dir, execution_id);
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("[ROLLBACK] Failed to remove journal {}: {}", path.display(), e);
        }
        "success".to_string()
    } else {
        "partial".to_string()
    };

    Ok(RollbackReport {
        execution_id: execution_id.to_string(),
        operations_rolled_back: rolled_back,
        status,
    })
}

/// Replay a journal with the real filesystem inverters
pub fn rollback(data_dir: &Path, execution_id: &str) -> Result<RollbackReport, JournalError> {
    rollback_with(data_dir, execution_id, super::ops::invert_operation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(n: usize) -> RollbackOperation {
        RollbackOperation::Move {
            source: format!("/src/{}", n),
            target: format!("/dst/{}", n),
        }
    }

    #[test]
    fn test_append_persists_each_operation() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = RollbackJournal::create(dir.path(), "exec-1", "balanced");
        journal.append(op(1)).unwrap();
        journal.append(op(2)).unwrap();

        let data = load(dir.path(), "exec-1").unwrap();
        assert_eq!(data.plan_id, "balanced");
        assert_eq!(data.operations.len(), 2);
        assert_eq!(data.operations[0], op(1));
    }

    #[test]
    fn test_load_missing_journal_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match load(dir.path(), "missing") {
            Err(JournalError::NotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("expected NotFound, got {:?}", other.map(|d| d.execution_id)),
        }
    }

    #[test]
    fn test_rollback_replays_in_reverse_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = RollbackJournal::create(dir.path(), "exec-1", "balanced");
        journal.append(op(1)).unwrap();
        journal.append(op(2)).unwrap();
        journal.append(op(3)).unwrap();

        let mut visited = Vec::new();
        let report = rollback_with(dir.path(), "exec-1", |operation| {
            if let RollbackOperation::Move { source, .. } = operation {
                visited.push(source.clone());
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(report.operations_rolled_back, 3);
        assert_eq!(report.status, "success");
        assert_eq!(visited, vec!["/src/3", "/src/2", "/src/1"]);
    }

    #[test]
    fn test_rollback_consumes_the_journal() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = RollbackJournal::create(dir.path(), "exec-1", "balanced");
        journal.append(op(1)).unwrap();

        rollback_with(dir.path(), "exec-1", |_| Ok(())).unwrap();
        assert!(matches!(
            rollback_with(dir.path(), "exec-1", |_| Ok(())),
            Err(JournalError::NotFound(_))
        ));
    }

    #[test]
    fn test_failed_inversion_keeps_journal_and_reports_partial() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = RollbackJournal::create(dir.path(), "exec-1", "balanced");
        journal.append(op(1)).unwrap();
        journal.append(op(2)).unwrap();

        let report = rollback_with(dir.path(), "exec-1", |operation| match operation {
            RollbackOperation::Move { source, .. } if source == "/src/1" => {
                Err("device busy".to_string())
            }
            _ => Ok(()),
        })
        .unwrap();

        assert_eq!(report.operations_rolled_back, 1);
        assert_eq!(report.status, "partial");
        // journal remains for another attempt
        assert!(load(dir.path(), "exec-1").is_ok());
    }

    #[test]
    fn test_cleanup_removes_journal_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = RollbackJournal::create(dir.path(), "exec-1", "balanced");
        journal.append(op(1)).unwrap();
        journal.cleanup();
        assert!(matches!(
            load(dir.path(), "exec-1"),
            Err(JournalError::NotFound(_))
        ));
    }

    #[test]
    fn test_operation_wire_tags() {
        let json = serde_json::to_string(&RollbackOperation::DeleteToRecycle {
            original_path: "/a".to_string(),
            recycle_path: "/b".to_string(),
        })
        .unwrap();
        assert!(json.contains("\"action_type\":\"DELETE_TO_RECYCLE\""));
    }
}
