//! Plan execution runner
//!
//! Drives a plan's actions strictly in order, updating the progress
//! tracker and the rollback journal as it goes. The first failing action
//! aborts the run: later actions may assume earlier ones succeeded.
//! Failed actions are never retried automatically; a failed destructive
//! operation requires a human decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::ops;
use super::progress::ProgressTracker;
use super::rollback::RollbackJournal;
use crate::models::{ActionType, ExecutionStatus, LogLevel, Plan, PlanAction, StepStatus};
use crate::util::{format_bytes, validate_path};

pub struct ExecutionRunner {
    execution_id: String,
    plan: Plan,
    dry_run: bool,
    tracker: Arc<ProgressTracker>,
    cancel_token: CancellationToken,
    data_dir: PathBuf,
    /// Simulated per-step delay in dry-run mode; zero in tests
    dry_run_delay: Duration,
}

impl ExecutionRunner {
    pub fn new(
        execution_id: &str,
        plan: Plan,
        dry_run: bool,
        tracker: Arc<ProgressTracker>,
        cancel_token: CancellationToken,
        data_dir: &Path,
        dry_run_delay: Duration,
    ) -> Self {
        Self {
            execution_id: execution_id.to_string(),
            plan,
            dry_run,
            tracker,
            cancel_token,
            data_dir: data_dir.to_path_buf(),
            dry_run_delay,
        }
    }

    /// Run the plan to a terminal status. Errors that are not
    /// attributable to a single action (journal I/O and the like) are
    /// caught here so the execution never stays RUNNING.
    pub async fn execute(self) {
        let mut journal =
            RollbackJournal::create(&self.data_dir, &self.execution_id, &self.plan.id);
        if let Err(e) = self.run(&mut journal).await {
            log::error!("[RUNNER] Execution {} failed: {}", self.execution_id, e);
            self.tracker
                .add_log(LogLevel::Error, format!("Execution failed: {}", e));
            self.tracker.set_status(ExecutionStatus::Failed);
        }
    }

    async fn run(&self, journal: &mut RollbackJournal) -> Result<(), String> {
        self.tracker.initialize(&self.plan.id, &self.plan.actions);
        if self.dry_run {
            self.tracker
                .add_log(LogLevel::Warning, "DRY RUN MODE - No changes will be made");
        }
        self.tracker.add_log(
            LogLevel::Info,
            format!("Starting execution of {} plan", self.plan.name),
        );
        log::info!(
            "[RUNNER] Executing plan {} as {} (dry_run={})",
            self.plan.id,
            self.execution_id,
            self.dry_run
        );

        for (idx, action) in self.plan.actions.iter().enumerate() {
            if self.cancel_token.is_cancelled() {
                self.tracker.add_log(
                    LogLevel::Warning,
                    "Execution cancelled - remaining actions skipped",
                );
                self.tracker.set_status(ExecutionStatus::Cancelled);
                log::info!("[RUNNER] Execution {} cancelled", self.execution_id);
                return Ok(());
            }

            self.tracker.update_step(idx, StepStatus::Active, None, None);
            self.tracker
                .add_log(LogLevel::Info, format!("Starting: {}", action.description));

            let result = if self.dry_run {
                tokio::time::sleep(self.dry_run_delay).await;
                Ok(())
            } else {
                self.run_action(action, journal).await
            };

            match result {
                Ok(()) => {
                    self.tracker
                        .update_step(idx, StepStatus::Completed, None, None);
                    self.tracker
                        .add_log(LogLevel::Success, format!("Completed: {}", action.description));
                }
                Err(e) => {
                    self.tracker
                        .update_step(idx, StepStatus::Failed, None, Some(e.clone()));
                    self.tracker.add_log(
                        LogLevel::Error,
                        format!("Failed: {} - {}", action.description, e),
                    );
                    if journal.operation_count() > 0 {
                        self.tracker.add_log(
                            LogLevel::Info,
                            format!(
                                "{} reversible operation(s) journaled for rollback",
                                journal.operation_count()
                            ),
                        );
                    }
                    self.tracker.set_status(ExecutionStatus::Failed);
                    log::error!(
                        "[RUNNER] Execution {} failed at step {}: {}",
                        self.execution_id,
                        idx + 1,
                        e
                    );
                    return Ok(());
                }
            }
        }

        self.tracker.set_status(ExecutionStatus::Completed);
        self.tracker.add_log(
            LogLevel::Success,
            format!(
                "Execution completed successfully! Saved {}",
                format_bytes(self.plan.space_saved_bytes)
            ),
        );
        journal.cleanup();
        Ok(())
    }

    /// Dispatch one action to its operation. Reversible kinds append to
    /// the journal after their side effect lands.
    async fn run_action(
        &self,
        action: &PlanAction,
        journal: &mut RollbackJournal,
    ) -> Result<(), String> {
        match action.action_type {
            ActionType::Cleanup => {
                let source = required_path(action.source_path.as_deref(), action)?;
                let freed = ops::clear_directory(&source)?;
                self.tracker
                    .add_log(LogLevel::Info, format!("Cleaned {}", format_bytes(freed)));
                Ok(())
            }
            ActionType::Move => {
                let source = required_path(action.source_path.as_deref(), action)?;
                let target = required_path(action.target_path.as_deref(), action)?;
                let operation = ops::move_directory(&source, &target)?;
                self.tracker.add_log(
                    LogLevel::Info,
                    format!(
                        "Moved {} to {} (symlink created)",
                        source.display(),
                        target.display()
                    ),
                );
                journal.append(operation)?;
                Ok(())
            }
            ActionType::Prune => {
                let command = action
                    .command
                    .as_deref()
                    .ok_or_else(|| format!("{} action has no command", action.action_type))?;
                ops::run_command(command).await?;
                self.tracker
                    .add_log(LogLevel::Info, format!("Executed: {}", command));
                Ok(())
            }
            ActionType::DeleteToRecycle => {
                let source = required_path(action.source_path.as_deref(), action)?;
                let recycle = ops::recycle_dir(&self.data_dir, &self.execution_id);
                let operation = ops::delete_to_recycle(&source, &recycle)?;
                self.tracker.add_log(
                    LogLevel::Info,
                    format!("Moved to recycle bin: {}", source.display()),
                );
                journal.append(operation)?;
                Ok(())
            }
            ActionType::ExportImportWsl => {
                let source = required_path(action.source_path.as_deref(), action)?;
                let target = required_path(action.target_path.as_deref(), action)?;
                let distro = target
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| format!("Cannot derive distro name from {}", target.display()))?
                    .to_string();
                let backup_dir = self.data_dir.join("backups");
                let operation = ops::relocate_wsl(&distro, &source, &target, &backup_dir).await?;
                self.tracker.add_log(
                    LogLevel::Info,
                    format!("Relocated WSL distribution to {}", target.display()),
                );
                journal.append(operation)?;
                Ok(())
            }
        }
    }
}

fn required_path(path: Option<&str>, action: &PlanAction) -> Result<PathBuf, String> {
    let raw = path.ok_or_else(|| format!("{} action has no path", action.action_type))?;
    if !validate_path(raw) {
        return Err(format!("Invalid path: {}", raw));
    }
    Ok(PathBuf::from(raw))
}
