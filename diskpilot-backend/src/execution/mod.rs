//! Plan execution subsystem
//!
//! A background runner walks a plan's actions in order while observers
//! poll consistent snapshots from the process-wide progress registry.
//! Reversible operations are journaled durably so a partially failed run
//! can be undone in reverse order.

pub mod ops;
mod progress;
pub mod rollback;
mod runner;
mod store;

pub use progress::ProgressTracker;
pub use rollback::{JournalError, RollbackJournal, RollbackOperation, RollbackReport};
pub use runner::ExecutionRunner;
pub use store::ProgressStore;
