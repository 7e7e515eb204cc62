pub mod drive;
pub mod execution;
pub mod plan;
pub mod settings;

pub use drive::{AnalysisResult, ConsumerType, Drive, DriveStatus, SpaceConsumer};
pub use execution::{
    ExecuteRequest, ExecuteResponse, ExecutionProgress, ExecutionStatus, ExecutionStep, LogEntry,
    LogLevel, StepStatus,
};
pub use plan::{ActionType, Plan, PlanAction, RiskLevel};
pub use settings::{UpdateSettingsRequest, UserSettings};
