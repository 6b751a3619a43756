//! Audit error taxonomy.

use thiserror::Error;

use crate::engines::EngineError;
use crate::scheduler::SchedulerError;

/// Failures surfaced to the caller of an audit.
///
/// Header fetch failures never appear here; they degrade to empty findings.
/// The type is `Clone` so one coalesced failure can reach every waiter.
#[derive(Debug, Clone, Error)]
pub enum AuditError {
    /// The input could not be normalized into a URL.
    #[error("Invalid url")]
    InvalidInput,

    /// An external engine failed to produce its report.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The queue dropped the job before it produced a result.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl AuditError {
    /// Stable machine-readable category, used for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditError::InvalidInput => "invalid_input",
            AuditError::Engine(_) => "engine_failure",
            AuditError::Scheduler(_) => "scheduler_failure",
        }
    }
}
