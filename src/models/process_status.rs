use crate::errors::{AppError, AppResult};
use serde::Serialize;

/// Processing state of a raw clock event.
///
/// `Pending` is the only non-terminal state; a reconciliation pass moves
/// every consumed event to one of the other three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Pending,
    Processed,
    Skipped,
    Error,
}

impl ProcessStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProcessStatus::Pending => "pending",
            ProcessStatus::Processed => "processed",
            ProcessStatus::Skipped => "skipped",
            ProcessStatus::Error => "error",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> AppResult<Self> {
        match s {
            "" | "pending" => Ok(ProcessStatus::Pending),
            "processed" => Ok(ProcessStatus::Processed),
            "skipped" => Ok(ProcessStatus::Skipped),
            "error" => Ok(ProcessStatus::Error),
            other => Err(AppError::InvalidProcessStatus(other.to_string())),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessStatus::Pending)
    }
}
