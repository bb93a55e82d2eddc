//! Errores específicos del core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum CoreEngineError {
    #[error("missing input artifact: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("tool `{program}` exited with status {status:?}")]
    ToolFailed { program: String, status: Option<i32> },
    #[error("tool `{program}` could not be started: {reason}")]
    ToolSpawn { program: String, reason: String },
    #[error("tool `{program}` reported success but did not write {}", output.display())]
    OutputNotWritten { program: String, output: PathBuf },
    #[error("io error on {}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },
    #[error("step `{step_id}` failed: {cause}")]
    StepFailed { step_id: String, cause: Box<CoreEngineError> },
    #[error("flow has no steps")]
    EmptyFlow,
    #[error("internal: {0}")]
    Internal(String),
}

impl CoreEngineError {
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io { path: path.into(),
                   reason: err.to_string() }
    }
}
