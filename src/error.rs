use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::{Role, Status};

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(String),

    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid transition for {role} task: {from} -> {to}")]
    InvalidTransition { role: Role, from: Status, to: Status },
}

/// Serializable form of an error, kept as the facade's error state and
/// printed by the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl PlannerError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            PlannerError::DatabaseError(_)
            | PlannerError::IoError(_)
            | PlannerError::JsonError(_)
            | PlannerError::Transport(_) => "TRANSPORT_ERROR",
            PlannerError::TaskNotFound(_) => "TASK_NOT_FOUND",
            PlannerError::CategoryNotFound(_) => "CATEGORY_NOT_FOUND",
            PlannerError::InvalidInput(_) => "INVALID_INPUT",
            PlannerError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }

    /// True for failures raised by the store boundary rather than by the engine.
    pub fn is_transport(&self) -> bool {
        self.to_error_code() == "TRANSPORT_ERROR"
    }
}

impl From<PlannerError> for ErrorResponse {
    fn from(err: PlannerError) -> Self {
        err.to_error_response()
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
