//! Pipeline Error Types

use crate::core::error_handling::ContextualError;
use crate::core::validation::ValidationError;

/// Errors raised while building, configuring or running a pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Configuration rejected before any worker was spawned
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    /// A required collaborator was not supplied to the builder
    #[error("Missing required collaborator: {name}")]
    MissingCollaborator { name: &'static str },

    /// The statistics aggregator observes a different queue than the one supplied
    #[error("Statistics aggregator is attached to queue '{aggregator_queue}', not '{queue}'")]
    QueueMismatch {
        queue: String,
        aggregator_queue: String,
    },

    /// A configuration file could not be read or parsed
    #[error("Configuration file {path}: {message}")]
    ConfigFile { path: String, message: String },

    /// A worker task panicked instead of returning
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked { worker: String, message: String },
}

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PipelineError::InvalidConfig(_) => true,     // User can fix config values
            PipelineError::ConfigFile { .. } => true,    // User can fix the file
            PipelineError::MissingCollaborator { .. } => false,
            PipelineError::QueueMismatch { .. } => false,
            PipelineError::WorkerPanicked { .. } => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PipelineError::InvalidConfig(e) => e.user_message(),
            PipelineError::ConfigFile { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
