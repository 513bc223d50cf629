//! Public API for the pipeline
//!
//! External modules should import from here rather than directly from internal modules.

// Configuration and errors
pub use crate::pipeline::config::PipelineConfig;
pub use crate::pipeline::error::{PipelineError, PipelineResult};

// Collaborators
pub use crate::pipeline::logger::{EventLogger, PipelineLogger};

// Workers and their statistics
pub use crate::pipeline::consumer::ConsumerWorker;
pub use crate::pipeline::producer::ProducerWorker;
pub use crate::pipeline::stats::{ConsumerStatistics, ProducerStatistics, WorkerState};

// Lifecycle
pub use crate::pipeline::orchestrator::{Orchestrator, OrchestratorBuilder};
