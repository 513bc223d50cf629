//! Producer/Consumer Pipeline
//!
//! Workers and the orchestrator that runs them against one shared
//! [`ConcurrentQueue`](crate::queue::ConcurrentQueue).
//!
//! A run is started with a validated [`PipelineConfig`], spawns one task per
//! producer and per consumer, and ends when [`Orchestrator::stop`] raises the
//! run's cancellation signal and joins every task.
//!
//! ```rust,no_run
//! use prodcons::notifications::api::NotificationManager;
//! use prodcons::pipeline::api::{Orchestrator, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::standalone(Arc::new(NotificationManager::new()));
//! orchestrator.start(PipelineConfig::default()).await?;
//! tokio::time::sleep(std::time::Duration::from_secs(3)).await;
//! orchestrator.stop().await?;
//!
//! let produced: u64 = orchestrator
//!     .get_producer_statistics()
//!     .iter()
//!     .map(|s| s.total_produced)
//!     .sum();
//! println!("produced {produced} items");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod logger;
pub mod orchestrator;
pub mod producer;
pub mod stats;

pub mod api;

pub use config::PipelineConfig;
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
