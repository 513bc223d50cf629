//! Pipeline configuration
//!
//! The configuration is supplied once to [`Orchestrator::start`] and stays
//! fixed for the whole run. It can be built in code, read from a TOML file
//! with kebab-case keys, or both (the binary merges CLI flags over a file).
//!
//! ```toml
//! producer-count = 2
//! consumer-count = 3
//! producer-delay-ms = 250
//! consumer-delay-ms = 400
//! min-value = 1
//! max-value = 1000
//! max-queue-size = 100
//! items-per-producer = 50
//! ```
//!
//! [`Orchestrator::start`]: crate::pipeline::Orchestrator::start

use crate::core::validation::{validate_positive, validate_range, ValidationError};
use crate::pipeline::error::{PipelineError, PipelineResult};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PRODUCER_COUNT: usize = 1;
pub const DEFAULT_CONSUMER_COUNT: usize = 2;
pub const DEFAULT_PRODUCER_DELAY_MS: u64 = 500;
pub const DEFAULT_CONSUMER_DELAY_MS: u64 = 800;
pub const DEFAULT_MIN_VALUE: i64 = 1;
pub const DEFAULT_MAX_VALUE: i64 = 1000;
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PipelineConfig {
    pub producer_count: usize,
    pub consumer_count: usize,
    pub producer_delay_ms: u64,
    pub consumer_delay_ms: u64,
    /// Inclusive lower bound of generated values
    pub min_value: i64,
    /// Exclusive upper bound of generated values
    pub max_value: i64,
    /// Advisory queue size; the queue never rejects items past it
    pub max_queue_size: usize,
    /// Stop each producer by itself after this many items
    pub items_per_producer: Option<u64>,
    pub tick_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            producer_count: DEFAULT_PRODUCER_COUNT,
            consumer_count: DEFAULT_CONSUMER_COUNT,
            producer_delay_ms: DEFAULT_PRODUCER_DELAY_MS,
            consumer_delay_ms: DEFAULT_CONSUMER_DELAY_MS,
            min_value: DEFAULT_MIN_VALUE,
            max_value: DEFAULT_MAX_VALUE,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            items_per_producer: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl PipelineConfig {
    /// Check every constraint a run depends on
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_positive("producer-count", self.producer_count as u64)?;
        validate_positive("consumer-count", self.consumer_count as u64)?;
        validate_range("min-value/max-value", self.min_value, self.max_value)?;
        validate_positive("max-queue-size", self.max_queue_size as u64)?;
        validate_positive("tick-interval-ms", self.tick_interval_ms)?;
        if let Some(limit) = self.items_per_producer {
            validate_positive("items-per-producer", limit)?;
        }
        Ok(())
    }

    pub fn producer_delay(&self) -> Duration {
        Duration::from_millis(self.producer_delay_ms)
    }

    pub fn consumer_delay(&self) -> Duration {
        Duration::from_millis(self.consumer_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Parse a TOML document; keys that are absent keep their defaults
    ///
    /// Keys unrelated to the pipeline (logging options and the like) are
    /// ignored so one file can configure the whole application.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Read and parse a TOML configuration file
    pub async fn load(path: &Path) -> PipelineResult<Self> {
        let contents =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| PipelineError::ConfigFile {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;

        Self::from_toml_str(&contents).map_err(|e| PipelineError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
