//! Command line arguments
//!
//! Every pipeline option is optional on the command line so that values from
//! the configuration file are only overridden by flags the user actually gave.

use crate::pipeline::api::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "prodcons")]
#[command(about = "Concurrent producer/consumer pipeline")]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of producer workers
    #[arg(short = 'p', long = "producers", value_name = "COUNT")]
    pub producers: Option<usize>,

    /// Number of consumer workers
    #[arg(short = 'n', long = "consumers", value_name = "COUNT")]
    pub consumers: Option<usize>,

    /// Delay between produced items in milliseconds
    #[arg(long = "producer-delay", value_name = "MS")]
    pub producer_delay: Option<u64>,

    /// Simulated processing time per item in milliseconds
    #[arg(long = "consumer-delay", value_name = "MS")]
    pub consumer_delay: Option<u64>,

    /// Smallest generated value (inclusive)
    #[arg(long = "min-value", value_name = "VALUE", allow_negative_numbers = true)]
    pub min_value: Option<i64>,

    /// Largest generated value (exclusive)
    #[arg(long = "max-value", value_name = "VALUE", allow_negative_numbers = true)]
    pub max_value: Option<i64>,

    /// Advisory queue size; a warning is logged when the queue grows past it
    #[arg(long = "max-queue-size", value_name = "COUNT")]
    pub max_queue_size: Option<usize>,

    /// Stop each producer after this many items
    #[arg(short = 'i', long = "items-per-producer", value_name = "COUNT")]
    pub items_per_producer: Option<u64>,

    /// Run time in seconds (0 runs until interrupted)
    #[arg(short = 'd', long = "duration", value_name = "SECS")]
    pub duration: Option<u64>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force coloured output
    #[arg(short = 'g', long = "color", overrides_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", overrides_with = "color")]
    pub no_color: bool,
}

impl Args {
    /// --color sets Some(true), --no-color sets Some(false), neither = None (auto)
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Requested run time; `None` runs until interrupted
    pub fn run_duration(&self) -> Option<Option<Duration>> {
        self.duration
            .map(|secs| (secs > 0).then(|| Duration::from_secs(secs)))
    }

    /// Overwrite `config` with every pipeline flag given on the command line
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(count) = self.producers {
            config.producer_count = count;
        }
        if let Some(count) = self.consumers {
            config.consumer_count = count;
        }
        if let Some(delay) = self.producer_delay {
            config.producer_delay_ms = delay;
        }
        if let Some(delay) = self.consumer_delay {
            config.consumer_delay_ms = delay;
        }
        if let Some(value) = self.min_value {
            config.min_value = value;
        }
        if let Some(value) = self.max_value {
            config.max_value = value;
        }
        if let Some(size) = self.max_queue_size {
            config.max_queue_size = size;
        }
        if let Some(limit) = self.items_per_producer {
            config.items_per_producer = Some(limit);
        }
    }
}
