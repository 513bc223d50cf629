//! Logger collaborator used by workers and the orchestrator
//!
//! Workers never log through the `log` facade directly; they go through a
//! [`PipelineLogger`] so a host can observe the log stream. [`EventLogger`]
//! forwards to `log` and republishes every entry as [`Event::Log`].

use crate::notifications::api::{Event, LogEvent, LogLevel, NotificationManager};
use std::sync::Arc;

pub trait PipelineLogger: Send + Sync {
    fn log_debug(&self, message: &str);
    fn log_info(&self, message: &str);
    fn log_warning(&self, message: &str);
    fn log_error(&self, message: &str);
}

/// Logs through the `log` facade and publishes a [`LogEvent`] per entry
pub struct EventLogger {
    notifier: Arc<NotificationManager>,
}

impl EventLogger {
    pub fn new(notifier: Arc<NotificationManager>) -> Self {
        Self { notifier }
    }

    fn publish(&self, level: LogLevel, message: &str) {
        // Failed subscribers are pruned by the manager; nothing to log here
        // without recursing into ourselves
        let _ = self
            .notifier
            .publish(Event::Log(LogEvent::new(level, message)));
    }
}

impl PipelineLogger for EventLogger {
    fn log_debug(&self, message: &str) {
        log::debug!("{}", message);
        self.publish(LogLevel::Debug, message);
    }

    fn log_info(&self, message: &str) {
        log::info!("{}", message);
        self.publish(LogLevel::Info, message);
    }

    fn log_warning(&self, message: &str) {
        log::warn!("{}", message);
        self.publish(LogLevel::Warning, message);
    }

    fn log_error(&self, message: &str) {
        log::error!("{}", message);
        self.publish(LogLevel::Error, message);
    }
}
