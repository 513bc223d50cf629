//! Event types for the notification system

use std::time::SystemTime;

use crate::pipeline::stats::{ConsumerStatistics, ProducerStatistics};
use crate::queue::{Item, QueueStatistics};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum QueueEventType {
    ItemEnqueued,
    ItemDequeued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum SystemEventType {
    Started,
    Stopped,
}

/// Severity of a log entry published on the log stream
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// An item entered or left the queue
#[derive(Clone, Debug)]
pub struct QueueEvent {
    pub event_type: QueueEventType,
    pub timestamp: SystemTime,
    pub queue_id: String,
    pub item: Item,
    /// Queue size right after the operation
    pub size: usize,
}

impl QueueEvent {
    pub fn enqueued(queue_id: &str, item: Item, size: usize) -> Self {
        Self::new(QueueEventType::ItemEnqueued, queue_id, item, size)
    }

    pub fn dequeued(queue_id: &str, item: Item, size: usize) -> Self {
        Self::new(QueueEventType::ItemDequeued, queue_id, item, size)
    }

    fn new(event_type: QueueEventType, queue_id: &str, item: Item, size: usize) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            queue_id: queue_id.to_string(),
            item,
            size,
        }
    }
}

/// Periodic or change-driven statistics snapshot
#[derive(Clone, Debug)]
pub enum StatisticsEvent {
    Producer(ProducerStatistics),
    Consumer(ConsumerStatistics),
    Queue(QueueStatistics),
}

#[derive(Clone, Debug)]
pub struct LogEvent {
    pub level: LogLevel,
    pub timestamp: SystemTime,
    pub message: String,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: SystemTime::now(),
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SystemEvent {
    pub fn new(event_type: SystemEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(event_type: SystemEventType, message: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: Some(message),
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Queue(QueueEvent),
    Statistics(StatisticsEvent),
    Log(LogEvent),
    System(SystemEvent),
}

impl Event {
    /// Short category name used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Queue(_) => "Queue",
            Event::Statistics(_) => "Statistics",
            Event::Log(_) => "Log",
            Event::System(_) => "System",
        }
    }
}

/// Event filtering options for subscribers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventFilter {
    QueueOnly,
    StatisticsOnly,
    LogOnly,
    SystemOnly,
    StatisticsAndSystem,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::QueueOnly, Event::Queue(_))
                | (EventFilter::StatisticsOnly, Event::Statistics(_))
                | (EventFilter::LogOnly, Event::Log(_))
                | (EventFilter::SystemOnly, Event::System(_))
                | (EventFilter::StatisticsAndSystem, Event::Statistics(_))
                | (EventFilter::StatisticsAndSystem, Event::System(_))
                | (EventFilter::All, _)
        )
    }
}
