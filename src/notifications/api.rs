//! Public API for the notification system
//!
//! External modules should import from here rather than directly from internal modules.
//!
//! # Examples
//! ```no_run
//! # use prodcons::notifications::api::{Event, EventFilter, NotificationManager};
//! # async fn example() {
//! let manager = NotificationManager::new();
//! let mut rx = manager.subscribe("ui", EventFilter::StatisticsOnly, "app:display");
//! while let Some(Event::Statistics(stats)) = rx.recv().await {
//!     println!("{stats:?}");
//! }
//! # }
//! ```

// Core event types and enums
pub use crate::notifications::event::{
    Event, EventFilter, LogEvent, LogLevel, QueueEvent, QueueEventType, StatisticsEvent,
    SystemEvent, SystemEventType,
};

// Manager and errors
pub use crate::notifications::error::NotificationError;
pub use crate::notifications::manager::NotificationManager;

/// Receiving end of a subscription
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<Event>;
