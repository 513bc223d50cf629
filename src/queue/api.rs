//! Public API for the queue system
//!
//! External modules should import from here rather than directly from internal modules.

// Core queue components
pub use crate::queue::internal::{ConcurrentQueue, QueueObserver};

// Work items
pub use crate::queue::item::Item;

// Statistics
pub use crate::queue::statistics::{QueueStatistics, StatisticsAggregator};
