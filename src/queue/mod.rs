//! Shared Work Queue
//!
//! The single buffer that connects every producer to every consumer of a
//! pipeline run, plus the aggregator that turns its change notifications into
//! cumulative statistics.
//!
//! # Overview
//!
//! - **Global FIFO**: retrieval order matches append order across all producers
//! - **Two retrieval modes**: [`ConcurrentQueue::try_take`] never waits,
//!   [`ConcurrentQueue::take`] waits until an item arrives or the run is cancelled
//! - **One guarded state**: both modes go through the same mutex-guarded deque,
//!   so a waiter can never be handed an item that is not there
//! - **Notifications**: every append/removal is announced to synchronous
//!   [`QueueObserver`]s and published as an `Event::Queue` on the notification system
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  ┌────────────┐
//! │ Producer-1 │  │ Producer-2 │
//! └─────┬──────┘  └─────┬──────┘
//!       │ append        │ append
//!       ▼               ▼
//! ┌──────────────────────────────┐      ┌──────────────────────┐
//! │ ConcurrentQueue              │─────▶│ StatisticsAggregator │
//! │  ┌───┬───┬───┬───┬───┐       │ obs  └──────────────────────┘
//! │  │ 1 │ 2 │ 3 │ 4 │...│       │
//! │  └───┴───┴───┴───┴───┘       │
//! └──────┬───────────────┬───────┘
//!        │ take          │ take
//! ┌──────┴─────┐  ┌──────┴─────┐
//! │ Consumer-1 │  │ Consumer-2 │   (each item goes to exactly one consumer)
//! └────────────┘  └────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use prodcons::core::shutdown::CancellationSignal;
//! use prodcons::notifications::api::NotificationManager;
//! use prodcons::queue::{ConcurrentQueue, Item, StatisticsAggregator};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let notifier = Arc::new(NotificationManager::new());
//! let queue = Arc::new(ConcurrentQueue::new("main", notifier.clone()));
//! let stats = StatisticsAggregator::attach(queue.clone(), notifier);
//!
//! queue.append(Item::new(7, "Producer-1"));
//!
//! let cancel = CancellationSignal::new();
//! if let Some(item) = queue.take(&cancel).await {
//!     println!("took {} from {}", item.value(), item.producer_id());
//! }
//! assert_eq!(stats.snapshot().total_dequeued, 1);
//! # }
//! ```

mod internal;
mod item;
mod statistics;

pub mod api;

pub use internal::{ConcurrentQueue, QueueObserver};
pub use item::Item;
pub use statistics::{QueueStatistics, StatisticsAggregator};

#[cfg(test)]
mod tests;
