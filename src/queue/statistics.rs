//! Queue statistics aggregation
//!
//! The aggregator observes every enqueue/dequeue of one queue, keeps
//! cumulative counters and republishes a fresh [`QueueStatistics`] snapshot
//! after each change.

use crate::notifications::api::{Event, NotificationManager, StatisticsEvent};
use crate::queue::internal::{ConcurrentQueue, QueueObserver};
use crate::queue::item::Item;
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

/// Point-in-time view of a queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatistics {
    /// Live size of the queue when the snapshot was taken
    pub current_size: usize,
    /// Configured advisory maximum (0 when unset)
    pub max_size: usize,
    pub total_enqueued: u64,
    pub total_dequeued: u64,
    /// Mean time items spent between creation and dequeue
    pub average_wait_time: Duration,
}

#[derive(Debug, Default, Clone, Copy)]
struct QueueCounters {
    total_enqueued: u64,
    total_dequeued: u64,
    total_wait: Duration,
}

impl QueueCounters {
    fn average_wait(&self) -> Duration {
        if self.total_dequeued == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total_wait.as_nanos() / u128::from(self.total_dequeued);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

/// Cumulative enqueue/dequeue statistics for one queue
pub struct StatisticsAggregator {
    queue: Arc<ConcurrentQueue>,
    counters: Mutex<QueueCounters>,
    notifier: Arc<NotificationManager>,
}

impl StatisticsAggregator {
    /// Create an aggregator and register it as an observer of `queue`
    pub fn attach(queue: Arc<ConcurrentQueue>, notifier: Arc<NotificationManager>) -> Arc<Self> {
        let aggregator = Arc::new(Self {
            queue: Arc::clone(&queue),
            counters: Mutex::new(QueueCounters::default()),
            notifier,
        });

        let observer: Weak<dyn QueueObserver> = Arc::downgrade(&aggregator) as Weak<dyn QueueObserver>;
        queue.register_observer(observer);
        aggregator
    }

    /// The queue this aggregator observes
    pub fn queue(&self) -> &Arc<ConcurrentQueue> {
        &self.queue
    }

    /// Current statistics
    pub fn snapshot(&self) -> QueueStatistics {
        let counters = *self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        self.build(counters)
    }

    fn build(&self, counters: QueueCounters) -> QueueStatistics {
        // Counters lock is already released here; only the queue lock is taken
        QueueStatistics {
            current_size: self.queue.size(),
            max_size: self.queue.high_water_mark(),
            total_enqueued: counters.total_enqueued,
            total_dequeued: counters.total_dequeued,
            average_wait_time: counters.average_wait(),
        }
    }

    fn record(&self, update: impl FnOnce(&mut QueueCounters)) {
        let counters = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            update(&mut counters);
            *counters
        };

        let stats = self.build(counters);
        if let Err(e) = self
            .notifier
            .publish(Event::Statistics(StatisticsEvent::Queue(stats)))
        {
            log::debug!("Queue statistics notification: {}", e);
        }
    }
}

impl QueueObserver for StatisticsAggregator {
    fn on_enqueued(&self, _item: &Item, _size: usize) {
        self.record(|counters| counters.total_enqueued += 1);
    }

    fn on_dequeued(&self, item: &Item, _size: usize) {
        let waited = item.age_at(Utc::now());
        self.record(|counters| {
            counters.total_dequeued += 1;
            counters.total_wait += waited;
        });
    }
}
