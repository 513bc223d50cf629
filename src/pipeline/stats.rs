//! Worker statistics
//!
//! Each worker owns one [`StatisticsCell`]. Only the worker's own task writes
//! it; any other task reads a complete copy, so a reader never sees the
//! counter from one update next to the timestamp from another.

use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};

/// Lifecycle of a single worker; a worker runs at most once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum WorkerState {
    #[default]
    Idle,
    Running,
    Stopped,
}

fn rate(
    count: u64,
    started_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> f64 {
    let Some(started) = started_at else {
        return 0.0;
    };
    let end = stopped_at.unwrap_or(now);
    let elapsed = (end - started).num_milliseconds();
    if elapsed <= 0 {
        return 0.0;
    }
    count as f64 * 1000.0 / elapsed as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProducerStatistics {
    pub id: String,
    pub total_produced: u64,
    pub last_produced_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub state: WorkerState,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl ProducerStatistics {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_produced: 0,
            last_produced_at: None,
            is_active: false,
            state: WorkerState::Idle,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Average production rate over the worker's running time
    pub fn items_per_second(&self) -> f64 {
        self.items_per_second_at(Utc::now())
    }

    pub fn items_per_second_at(&self, now: DateTime<Utc>) -> f64 {
        rate(self.total_produced, self.started_at, self.stopped_at, now)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerStatistics {
    pub id: String,
    pub total_consumed: u64,
    pub last_consumed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub state: WorkerState,
    pub started_at: Option<DateTime<Utc>>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl ConsumerStatistics {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_consumed: 0,
            last_consumed_at: None,
            is_active: false,
            state: WorkerState::Idle,
            started_at: None,
            stopped_at: None,
        }
    }

    /// Average consumption rate over the worker's running time
    pub fn items_per_second(&self) -> f64 {
        self.items_per_second_at(Utc::now())
    }

    pub fn items_per_second_at(&self, now: DateTime<Utc>) -> f64 {
        rate(self.total_consumed, self.started_at, self.stopped_at, now)
    }
}

/// Copy-on-read holder for a statistics record
#[derive(Debug)]
pub struct StatisticsCell<T> {
    inner: RwLock<T>,
}

impl<T: Clone> StatisticsCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }

    /// Complete copy of the current record
    pub fn read(&self) -> T {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `change` as one atomic update and return the result
    pub fn update<R>(&self, change: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut guard)
    }
}
