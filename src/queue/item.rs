//! Work item flowing from producers to consumers

use chrono::{DateTime, Utc};

/// A unit of work created by one producer and consumed by exactly one consumer
///
/// Items are immutable once created; consumers only read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    value: i64,
    created_at: DateTime<Utc>,
    producer_id: String,
}

impl Item {
    /// Create an item stamped with the current time
    pub fn new(value: i64, producer_id: impl Into<String>) -> Self {
        Self::with_timestamp(value, producer_id, Utc::now())
    }

    pub fn with_timestamp(
        value: i64,
        producer_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value,
            created_at,
            producer_id: producer_id.into(),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn producer_id(&self) -> &str {
        &self.producer_id
    }

    /// Time the item has spent between creation and `now`
    ///
    /// Clamped to zero if the clock went backwards.
    pub fn age_at(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }
}
