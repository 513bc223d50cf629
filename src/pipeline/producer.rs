//! Producer worker
//!
//! Generates random items at a fixed cadence and appends them to the shared
//! queue until the run is cancelled or its optional item limit is reached.

use crate::core::shutdown::CancellationSignal;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::logger::PipelineLogger;
use crate::pipeline::stats::{ProducerStatistics, StatisticsCell, WorkerState};
use crate::queue::{ConcurrentQueue, Item};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

pub struct ProducerWorker {
    id: String,
    queue: Arc<ConcurrentQueue>,
    logger: Arc<dyn PipelineLogger>,
    delay: Duration,
    min_value: i64,
    max_value: i64,
    item_limit: Option<u64>,
    stats: StatisticsCell<ProducerStatistics>,
}

impl std::fmt::Debug for ProducerWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerWorker")
            .field("id", &self.id)
            .field("delay", &self.delay)
            .finish()
    }
}

impl ProducerWorker {
    pub fn new(
        id: impl Into<String>,
        queue: Arc<ConcurrentQueue>,
        logger: Arc<dyn PipelineLogger>,
        config: &PipelineConfig,
    ) -> Self {
        let id = id.into();
        Self {
            stats: StatisticsCell::new(ProducerStatistics::new(id.clone())),
            id,
            queue,
            logger,
            delay: config.producer_delay(),
            min_value: config.min_value,
            max_value: config.max_value,
            item_limit: config.items_per_producer,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Consistent copy of this worker's counters
    pub fn get_statistics(&self) -> ProducerStatistics {
        self.stats.read()
    }

    /// Run the production loop until `cancel` is raised or the item limit is hit
    ///
    /// A worker runs once; calling this again after it has started only logs
    /// a warning.
    pub async fn start(&self, cancel: &CancellationSignal) {
        let started = self.stats.update(|stats| {
            if stats.state != WorkerState::Idle {
                return false;
            }
            stats.state = WorkerState::Running;
            stats.started_at = Some(Utc::now());
            stats.is_active = true;
            true
        });
        if !started {
            self.logger
                .log_warning(&format!("{} has already been started", self.id));
            return;
        }
        self.logger.log_info(&format!("{} started", self.id));

        let mut produced: u64 = 0;
        let mut limit_reached = false;
        while !cancel.is_raised() {
            if self.item_limit.is_some_and(|limit| produced >= limit) {
                limit_reached = true;
                break;
            }

            let value = self.next_value();
            let item = Item::new(value, self.id.as_str());
            let created_at = item.created_at();
            self.queue.append(item);
            produced += 1;

            self.stats.update(|stats| {
                stats.total_produced += 1;
                stats.last_produced_at = Some(created_at);
                stats.is_active = true;
            });
            self.logger
                .log_debug(&format!("{} produced {}", self.id, value));

            if !cancel.sleep(self.delay).await {
                break;
            }
        }

        self.stats.update(|stats| {
            stats.state = WorkerState::Stopped;
            stats.is_active = false;
            stats.stopped_at = Some(Utc::now());
        });

        if limit_reached {
            self.logger
                .log_info(&format!("{} finished after {} items", self.id, produced));
        } else {
            self.logger.log_info(&format!("{} cancelled", self.id));
        }
    }

    fn next_value(&self) -> i64 {
        if self.min_value.saturating_add(1) >= self.max_value {
            return self.min_value;
        }
        rand::rng().random_range(self.min_value..self.max_value)
    }
}
