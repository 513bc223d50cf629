//! Consumer worker
//!
//! Blocks on the shared queue and simulates processing each item by waiting
//! for the configured delay.

use crate::core::shutdown::CancellationSignal;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::logger::PipelineLogger;
use crate::pipeline::stats::{ConsumerStatistics, StatisticsCell, WorkerState};
use crate::queue::ConcurrentQueue;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

pub struct ConsumerWorker {
    id: String,
    queue: Arc<ConcurrentQueue>,
    logger: Arc<dyn PipelineLogger>,
    delay: Duration,
    stats: StatisticsCell<ConsumerStatistics>,
}

impl std::fmt::Debug for ConsumerWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumerWorker")
            .field("id", &self.id)
            .field("delay", &self.delay)
            .finish()
    }
}

impl ConsumerWorker {
    pub fn new(
        id: impl Into<String>,
        queue: Arc<ConcurrentQueue>,
        logger: Arc<dyn PipelineLogger>,
        config: &PipelineConfig,
    ) -> Self {
        let id = id.into();
        Self {
            stats: StatisticsCell::new(ConsumerStatistics::new(id.clone())),
            id,
            queue,
            logger,
            delay: config.consumer_delay(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Consistent copy of this worker's counters
    pub fn get_statistics(&self) -> ConsumerStatistics {
        self.stats.read()
    }

    /// Run the consumption loop until `cancel` is raised
    ///
    /// An item is counted as soon as it leaves the queue, so cancellation
    /// during the processing delay never loses it.
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

        while let Some(item) = self.queue.take(cancel).await {
            self.stats.update(|stats| {
                stats.total_consumed += 1;
                stats.last_consumed_at = Some(Utc::now());
                stats.is_active = true;
            });
            self.logger.log_debug(&format!(
                "{} consumed {} from {}",
                self.id,
                item.value(),
                item.producer_id()
            ));

            if !cancel.sleep(self.delay).await {
                break;
            }
        }

        self.stats.update(|stats| {
            stats.state = WorkerState::Stopped;
            stats.is_active = false;
            stats.stopped_at = Some(Utc::now());
        });
        self.logger.log_info(&format!("{} cancelled", self.id));
    }
}
