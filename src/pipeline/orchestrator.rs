//! Pipeline orchestrator
//!
//! Owns the workers of a run and the cancellation signal they share, drives
//! the periodic statistics tick and exposes the start/stop lifecycle.

use crate::core::shutdown::CancellationSignal;
use crate::notifications::api::{
    Event, NotificationManager, StatisticsEvent, SystemEvent, SystemEventType,
};
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::consumer::ConsumerWorker;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::logger::{EventLogger, PipelineLogger};
use crate::pipeline::producer::ProducerWorker;
use crate::pipeline::stats::{ConsumerStatistics, ProducerStatistics};
use crate::queue::{ConcurrentQueue, Item, QueueStatistics, StatisticsAggregator};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

/// Default identifier of the queue created by [`Orchestrator::standalone`]
pub const DEFAULT_QUEUE_ID: &str = "main";

struct ActiveRun {
    cancel: CancellationSignal,
    workers: Vec<(String, JoinHandle<()>)>,
    ticker: JoinHandle<()>,
}

/// Collects the collaborators of an [`Orchestrator`]
#[derive(Default)]
pub struct OrchestratorBuilder {
    queue: Option<Arc<ConcurrentQueue>>,
    aggregator: Option<Arc<StatisticsAggregator>>,
    logger: Option<Arc<dyn PipelineLogger>>,
    notifier: Option<Arc<NotificationManager>>,
}

impl OrchestratorBuilder {
    pub fn queue(mut self, queue: Arc<ConcurrentQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn aggregator(mut self, aggregator: Arc<StatisticsAggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    pub fn logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn notifier(mut self, notifier: Arc<NotificationManager>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the orchestrator, refusing if any collaborator is missing
    pub fn build(self) -> PipelineResult<Orchestrator> {
        let queue = self
            .queue
            .ok_or(PipelineError::MissingCollaborator { name: "queue" })?;
        let aggregator = self
            .aggregator
            .ok_or(PipelineError::MissingCollaborator { name: "aggregator" })?;
        let logger = self
            .logger
            .ok_or(PipelineError::MissingCollaborator { name: "logger" })?;
        let notifier = self
            .notifier
            .ok_or(PipelineError::MissingCollaborator { name: "notifier" })?;

        if !Arc::ptr_eq(aggregator.queue(), &queue) {
            return Err(PipelineError::QueueMismatch {
                queue: queue.queue_id().to_string(),
                aggregator_queue: aggregator.queue().queue_id().to_string(),
            });
        }

        Ok(Orchestrator {
            queue,
            aggregator,
            logger,
            notifier,
            running: AtomicBool::new(false),
            run: Mutex::new(None),
            producers: RwLock::new(Vec::new()),
            consumers: RwLock::new(Vec::new()),
        })
    }
}

/// Lifecycle owner of a producer/consumer pipeline
pub struct Orchestrator {
    queue: Arc<ConcurrentQueue>,
    aggregator: Arc<StatisticsAggregator>,
    logger: Arc<dyn PipelineLogger>,
    notifier: Arc<NotificationManager>,
    running: AtomicBool,
    run: Mutex<Option<ActiveRun>>,
    producers: RwLock<Vec<Arc<ProducerWorker>>>,
    consumers: RwLock<Vec<Arc<ConsumerWorker>>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("queue", &self.queue)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Orchestrator with its own queue, aggregator and [`EventLogger`]
    pub fn standalone(notifier: Arc<NotificationManager>) -> Self {
        let queue = Arc::new(ConcurrentQueue::new(DEFAULT_QUEUE_ID, notifier.clone()));
        let aggregator = StatisticsAggregator::attach(queue.clone(), notifier.clone());
        let logger: Arc<dyn PipelineLogger> = Arc::new(EventLogger::new(notifier.clone()));

        Self {
            queue,
            aggregator,
            logger,
            notifier,
            running: AtomicBool::new(false),
            run: Mutex::new(None),
            producers: RwLock::new(Vec::new()),
            consumers: RwLock::new(Vec::new()),
        }
    }

    pub fn queue(&self) -> &Arc<ConcurrentQueue> {
        &self.queue
    }

    pub fn notifier(&self) -> &Arc<NotificationManager> {
        &self.notifier
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Launch the workers of a new run
    ///
    /// Does nothing when a run is already active. The configuration is
    /// validated before anything is spawned.
    pub async fn start(&self, config: PipelineConfig) -> PipelineResult<()> {
        let mut run = self.run.lock().await;
        if run.is_some() {
            log::debug!("Pipeline already running; start ignored");
            return Ok(());
        }

        config.validate()?;
        self.queue.set_high_water_mark(config.max_queue_size);

        let carried_over = self.queue.size();
        if carried_over > 0 {
            self.logger.log_info(&format!(
                "{} items carried over from the previous run",
                carried_over
            ));
        }

        let producers: Vec<Arc<ProducerWorker>> = (1..=config.producer_count)
            .map(|n| {
                Arc::new(ProducerWorker::new(
                    format!("Producer-{n}"),
                    self.queue.clone(),
                    self.logger.clone(),
                    &config,
                ))
            })
            .collect();
        let consumers: Vec<Arc<ConsumerWorker>> = (1..=config.consumer_count)
            .map(|n| {
                Arc::new(ConsumerWorker::new(
                    format!("Consumer-{n}"),
                    self.queue.clone(),
                    self.logger.clone(),
                    &config,
                ))
            })
            .collect();

        *self
            .producers
            .write()
            .unwrap_or_else(PoisonError::into_inner) = producers.clone();
        *self
            .consumers
            .write()
            .unwrap_or_else(PoisonError::into_inner) = consumers.clone();

        let cancel = CancellationSignal::new();
        let mut workers = Vec::with_capacity(producers.len() + consumers.len());

        for producer in &producers {
            let worker = producer.clone();
            let cancel = cancel.clone();
            workers.push((
                producer.id().to_string(),
                tokio::spawn(async move { worker.start(&cancel).await }),
            ));
        }
        for consumer in &consumers {
            let worker = consumer.clone();
            let cancel = cancel.clone();
            workers.push((
                consumer.id().to_string(),
                tokio::spawn(async move { worker.start(&cancel).await }),
            ));
        }

        let ticker = tokio::spawn(run_ticker(
            config.tick_interval(),
            StatisticsSources {
                producers,
                consumers,
                aggregator: self.aggregator.clone(),
                notifier: self.notifier.clone(),
            },
            cancel.clone(),
        ));

        *run = Some(ActiveRun {
            cancel,
            workers,
            ticker,
        });
        self.running.store(true, Ordering::Release);

        let summary = format!(
            "Pipeline started with {} producers and {} consumers",
            config.producer_count, config.consumer_count
        );
        self.logger.log_info(&summary);
        self.publish_system(SystemEventType::Started, summary);
        Ok(())
    }

    /// Cancel the active run and wait for every worker to exit
    ///
    /// Does nothing when no run is active. Statistics read after this returns
    /// are final for the run.
    pub async fn stop(&self) -> PipelineResult<()> {
        let mut run = self.run.lock().await;
        let Some(active) = run.take() else {
            log::debug!("Pipeline not running; stop ignored");
            return Ok(());
        };

        active.cancel.raise();

        let mut failures = Vec::new();
        if let Err(e) = active.ticker.await {
            failures.push(("statistics-tick".to_string(), e));
        }

        let (names, handles): (Vec<String>, Vec<JoinHandle<()>>) =
            active.workers.into_iter().unzip();
        for (name, result) in names.into_iter().zip(join_all(handles).await) {
            if let Err(e) = result {
                failures.push((name, e));
            }
        }

        self.running.store(false, Ordering::Release);
        self.publish_statistics();

        let queue_stats = self.aggregator.snapshot();
        let summary = format!(
            "Pipeline stopped with {} items left in the queue",
            queue_stats.current_size
        );
        self.logger.log_info(&summary);
        self.publish_system(SystemEventType::Stopped, summary);

        match failures.into_iter().next() {
            None => Ok(()),
            Some((worker, error)) => {
                let error = worker_failure(worker, error);
                self.logger.log_error(&error.to_string());
                Err(error)
            }
        }
    }

    pub fn get_producer_statistics(&self) -> Vec<ProducerStatistics> {
        let producers = self
            .producers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        producers.iter().map(|p| p.get_statistics()).collect()
    }

    pub fn get_consumer_statistics(&self) -> Vec<ConsumerStatistics> {
        let consumers = self
            .consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        consumers.iter().map(|c| c.get_statistics()).collect()
    }

    pub fn get_queue_statistics(&self) -> QueueStatistics {
        self.aggregator.snapshot()
    }

    /// Up to `max_items` queued items, oldest first
    pub fn snapshot(&self, max_items: usize) -> Vec<Item> {
        self.queue.snapshot(max_items)
    }

    fn publish_statistics(&self) {
        let producers = self
            .producers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let consumers = self
            .consumers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        StatisticsSources {
            producers,
            consumers,
            aggregator: self.aggregator.clone(),
            notifier: self.notifier.clone(),
        }
        .publish();
    }

    fn publish_system(&self, event_type: SystemEventType, message: String) {
        if let Err(e) = self
            .notifier
            .publish(Event::System(SystemEvent::with_message(event_type, message)))
        {
            log::debug!("System notification: {}", e);
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        // Workers of a run that was never stopped must not outlive us
        if let Some(active) = self.run.get_mut().as_ref() {
            active.cancel.raise();
        }
    }
}

/// Everything one statistics tick reads
struct StatisticsSources {
    producers: Vec<Arc<ProducerWorker>>,
    consumers: Vec<Arc<ConsumerWorker>>,
    aggregator: Arc<StatisticsAggregator>,
    notifier: Arc<NotificationManager>,
}

impl StatisticsSources {
    fn publish(&self) {
        let producer_events = self
            .producers
            .iter()
            .map(|p| StatisticsEvent::Producer(p.get_statistics()));
        let consumer_events = self
            .consumers
            .iter()
            .map(|c| StatisticsEvent::Consumer(c.get_statistics()));
        let queue_event = StatisticsEvent::Queue(self.aggregator.snapshot());

        for event in producer_events
            .chain(consumer_events)
            .chain(std::iter::once(queue_event))
        {
            if let Err(e) = self.notifier.publish(Event::Statistics(event)) {
                log::debug!("Statistics notification: {}", e);
            }
        }
    }
}

async fn run_ticker(period: Duration, sources: StatisticsSources, cancel: CancellationSignal) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; statistics start one period in
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => sources.publish(),
        }
    }
}

fn worker_failure(worker: String, error: JoinError) -> PipelineError {
    let message = if error.is_panic() {
        let payload = error.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string())
    } else {
        error.to_string()
    };
    PipelineError::WorkerPanicked { worker, message }
}
