//! Reference scenarios

use crate::common::{fast_config, total_consumed, total_produced, wait_until};
use prodcons::core::shutdown::CancellationSignal;
use prodcons::notifications::api::{Event, EventFilter, NotificationManager, QueueEventType};
use prodcons::pipeline::api::{
    EventLogger, Orchestrator, PipelineConfig, PipelineLogger, ProducerWorker,
};
use prodcons::queue::{ConcurrentQueue, Item, StatisticsAggregator};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_snapshot_of_idle_queue() {
    let queue = ConcurrentQueue::new("scenario-1", Arc::new(NotificationManager::new()));
    for value in [1, 2, 3, 4, 5] {
        queue.append(Item::new(value, "Producer-1"));
    }

    let head: Vec<i64> = queue.snapshot(3).iter().map(Item::value).collect();
    assert_eq!(head, vec![1, 2, 3]);
    assert_eq!(queue.size(), 5);
}

#[tokio::test]
async fn test_single_producer_single_consumer_drains_everything() {
    let notifier = Arc::new(NotificationManager::new());
    let mut events = notifier.subscribe("scenario-2", EventFilter::QueueOnly, "test");
    let orchestrator = Orchestrator::standalone(notifier);

    let config = PipelineConfig {
        producer_count: 1,
        consumer_count: 1,
        producer_delay_ms: 0,
        consumer_delay_ms: 0,
        min_value: 1,
        max_value: 2,
        items_per_producer: Some(10),
        ..fast_config()
    };
    orchestrator.start(config).await.unwrap();

    wait_until(Duration::from_secs(5), "10 items consumed", || {
        let consumed = total_consumed(&orchestrator);
        async move { consumed == 10 }
    })
    .await;
    orchestrator.stop().await.unwrap();

    assert_eq!(total_produced(&orchestrator), 10);
    assert_eq!(total_consumed(&orchestrator), 10);
    assert_eq!(orchestrator.get_queue_statistics().current_size, 0);

    let mut enqueued_values = Vec::new();
    while let Ok(Event::Queue(event)) = events.try_recv() {
        if event.event_type == QueueEventType::ItemEnqueued {
            enqueued_values.push(event.item.value());
        }
    }
    assert_eq!(enqueued_values, vec![1; 10]);
}

#[tokio::test]
async fn test_two_producers_without_consumers() {
    let notifier = Arc::new(NotificationManager::new());
    let queue = Arc::new(ConcurrentQueue::new("scenario-3", notifier.clone()));
    let aggregator = StatisticsAggregator::attach(queue.clone(), notifier.clone());
    let logger: Arc<dyn PipelineLogger> = Arc::new(EventLogger::new(notifier));

    let config = PipelineConfig {
        producer_delay_ms: 0,
        items_per_producer: Some(5),
        ..Default::default()
    };
    let producers: Vec<Arc<ProducerWorker>> = (1..=2)
        .map(|n| {
            Arc::new(ProducerWorker::new(
                format!("Producer-{n}"),
                queue.clone(),
                logger.clone(),
                &config,
            ))
        })
        .collect();

    let cancel = CancellationSignal::new();
    let handles: Vec<_> = producers
        .iter()
        .map(|producer| {
            let producer = producer.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { producer.start(&cancel).await })
        })
        .collect();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("Producers with a limit finish by themselves")
            .unwrap();
    }

    assert_eq!(queue.size(), 10);
    let stats = aggregator.snapshot();
    assert_eq!(stats.current_size, 10);
    assert_eq!(stats.total_enqueued, 10);
    assert_eq!(stats.total_dequeued, 0);
    for producer in &producers {
        assert_eq!(producer.get_statistics().total_produced, 5);
    }
}
