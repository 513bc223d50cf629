//! Conservation, no-loss and cancellation latency

use crate::common::{fast_config, total_consumed, total_produced, wait_until};
use prodcons::notifications::api::{Event, EventFilter, NotificationManager, QueueEventType};
use prodcons::pipeline::api::{Orchestrator, PipelineConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_conservation_after_stop() {
    let orchestrator = Orchestrator::standalone(Arc::new(NotificationManager::new()));
    let config = PipelineConfig {
        producer_count: 3,
        consumer_count: 2,
        producer_delay_ms: 1,
        consumer_delay_ms: 3,
        ..fast_config()
    };

    orchestrator.start(config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    orchestrator.stop().await.unwrap();

    let produced = total_produced(&orchestrator);
    let consumed = total_consumed(&orchestrator);
    let queue = orchestrator.get_queue_statistics();

    assert!(produced > 0);
    assert_eq!(produced, consumed + queue.current_size as u64);
    assert_eq!(queue.total_enqueued, produced);
    assert_eq!(queue.total_dequeued, consumed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_item_consumed_exactly_once() {
    let notifier = Arc::new(NotificationManager::new());
    let mut events = notifier.subscribe("no-loss", EventFilter::QueueOnly, "test");
    let orchestrator = Orchestrator::standalone(notifier);

    let config = PipelineConfig {
        producer_count: 4,
        consumer_count: 3,
        producer_delay_ms: 0,
        consumer_delay_ms: 0,
        items_per_producer: Some(50),
        ..fast_config()
    };
    orchestrator.start(config).await.unwrap();

    wait_until(Duration::from_secs(10), "all 200 items consumed", || {
        let consumed = total_consumed(&orchestrator);
        async move { consumed == 200 }
    })
    .await;
    orchestrator.stop().await.unwrap();

    let mut dequeued_per_producer: HashMap<String, u64> = HashMap::new();
    let mut enqueued = 0;
    while let Ok(Event::Queue(event)) = events.try_recv() {
        match event.event_type {
            QueueEventType::ItemEnqueued => enqueued += 1,
            QueueEventType::ItemDequeued => {
                *dequeued_per_producer
                    .entry(event.item.producer_id().to_string())
                    .or_default() += 1;
            }
        }
    }

    assert_eq!(enqueued, 200);
    assert_eq!(dequeued_per_producer.len(), 4);
    assert!(dequeued_per_producer.values().all(|&count| count == 50));
    assert_eq!(orchestrator.get_queue_statistics().current_size, 0);
    assert_eq!(total_consumed(&orchestrator), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_does_not_wait_for_delays() {
    let orchestrator = Orchestrator::standalone(Arc::new(NotificationManager::new()));
    let config = PipelineConfig {
        producer_count: 1,
        consumer_count: 3,
        producer_delay_ms: 60_000,
        consumer_delay_ms: 60_000,
        ..fast_config()
    };

    orchestrator.start(config).await.unwrap();
    // One consumer is processing the single item, the others block in take
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    orchestrator.stop().await.unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(500),
        "Stop took {elapsed:?} with minute-long delays"
    );
    assert!(orchestrator
        .get_consumer_statistics()
        .iter()
        .all(|stats| !stats.is_active));
}
