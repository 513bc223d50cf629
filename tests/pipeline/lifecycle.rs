//! Start/stop state machine and restarts

use crate::common::{fast_config, total_consumed, total_produced, wait_until};
use prodcons::notifications::api::{Event, EventFilter, NotificationManager, SystemEventType};
use prodcons::pipeline::api::{Orchestrator, PipelineConfig, PipelineError, WorkerState};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_invalid_configuration_rejected_before_spawn() {
    let notifier = Arc::new(NotificationManager::new());
    let mut system = notifier.subscribe("system", EventFilter::SystemOnly, "test");
    let orchestrator = Orchestrator::standalone(notifier);

    for config in [
        PipelineConfig {
            consumer_count: 0,
            ..fast_config()
        },
        PipelineConfig {
            min_value: 3,
            max_value: 3,
            ..fast_config()
        },
    ] {
        let result = orchestrator.start(config).await;
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    assert!(!orchestrator.is_running());
    assert!(orchestrator.get_producer_statistics().is_empty());
    assert!(orchestrator.queue().is_empty());
    assert!(system.try_recv().is_err(), "No Started event for a rejected run");
}

#[tokio::test]
async fn test_repeated_start_and_stop_are_no_ops() {
    let orchestrator = Orchestrator::standalone(Arc::new(NotificationManager::new()));

    orchestrator.stop().await.unwrap();
    orchestrator.start(fast_config()).await.unwrap();
    orchestrator.start(fast_config()).await.unwrap();
    assert!(orchestrator.is_running());
    assert_eq!(orchestrator.get_producer_statistics().len(), 2);

    orchestrator.stop().await.unwrap();
    orchestrator.stop().await.unwrap();
    assert!(!orchestrator.is_running());
    assert!(orchestrator
        .get_producer_statistics()
        .iter()
        .all(|s| s.state == WorkerState::Stopped));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_keeps_queued_items_and_cumulative_counters() {
    let notifier = Arc::new(NotificationManager::new());
    let mut system = notifier.subscribe("system", EventFilter::SystemOnly, "test");
    let orchestrator = Orchestrator::standalone(notifier);

    // Consumers are far slower than the producer, so items pile up
    let config = PipelineConfig {
        producer_count: 1,
        consumer_count: 1,
        producer_delay_ms: 0,
        consumer_delay_ms: 60_000,
        items_per_producer: Some(5),
        ..fast_config()
    };

    orchestrator.start(config.clone()).await.unwrap();
    wait_until(Duration::from_secs(2), "first run to produce 5 items", || {
        let produced = total_produced(&orchestrator);
        async move { produced == 5 }
    })
    .await;
    orchestrator.stop().await.unwrap();

    let first_consumed = total_consumed(&orchestrator);
    let carried_over = orchestrator.queue().size();
    assert_eq!(carried_over as u64, 5 - first_consumed);

    orchestrator.start(config).await.unwrap();
    wait_until(Duration::from_secs(2), "second run to produce 5 items", || {
        let produced = total_produced(&orchestrator);
        async move { produced == 5 }
    })
    .await;
    orchestrator.stop().await.unwrap();

    // Worker statistics are per run, queue statistics are cumulative
    let queue = orchestrator.get_queue_statistics();
    assert_eq!(queue.total_enqueued, 10);
    assert_eq!(
        queue.total_enqueued,
        queue.total_dequeued + queue.current_size as u64
    );
    assert_eq!(
        carried_over as u64 + total_produced(&orchestrator),
        total_consumed(&orchestrator) + queue.current_size as u64
    );

    let mut lifecycle = Vec::new();
    while let Ok(Event::System(event)) = system.try_recv() {
        lifecycle.push(event.event_type);
    }
    assert_eq!(
        lifecycle,
        vec![
            SystemEventType::Started,
            SystemEventType::Stopped,
            SystemEventType::Started,
            SystemEventType::Stopped,
        ]
    );
}
