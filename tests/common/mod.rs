//! Shared helpers for the integration tests

use prodcons::pipeline::api::{Orchestrator, PipelineConfig};
use std::future::Future;
use std::time::Duration;

/// Configuration with short delays and a fast statistics tick
pub fn fast_config() -> PipelineConfig {
    PipelineConfig {
        producer_count: 2,
        consumer_count: 2,
        producer_delay_ms: 1,
        consumer_delay_ms: 1,
        tick_interval_ms: 20,
        ..Default::default()
    }
}

/// Poll `condition` until it holds, failing the test after `limit`
pub async fn wait_until<F, Fut>(limit: Duration, what: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let result = tokio::time::timeout(limit, async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(result.is_ok(), "Timed out waiting for {what}");
}

pub fn total_produced(orchestrator: &Orchestrator) -> u64 {
    orchestrator
        .get_producer_statistics()
        .iter()
        .map(|s| s.total_produced)
        .sum()
}

pub fn total_consumed(orchestrator: &Orchestrator) -> u64 {
    orchestrator
        .get_consumer_statistics()
        .iter()
        .map(|s| s.total_consumed)
        .sum()
}
