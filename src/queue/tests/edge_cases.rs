//! Edge case tests for the queue system

#[cfg(test)]
mod tests {
    use crate::core::shutdown::CancellationSignal;
    use crate::notifications::api::NotificationManager;
    use crate::queue::api::{ConcurrentQueue, Item};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    fn shared_queue() -> Arc<ConcurrentQueue> {
        Arc::new(ConcurrentQueue::new("edge", Arc::new(NotificationManager::new())))
    }

    #[tokio::test]
    async fn test_blocked_take_wakes_on_append() {
        let queue = shared_queue();
        let cancel = CancellationSignal::new();

        let waiter = {
            let queue = queue.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { queue.take(&cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.append(Item::new(11, "Producer-1"));

        let item = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("Waiter should wake after append")
            .unwrap();
        assert_eq!(item.map(|i| i.value()), Some(11));
    }

    #[tokio::test]
    async fn test_one_append_wakes_one_waiter() {
        let queue = shared_queue();
        let cancel = CancellationSignal::new();

        let mut waiters = Vec::new();
        for _ in 0..3 {
            let queue = queue.clone();
            let cancel = cancel.clone();
            waiters.push(tokio::spawn(async move { queue.take(&cancel).await }));
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        queue.append(Item::new(1, "Producer-1"));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let finished = waiters.iter().filter(|w| w.is_finished()).count();
        assert_eq!(finished, 1, "Exactly one waiter receives the single item");

        cancel.raise();
        let mut delivered = 0;
        for waiter in waiters {
            if waiter.await.unwrap().is_some() {
                delivered += 1;
            }
        }
        assert_eq!(delivered, 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_try_take_is_immediate_on_empty_queue() {
        let queue = shared_queue();
        let result = timeout(Duration::from_millis(10), async { queue.try_take() }).await;
        assert_eq!(result.expect("try_take must not suspend"), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_snapshot_sees_consistent_prefix_during_mutation() {
        let queue = shared_queue();

        let writer = {
            let queue = queue.clone();
            tokio::spawn(async move {
                for value in 0..2_000 {
                    queue.append(Item::new(value, "Producer-1"));
                    if value % 3 == 0 {
                        queue.try_take();
                    }
                }
            })
        };

        for _ in 0..200 {
            let snapshot = queue.snapshot(20);
            assert!(snapshot.len() <= 20);
            assert!(
                snapshot.windows(2).all(|w| w[1].value() == w[0].value() + 1),
                "Snapshot must be a contiguous run of the queue"
            );
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
    }

    #[test]
    fn test_snapshot_larger_than_queue() {
        let queue = shared_queue();
        queue.append(Item::new(1, "Producer-1"));
        assert_eq!(queue.snapshot(usize::MAX).len(), 1);
    }
}
