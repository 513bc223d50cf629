//! Internal ConcurrentQueue implementation
//!
//! A single mutex-guarded deque backs every retrieval path. Blocking takers
//! park on a [`Notify`] but always re-check the deque under the lock after
//! waking, so a wake-up without an item only costs one more loop iteration
//! and can never hand out an item twice or report one that is not there.

use crate::core::shutdown::CancellationSignal;
use crate::notifications::api::{Event, NotificationManager, QueueEvent, QueueEventType};
use crate::queue::item::Item;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tokio::sync::Notify;

/// Synchronous observer of queue changes
///
/// Callbacks run on the thread that changed the queue, after the queue lock
/// has been released. Implementations must return quickly.
pub trait QueueObserver: Send + Sync {
    fn on_enqueued(&self, item: &Item, size: usize);
    fn on_dequeued(&self, item: &Item, size: usize);
}

/// FIFO buffer shared by every producer and consumer of a pipeline
pub struct ConcurrentQueue {
    queue_id: String,
    items: Mutex<VecDeque<Item>>,
    available: Notify,
    /// Advisory size limit; 0 disables the high-water warning
    high_water_mark: AtomicUsize,
    above_high_water: AtomicBool,
    observers: RwLock<Vec<Weak<dyn QueueObserver>>>,
    notifier: Arc<NotificationManager>,
}

impl std::fmt::Debug for ConcurrentQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentQueue")
            .field("queue_id", &self.queue_id)
            .field("size", &self.size())
            .finish()
    }
}

impl ConcurrentQueue {
    pub fn new(queue_id: impl Into<String>, notifier: Arc<NotificationManager>) -> Self {
        Self {
            queue_id: queue_id.into(),
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            high_water_mark: AtomicUsize::new(0),
            above_high_water: AtomicBool::new(false),
            observers: RwLock::new(Vec::new()),
            notifier,
        }
    }

    /// Get the queue identifier
    pub fn queue_id(&self) -> &str {
        &self.queue_id
    }

    /// Set the advisory maximum size
    ///
    /// The queue never rejects or blocks an append; growing past this mark
    /// logs one warning per crossing.
    pub fn set_high_water_mark(&self, max_size: usize) {
        self.high_water_mark.store(max_size, Ordering::Relaxed);
        self.above_high_water.store(false, Ordering::Relaxed);
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water_mark.load(Ordering::Relaxed)
    }

    /// Register an observer; it is dropped from the list once its owner goes away
    pub fn register_observer(&self, observer: Weak<dyn QueueObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<Item>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert at the tail. Never blocks.
    pub fn append(&self, item: Item) {
        let size = {
            let mut items = self.lock_items();
            items.push_back(item.clone());
            items.len()
        };

        self.available.notify_one();
        self.track_high_water(size);
        self.announce(QueueEvent::enqueued(&self.queue_id, item, size));
    }

    /// Remove the head item without waiting
    pub fn try_take(&self) -> Option<Item> {
        let (item, size) = self.pop_front()?;
        self.finish_dequeue(&item, size);
        Some(item)
    }

    /// Wait for the head item
    ///
    /// Returns `None`, without touching the queue, once `cancel` is raised.
    pub async fn take(&self, cancel: &CancellationSignal) -> Option<Item> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register interest before looking at the deque so an append
            // racing with the check still wakes this waiter
            notified.as_mut().enable();

            if cancel.is_raised() {
                return None;
            }

            if let Some((item, size)) = self.pop_front() {
                if size > 0 {
                    // Pass the baton in case our wake-up absorbed another's
                    self.available.notify_one();
                }
                self.finish_dequeue(&item, size);
                return Some(item);
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Copy of up to `max_items` items from the head, oldest first
    pub fn snapshot(&self, max_items: usize) -> Vec<Item> {
        self.lock_items().iter().take(max_items).cloned().collect()
    }

    /// Current number of items held
    pub fn size(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    fn pop_front(&self) -> Option<(Item, usize)> {
        let mut items = self.lock_items();
        let item = items.pop_front()?;
        Some((item, items.len()))
    }

    fn finish_dequeue(&self, item: &Item, size: usize) {
        self.track_high_water(size);
        self.announce(QueueEvent::dequeued(&self.queue_id, item.clone(), size));
    }

    fn track_high_water(&self, size: usize) {
        let mark = self.high_water_mark();
        if mark == 0 {
            return;
        }
        if size > mark {
            if !self.above_high_water.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "Queue '{}' grew past its advisory maximum of {} items (now {})",
                    self.queue_id,
                    mark,
                    size
                );
            }
        } else if self.above_high_water.swap(false, Ordering::Relaxed) {
            log::info!(
                "Queue '{}' back within its advisory maximum ({} items)",
                self.queue_id,
                size
            );
        }
    }

    fn live_observers(&self) -> Vec<Arc<dyn QueueObserver>> {
        let (live, any_dead) = {
            let observers = self.observers.read().unwrap_or_else(PoisonError::into_inner);
            let live: Vec<_> = observers.iter().filter_map(Weak::upgrade).collect();
            let any_dead = live.len() != observers.len();
            (live, any_dead)
        };

        if any_dead {
            self.observers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|observer| observer.strong_count() > 0);
        }
        live
    }

    fn announce(&self, event: QueueEvent) {
        for observer in self.live_observers() {
            match event.event_type {
                QueueEventType::ItemEnqueued => observer.on_enqueued(&event.item, event.size),
                QueueEventType::ItemDequeued => observer.on_dequeued(&event.item, event.size),
            }
        }

        if let Err(e) = self.notifier.publish(Event::Queue(event)) {
            log::debug!("Queue '{}' notification: {}", self.queue_id, e);
        }
    }
}
