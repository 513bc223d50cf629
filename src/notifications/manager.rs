//! NotificationManager implementation
//!
//! Fan-out of events to any number of observers. Each subscriber owns an
//! unbounded channel, so publishing only hands the event off and never waits
//! for a slow observer.

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    delivered: AtomicUsize,
}

/// Registry of event subscribers
#[derive(Default)]
pub struct NotificationManager {
    subscribers: RwLock<HashMap<String, SubscriberInfo>>,
}

impl std::fmt::Debug for NotificationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationManager")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_subscribers(&self) -> RwLockReadGuard<'_, HashMap<String, SubscriberInfo>> {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_subscribers(&self) -> RwLockWriteGuard<'_, HashMap<String, SubscriberInfo>> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a subscriber and return the receiving end of its stream
    ///
    /// Subscribing again with an existing id replaces the old subscription;
    /// the previous receiver then sees its stream end.
    pub fn subscribe(
        &self,
        subscriber_id: impl Into<String>,
        filter: EventFilter,
        source: impl Into<String>,
    ) -> UnboundedReceiver<Event> {
        let subscriber_id = subscriber_id.into();
        let source = source.into();
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            delivered: AtomicUsize::new(0),
        };

        if let Some(existing) = self
            .write_subscribers()
            .insert(subscriber_id.clone(), subscriber_info)
        {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        receiver
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.write_subscribers().remove(subscriber_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.read_subscribers().len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.read_subscribers().contains_key(subscriber_id)
    }

    /// Number of events handed to a subscriber so far
    pub fn delivered_count(&self, subscriber_id: &str) -> Option<usize> {
        self.read_subscribers()
            .get(subscriber_id)
            .map(|info| info.delivered.load(Ordering::Relaxed))
    }

    /// Hand an event to every subscriber whose filter accepts it
    ///
    /// Subscribers whose receiver has been dropped are removed and reported
    /// through [`NotificationError::PublishFailed`]; delivery to the remaining
    /// subscribers is unaffected.
    pub fn publish(&self, event: Event) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();

        {
            let subscribers = self.read_subscribers();
            for (subscriber_id, info) in subscribers.iter() {
                if !info.filter.accepts(&event) {
                    continue;
                }
                if info.sender.send(event.clone()).is_ok() {
                    info.delivered.fetch_add(1, Ordering::Relaxed);
                } else {
                    failed_subscribers.push(subscriber_id.clone());
                }
            }
        }

        if failed_subscribers.is_empty() {
            return Ok(());
        }

        {
            let mut subscribers = self.write_subscribers();
            for subscriber_id in &failed_subscribers {
                // A replacement may have been registered since the read pass
                if subscribers
                    .get(subscriber_id)
                    .is_some_and(|info| info.sender.is_closed())
                {
                    subscribers.remove(subscriber_id);
                }
            }
        }

        Err(NotificationError::PublishFailed {
            event_type: event.kind().to_string(),
            failed_subscribers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::event::{LogEvent, LogLevel, SystemEvent, SystemEventType};

    fn system_event() -> Event {
        Event::System(SystemEvent::new(SystemEventType::Started))
    }

    fn log_event(message: &str) -> Event {
        Event::Log(LogEvent::new(LogLevel::Info, message))
    }

    #[test]
    fn test_subscriber_registration_with_source() {
        let manager = NotificationManager::new();

        let _rx1 = manager.subscribe("display", EventFilter::StatisticsOnly, "app:display");
        let _rx2 = manager.subscribe("log-view", EventFilter::LogOnly, "app:log");

        assert_eq!(manager.subscriber_count(), 2);
        assert!(manager.has_subscriber("display"));
        assert!(manager.has_subscriber("log-view"));
        assert!(!manager.has_subscriber("nonexistent"));
    }

    #[tokio::test]
    async fn test_publish_respects_filters() {
        let manager = NotificationManager::new();
        let mut system_rx = manager.subscribe("system", EventFilter::SystemOnly, "test");
        let mut all_rx = manager.subscribe("all", EventFilter::All, "test");

        manager.publish(log_event("hello")).unwrap();
        manager.publish(system_event()).unwrap();

        let received = system_rx.recv().await.expect("Should receive system event");
        assert!(matches!(received, Event::System(_)));
        assert!(system_rx.try_recv().is_err());

        assert!(matches!(all_rx.recv().await, Some(Event::Log(_))));
        assert!(matches!(all_rx.recv().await, Some(Event::System(_))));

        assert_eq!(manager.delivered_count("system"), Some(1));
        assert_eq!(manager.delivered_count("all"), Some(2));
    }

    #[test]
    fn test_closed_subscribers_are_removed() {
        let manager = NotificationManager::new();
        let rx = manager.subscribe("gone", EventFilter::All, "test");
        let _kept = manager.subscribe("kept", EventFilter::All, "test");
        drop(rx);

        match manager.publish(system_event()) {
            Err(NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            }) => {
                assert_eq!(event_type, "System");
                assert_eq!(failed_subscribers, vec!["gone".to_string()]);
            }
            other => panic!("Expected PublishFailed, got {other:?}"),
        }

        assert!(!manager.has_subscriber("gone"));
        assert!(manager.has_subscriber("kept"));
        assert!(manager.publish(system_event()).is_ok());
    }

    #[tokio::test]
    async fn test_resubscribe_replaces_previous_stream() {
        let manager = NotificationManager::new();
        let mut old_rx = manager.subscribe("ui", EventFilter::All, "first");
        let mut new_rx = manager.subscribe("ui", EventFilter::All, "second");

        assert_eq!(manager.subscriber_count(), 1);
        manager.publish(log_event("after replace")).unwrap();

        assert!(old_rx.recv().await.is_none(), "Old stream should be closed");
        assert!(matches!(new_rx.recv().await, Some(Event::Log(_))));
    }

    #[test]
    fn test_unsubscribe() {
        let manager = NotificationManager::new();
        let _rx = manager.subscribe("ui", EventFilter::All, "test");

        assert!(manager.unsubscribe("ui"));
        assert!(!manager.unsubscribe("ui"));
        assert_eq!(manager.subscriber_count(), 0);
        assert!(manager.publish(system_event()).is_ok());
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let manager = NotificationManager::new();
        assert!(manager.publish(log_event("nobody listening")).is_ok());
    }
}
