//! The bus itself.
//!
//! Delivery is two-fold: filtered handlers run synchronously on the
//! publishing thread, and every event is also pushed into a tokio broadcast
//! channel for async consumers. An optional bounded log keeps the most recent
//! events for replay reports and tests.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{EventCategory, PuzzleEvent};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0.simple())
    }
}

/// Which events a handler wants.
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    #[default]
    All,
    /// Any event whose category is listed.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &PuzzleEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Broadcast buffer per async receiver. Slow receivers lose the oldest
    /// events past this.
    pub channel_capacity: usize,
    /// Number of recent events kept in the log; `None` disables the log.
    pub log_capacity: Option<usize>,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            log_capacity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventBusError {
    /// Neither a handler nor an async receiver saw the event.
    #[error("No listeners for {0}")]
    NoListeners(EventCategory),
}

struct Subscription {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Box<dyn Fn(&PuzzleEvent) + Send + Sync>,
}

/// Publish/subscribe hub for [`PuzzleEvent`]s.
///
/// Shared as `Arc<EventBus>`; every method takes `&self`.
pub struct EventBus {
    subscriptions: RwLock<Vec<Subscription>>,
    sender: broadcast::Sender<PuzzleEvent>,
    log: Mutex<VecDeque<PuzzleEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            subscriptions: RwLock::new(Vec::new()),
            sender,
            log: Mutex::new(VecDeque::new()),
            config,
        }
    }

    /// Delivers `event` and returns how many handlers and receivers got it.
    ///
    /// Handlers run in subscription order while the subscription list is
    /// read-locked, so a handler must not subscribe or unsubscribe.
    pub fn publish(&self, event: PuzzleEvent) -> Result<usize, EventBusError> {
        self.record(&event);
        let category = event.category();

        let handled = self
            .subscriptions
            .read()
            .iter()
            .filter(|s| s.filter.matches(&event))
            .map(|s| (s.handler)(&event))
            .count();

        // send only fails when no receiver is attached
        let received = self.sender.send(event).unwrap_or(0);

        match handled + received {
            0 => Err(EventBusError::NoListeners(category)),
            n => Ok(n),
        }
    }

    /// [`publish`](Self::publish) for engine code, where having no listener
    /// is normal.
    pub fn emit(&self, event: PuzzleEvent) {
        tracing::trace!("Event: {}", event.description());
        if let Err(e) = self.publish(event) {
            tracing::trace!("{}", e);
        }
    }

    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(&PuzzleEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscriptions.write().push(Subscription {
            id,
            filter,
            handler: Box::new(handler),
        });
        tracing::debug!("Subscribed {}", id);
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    /// Async receiver seeing every event published after this call.
    pub fn receiver(&self) -> broadcast::Receiver<PuzzleEvent> {
        self.sender.subscribe()
    }

    /// Handlers plus attached async receivers.
    pub fn listener_count(&self) -> usize {
        self.subscriptions.read().len() + self.sender.receiver_count()
    }

    /// Logged events, oldest first. Empty when the log is disabled.
    pub fn event_log(&self) -> Vec<PuzzleEvent> {
        self.log.lock().iter().cloned().collect()
    }

    pub fn clear_event_log(&self) {
        self.log.lock().clear();
    }

    pub fn config(&self) -> EventBusConfig {
        self.config
    }

    fn record(&self, event: &PuzzleEvent) {
        let Some(capacity) = self.config.log_capacity else {
            return;
        };
        let mut log = self.log.lock();
        log.push_back(event.clone());
        while log.len() > capacity {
            log.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::Transform;
    use crate::model::{CropSettings, PlacementSnapshot};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn reset_event() -> PuzzleEvent {
        PuzzleEvent::PuzzleReset {
            state: PlacementSnapshot::default(),
        }
    }

    fn counter(bus: &EventBus, filter: EventFilter) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = count.clone();
        bus.subscribe(filter, move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.listener_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_filters_by_category() {
        let bus = EventBus::new();
        let crops = counter(&bus, EventFilter::Categories(vec![EventCategory::Crop]));
        let views = counter(&bus, EventFilter::Categories(vec![EventCategory::Viewport]));
        let all = counter(&bus, EventFilter::All);

        bus.emit(PuzzleEvent::CropSettingsChanged {
            crop: CropSettings::default(),
        });
        bus.emit(PuzzleEvent::ViewportChanged {
            transform: Transform::identity(),
        });
        bus.emit(PuzzleEvent::ViewportChanged {
            transform: Transform::new(2.0, 0.0, 0.0),
        });

        assert_eq!(crops.load(Ordering::SeqCst), 1);
        assert_eq!(views.load(Ordering::SeqCst), 2);
        assert_eq!(all.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_publish_counts_listeners() {
        let bus = EventBus::new();
        assert_eq!(
            bus.publish(reset_event()),
            Err(EventBusError::NoListeners(EventCategory::Lifecycle))
        );

        let _lifecycle = counter(&bus, EventFilter::Categories(vec![EventCategory::Lifecycle]));
        let _crop = counter(&bus, EventFilter::Categories(vec![EventCategory::Crop]));
        let _rx = bus.receiver();
        assert_eq!(bus.publish(reset_event()), Ok(2));
    }

    #[test]
    fn test_event_log_is_bounded() {
        let bus = EventBus::with_config(EventBusConfig {
            log_capacity: Some(3),
            ..Default::default()
        });
        for _ in 0..4 {
            bus.emit(reset_event());
        }
        bus.emit(PuzzleEvent::CropSettingsChanged {
            crop: CropSettings::default(),
        });

        let log = bus.event_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].category(), EventCategory::Crop);

        bus.clear_event_log();
        assert!(bus.event_log().is_empty());
    }

    #[test]
    fn test_log_disabled_by_default() {
        let bus = EventBus::new();
        bus.emit(reset_event());
        assert!(bus.event_log().is_empty());
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut rx = bus.receiver();

        bus.emit(PuzzleEvent::ViewportChanged {
            transform: Transform::new(1.5, 10.0, 0.0),
        });

        let event = rx.recv().await.expect("event should arrive");
        assert_eq!(event.category(), EventCategory::Viewport);
    }
}
