//! Reminder lifecycle events and listener subscriptions.
//!
//! Listeners are registered with [`EventBus::subscribe`] and stay registered
//! exactly as long as the returned [`Subscription`] lives. Dropping the handle
//! (or calling [`Subscription::unsubscribe`]) removes the listener.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every user-visible change in the reminder pipeline produces an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReminderEvent {
    /// Permission was refused at initialization; the UI shows its alert.
    PermissionDenied { at: DateTime<Utc> },
    RemindersSaved { count: usize, at: DateTime<Utc> },
    Reconciled {
        installed: usize,
        failed: usize,
        at: DateTime<Utc>,
    },
    InstallFailed {
        index: usize,
        label: String,
        error: String,
        at: DateTime<Utc>,
    },
    /// A notification was delivered while the app was in the foreground.
    NotificationReceived { trigger_id: String, at: DateTime<Utc> },
    /// The user tapped a notification.
    NotificationResponse { trigger_id: String, at: DateTime<Utc> },
}

type Listener = Arc<dyn Fn(&ReminderEvent) + Send + Sync>;
type Listeners = Mutex<Vec<(u64, Listener)>>;

/// Fan-out of [`ReminderEvent`]s to registered listeners.
///
/// Cloning yields another handle to the same set of listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Listeners>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` until the returned handle is dropped.
    #[must_use = "the listener is removed when the subscription is dropped"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ReminderEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    /// Deliver `event` to every current listener, in subscription order.
    ///
    /// Listeners run outside the lock and may subscribe or unsubscribe.
    pub fn publish(&self, event: &ReminderEvent) {
        let snapshot: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Handle for a registered listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            if let Ok(mut listeners) = listeners.lock() {
                listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn saved(count: usize) -> ReminderEvent {
        ReminderEvent::RemindersSaved {
            count,
            at: Utc::now(),
        }
    }

    #[test]
    fn delivers_to_live_subscriptions_only() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&saved(4));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        assert_eq!(bus.listener_count(), 0);
        bus.publish(&saved(4));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_handle_unsubscribes() {
        let bus = EventBus::new();
        {
            let _sub = bus.subscribe(|_| {});
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn handle_outliving_bus_is_harmless() {
        let sub = {
            let bus = EventBus::new();
            bus.subscribe(|_| {})
        };
        drop(sub);
    }

    #[test]
    fn listeners_can_subscribe_during_publish() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        let held = Arc::new(Mutex::new(Vec::new()));
        let held_inner = Arc::clone(&held);
        let _sub = bus.subscribe(move |_| {
            let s = inner_bus.subscribe(|_| {});
            held_inner.lock().unwrap().push(s);
        });
        bus.publish(&saved(1));
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(saved(3)).unwrap();
        assert_eq!(json["type"], "RemindersSaved");
        assert_eq!(json["count"], 3);
    }
}
