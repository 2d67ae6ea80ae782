//! Process-wide entry point for reminders.
//!
//! [`ReminderService::initialize`] is called once during application
//! bootstrap. It sets up the notification channel and asks for permission;
//! the answer holds for the rest of the process.

use chrono::Utc;

use super::platform::{InstalledTrigger, NotificationPlatform, PermissionGate};
use super::scheduler::{NotificationScheduler, ReconcileOutcome, ReconcileReport};
use crate::error::{PlatformError, Result, StorageError};
use crate::events::{EventBus, ReminderEvent};
use crate::reminder::{ReminderList, ReminderStore};
use crate::storage::{Config, KeyValueStore};

pub struct ReminderService<S, P> {
    scheduler: NotificationScheduler<S, P>,
    permission_granted: bool,
    events: EventBus,
}

impl<S, P> ReminderService<S, P>
where
    S: KeyValueStore,
    P: NotificationPlatform + PermissionGate,
{
    /// Configure the channel, confirm permission and return the service.
    ///
    /// A denied (or failed) permission request is not an error: it publishes
    /// [`ReminderEvent::PermissionDenied`] and every later reconciliation is
    /// skipped.
    pub fn initialize(config: &Config, store: ReminderStore<S>, mut platform: P, events: EventBus) -> Self {
        if let Err(e) = platform.configure_channel(&config.notifications.channel) {
            tracing::warn!(error = %e, "notification channel setup failed");
        }

        let permission_granted = match platform.request_permission() {
            Ok(granted) => granted,
            Err(e) => {
                tracing::warn!(error = %e, "permission request failed");
                false
            }
        };
        if !permission_granted {
            tracing::warn!("notification permission denied; reminders will not be scheduled");
            events.publish(&ReminderEvent::PermissionDenied { at: Utc::now() });
        }

        Self {
            scheduler: NotificationScheduler::new(store, platform, config),
            permission_granted,
            events,
        }
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn scheduler(&self) -> &NotificationScheduler<S, P> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut NotificationScheduler<S, P> {
        &mut self.scheduler
    }

    /// The list to show in the editor (defaults when nothing is saved).
    pub fn load_reminders(&self) -> Result<ReminderList, StorageError> {
        self.scheduler.store().load()
    }

    pub fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError> {
        self.scheduler.scheduled()
    }

    /// Reconcile unless permission was denied at initialization.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        if !self.permission_granted {
            tracing::debug!("skipping reconciliation without permission");
            return Ok(ReconcileReport::empty(ReconcileOutcome::PermissionDenied));
        }

        let report = self.scheduler.reconcile()?;
        for failure in &report.failed {
            self.events.publish(&ReminderEvent::InstallFailed {
                index: failure.index,
                label: failure.label.clone(),
                error: failure.error.clone(),
                at: Utc::now(),
            });
        }
        self.events.publish(&ReminderEvent::Reconciled {
            installed: report.installed.len(),
            failed: report.failed.len(),
            at: Utc::now(),
        });
        Ok(report)
    }

    /// Persist the edited list, then reconcile.
    ///
    /// If saving fails nothing is sent to the platform and the previously
    /// stored list stays in effect.
    pub fn save_and_reconcile(&mut self, list: &ReminderList) -> Result<ReconcileReport> {
        if let Err(e) = self.scheduler.store().save(list) {
            tracing::error!(error = %e, "could not save reminders");
            return Err(e);
        }
        self.events.publish(&ReminderEvent::RemindersSaved {
            count: list.len(),
            at: Utc::now(),
        });
        self.reconcile()
    }

    /// Forward a foreground delivery from the platform to subscribers.
    pub fn notification_received(&self, trigger_id: &str) {
        tracing::debug!(trigger_id, "notification received");
        self.events.publish(&ReminderEvent::NotificationReceived {
            trigger_id: trigger_id.to_string(),
            at: Utc::now(),
        });
    }

    /// Forward a user tap on a notification to subscribers.
    pub fn notification_response(&self, trigger_id: &str) {
        tracing::debug!(trigger_id, "notification response");
        self.events.publish(&ReminderEvent::NotificationResponse {
            trigger_id: trigger_id.to_string(),
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryPlatform;
    use crate::storage::MemoryStore;
    use std::sync::{Arc, Mutex};

    fn recorder(events: &EventBus) -> (Arc<Mutex<Vec<ReminderEvent>>>, crate::events::Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = events.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
        (seen, sub)
    }

    #[test]
    fn initialize_asks_once_and_configures_channel() {
        let mut service = ReminderService::initialize(
            &Config::default(),
            ReminderStore::new(MemoryStore::new()),
            MemoryPlatform::new(),
            EventBus::new(),
        );
        assert!(service.permission_granted());
        service.save_and_reconcile(&ReminderList::defaults()).unwrap();
        service.reconcile().unwrap();

        let platform = service.scheduler().platform();
        assert_eq!(platform.permission_requests(), 1);
        assert_eq!(platform.channel().unwrap().name, "Breathing Reminders");
    }

    #[test]
    fn denied_permission_never_touches_platform() {
        let events = EventBus::new();
        let (seen, _sub) = recorder(&events);
        let mut service = ReminderService::initialize(
            &Config::default(),
            ReminderStore::new(MemoryStore::new()),
            MemoryPlatform::new().deny_permission(),
            events,
        );
        assert!(!service.permission_granted());

        let report = service.save_and_reconcile(&ReminderList::defaults()).unwrap();
        assert_eq!(report.outcome, ReconcileOutcome::PermissionDenied);
        let platform = service.scheduler().platform();
        assert_eq!(platform.install_attempts(), 0);
        assert_eq!(platform.cancel_all_calls(), 0);
        // the list itself is still saved
        assert!(service.scheduler().store().load_saved().unwrap().is_some());

        let seen = seen.lock().unwrap();
        assert!(matches!(seen[0], ReminderEvent::PermissionDenied { .. }));
        assert!(matches!(seen[1], ReminderEvent::RemindersSaved { count: 4, .. }));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn forwards_deliveries_and_taps() {
        let events = EventBus::new();
        let (seen, _sub) = recorder(&events);
        let service = ReminderService::initialize(
            &Config::default(),
            ReminderStore::new(MemoryStore::new()),
            MemoryPlatform::new(),
            events,
        );
        service.notification_received("trigger-1");
        service.notification_response("trigger-1");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(
            &seen[0],
            ReminderEvent::NotificationReceived { trigger_id, .. } if trigger_id == "trigger-1"
        ));
        assert!(matches!(
            &seen[1],
            ReminderEvent::NotificationResponse { trigger_id, .. } if trigger_id == "trigger-1"
        ));
    }

    #[test]
    fn save_failure_aborts_before_platform() {
        let store = ReminderStore::new(MemoryStore::new());
        store.kv().set_fail_writes(true);
        let mut service = ReminderService::initialize(
            &Config::default(),
            store,
            MemoryPlatform::new(),
            EventBus::new(),
        );
        assert!(service.save_and_reconcile(&ReminderList::defaults()).is_err());
        assert_eq!(service.scheduler().platform().cancel_all_calls(), 0);
    }

    #[test]
    fn publishes_failures_and_summary() {
        let events = EventBus::new();
        let (seen, sub) = recorder(&events);
        let mut platform = MemoryPlatform::new();
        platform.fail_installs_at(7, 0, 5);
        let mut service = ReminderService::initialize(
            &Config::default(),
            ReminderStore::new(MemoryStore::new()),
            platform,
            events,
        );
        service.save_and_reconcile(&ReminderList::defaults()).unwrap();

        {
            let seen = seen.lock().unwrap();
            assert!(seen.iter().any(|e| matches!(
                e,
                ReminderEvent::InstallFailed { index: 0, label, .. } if label == "Morning"
            )));
            assert!(matches!(
                seen.last(),
                Some(ReminderEvent::Reconciled { installed: 3, failed: 1, .. })
            ));
        }

        drop(sub);
        service.notification_received("trigger-2");
        assert!(!seen
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, ReminderEvent::NotificationReceived { .. })));
    }
}
