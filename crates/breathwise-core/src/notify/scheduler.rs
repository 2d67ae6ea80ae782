//! Reminder reconciliation.
//!
//! Brings the platform's installed daily triggers in line with the enabled
//! slots of the stored reminder list. Every pass is strictly sequential:
//!
//! ```text
//! cancel previous -> load list -> install one trigger per enabled slot -> persist ids
//! ```
//!
//! Installs happen one at a time in slot order so each returned id can be
//! paired with the slot it belongs to.

use serde::{Deserialize, Serialize};

use super::platform::{DailyTrigger, InstalledTrigger, NotificationContent, NotificationPlatform};
use crate::error::{PlatformError, Result};
use crate::reminder::{ReminderSlot, ReminderStore, TriggerRecord};
use crate::storage::{CancelStrategy, Config, KeyValueStore, NotificationsConfig, ReconcileConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// At least one enabled slot was processed.
    Scheduled,
    /// No list was ever saved, or it could not be read.
    NothingConfigured,
    /// A list exists but every slot is disabled (or it is empty).
    NothingEnabled,
    /// Enabled slots exist but none of them could be installed.
    AllFailed,
    /// Permission was refused; the platform was not touched.
    PermissionDenied,
}

/// A slot that ended the pass without a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedInstall {
    /// Position in the full reminder list.
    pub index: usize,
    pub label: String,
    pub error: String,
}

/// What one reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub outcome: ReconcileOutcome,
    /// Previously recorded triggers that were removed.
    pub canceled: usize,
    pub installed: Vec<TriggerRecord>,
    pub failed: Vec<FailedInstall>,
    /// Old triggers whose cancellation failed; kept in the record so the next
    /// pass tries again.
    pub retained: Vec<TriggerRecord>,
}

impl ReconcileReport {
    pub(crate) fn empty(outcome: ReconcileOutcome) -> Self {
        Self {
            outcome,
            canceled: 0,
            installed: Vec::new(),
            failed: Vec::new(),
            retained: Vec::new(),
        }
    }

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Reconciles stored reminders with a notification platform.
pub struct NotificationScheduler<S, P> {
    store: ReminderStore<S>,
    platform: P,
    notifications: NotificationsConfig,
    reconcile: ReconcileConfig,
}

impl<S: KeyValueStore, P: NotificationPlatform> NotificationScheduler<S, P> {
    pub fn new(store: ReminderStore<S>, platform: P, config: &Config) -> Self {
        Self {
            store,
            platform,
            notifications: config.notifications.clone(),
            reconcile: config.reconcile.clone(),
        }
    }

    pub fn store(&self) -> &ReminderStore<S> {
        &self.store
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Triggers the platform currently holds.
    pub fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError> {
        self.platform.scheduled()
    }

    /// Run one full pass.
    ///
    /// # Errors
    ///
    /// Fails when old triggers cannot be removed under
    /// [`CancelStrategy::All`], or when the id record cannot be read or
    /// written. An unreadable reminder list is not an error: nothing is
    /// scheduled.
    pub fn reconcile(&mut self) -> Result<ReconcileReport> {
        let (canceled, retained) = self.cancel_previous()?;

        let list = match self.store.load_saved() {
            Ok(Some(list)) => list,
            Ok(None) => {
                tracing::info!("no reminders to schedule");
                return Ok(ReconcileReport {
                    canceled,
                    retained,
                    ..ReconcileReport::empty(ReconcileOutcome::NothingConfigured)
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read reminders; scheduling skipped");
                return Ok(ReconcileReport {
                    canceled,
                    retained,
                    ..ReconcileReport::empty(ReconcileOutcome::NothingConfigured)
                });
            }
        };

        let enabled: Vec<(usize, &ReminderSlot)> = list.enabled().collect();
        if enabled.is_empty() {
            tracing::info!("no enabled reminders to schedule");
            return Ok(ReconcileReport {
                canceled,
                retained,
                ..ReconcileReport::empty(ReconcileOutcome::NothingEnabled)
            });
        }

        let mut installed = Vec::with_capacity(enabled.len());
        let mut failed = Vec::new();
        // Records number the enabled slots 0..n; failures keep the list position.
        for (position, (index, slot)) in enabled.into_iter().enumerate() {
            match self.install_slot(slot) {
                Ok(id) => installed.push(TriggerRecord {
                    id,
                    index: position,
                    label: slot.label.clone(),
                }),
                Err(error) => {
                    tracing::warn!(index, label = %slot.label, %error, "reminder not scheduled");
                    failed.push(FailedInstall {
                        index,
                        label: slot.label.clone(),
                        error,
                    });
                }
            }
        }

        let mut record = retained.clone();
        record.extend(installed.iter().cloned());
        if !record.is_empty() {
            if let Err(e) = self.store.save_triggers(&record) {
                tracing::error!(
                    error = %e,
                    installed = installed.len(),
                    "triggers installed but their ids were not persisted"
                );
                return Err(e.into());
            }
        }

        tracing::info!(
            installed = installed.len(),
            failed = failed.len(),
            "scheduled enabled reminders"
        );
        let outcome = if installed.is_empty() {
            ReconcileOutcome::AllFailed
        } else {
            ReconcileOutcome::Scheduled
        };
        Ok(ReconcileReport {
            outcome,
            canceled,
            installed,
            failed,
            retained,
        })
    }

    /// Remove whatever the previous pass installed.
    ///
    /// Returns the number of recorded triggers removed and the records that
    /// could not be canceled.
    fn cancel_previous(&mut self) -> Result<(usize, Vec<TriggerRecord>)> {
        match self.reconcile.cancel_strategy {
            CancelStrategy::All => {
                let previous = self.store.load_triggers().unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "unreadable trigger record; canceling everything anyway");
                    Vec::new()
                });
                self.platform.cancel_all_triggers()?;
                self.store.clear_triggers()?;
                Ok((previous.len(), Vec::new()))
            }
            CancelStrategy::Recorded => {
                let previous = self.store.load_triggers()?;
                let mut canceled = 0;
                let mut retained = Vec::new();
                for record in previous {
                    match self.platform.cancel_trigger(&record.id) {
                        Ok(()) => canceled += 1,
                        Err(e) => {
                            tracing::warn!(id = %record.id, error = %e, "could not cancel trigger");
                            retained.push(record);
                        }
                    }
                }
                if retained.is_empty() {
                    self.store.clear_triggers()?;
                } else {
                    self.store.save_triggers(&retained)?;
                }
                Ok((canceled, retained))
            }
        }
    }

    /// Install one slot, retrying per configuration. Returns the error text of
    /// the last attempt on failure.
    fn install_slot(&mut self, slot: &ReminderSlot) -> Result<String, String> {
        let time = slot.display_time().map_err(|e| e.to_string())?;
        let trigger = DailyTrigger {
            hour: time.hour(),
            minute: time.minute(),
            channel_id: Some(self.notifications.channel.id.clone()),
        };
        let content = NotificationContent {
            title: self.notifications.title.clone(),
            body: self.notifications.body_for(&slot.label),
            sound: self.notifications.sound.clone(),
        };

        let attempts = self.reconcile.install_retries.saturating_add(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.platform.install_daily_trigger(&trigger, &content) {
                Ok(id) => return Ok(id),
                Err(e) => {
                    tracing::debug!(attempt, label = %slot.label, error = %e, "install attempt failed");
                    last_error = e.to_string();
                }
            }
        }
        Err(last_error)
    }
}
