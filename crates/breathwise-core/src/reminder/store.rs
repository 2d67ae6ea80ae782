//! Reminder persistence.
//!
//! Two records live under fixed keys: the full slot list and the ids of the
//! triggers installed by the last reconciliation pass. Both are rewritten
//! whole on every save.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::slot::{ReminderList, TriggerRecord};
use crate::error::{Result, StorageError};
use crate::storage::KeyValueStore;

pub const REMINDERS_KEY: &str = "@breathwise_reminders";
pub const NOTIFICATION_IDS_KEY: &str = "@breathwise_notification_ids";

/// Reminder list and trigger-id records on top of a key-value store.
pub struct ReminderStore<S> {
    kv: S,
}

impl<S: KeyValueStore> ReminderStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// The persisted list, or the four defaults when nothing was saved yet.
    pub fn load(&self) -> Result<ReminderList, StorageError> {
        Ok(self.load_saved()?.unwrap_or_default())
    }

    /// Only what is persisted; `None` when no list was ever saved.
    pub fn load_saved(&self) -> Result<Option<ReminderList>, StorageError> {
        self.read(REMINDERS_KEY)
    }

    /// Replace the stored list.
    ///
    /// The list is validated and encoded before storage is touched, so a
    /// failure leaves the previous record in place.
    pub fn save(&self, list: &ReminderList) -> Result<()> {
        list.validate()?;
        self.write(REMINDERS_KEY, list)?;
        tracing::debug!(count = list.len(), "saved reminders");
        Ok(())
    }

    /// Trigger records from the last reconciliation pass (empty if none).
    pub fn load_triggers(&self) -> Result<Vec<TriggerRecord>, StorageError> {
        Ok(self.read(NOTIFICATION_IDS_KEY)?.unwrap_or_default())
    }

    pub fn save_triggers(&self, records: &[TriggerRecord]) -> Result<(), StorageError> {
        self.write(NOTIFICATION_IDS_KEY, records)
    }

    pub fn clear_triggers(&self) -> Result<(), StorageError> {
        self.kv.remove(NOTIFICATION_IDS_KEY)
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.kv.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Serialize {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialize {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.kv.set(key, &raw)
    }
}
