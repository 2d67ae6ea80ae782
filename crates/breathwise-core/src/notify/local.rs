//! Notification platform backed by the local SQLite database.
//!
//! Used where no OS scheduler is wired in (the CLI, desktop shells, tests).
//! Triggers are rows in the `triggers` table; firing them is left to whoever
//! polls [`LocalPlatform::upcoming`].

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::platform::{
    DailyTrigger, InstalledTrigger, NotificationContent, NotificationPlatform, PermissionGate,
};
use crate::error::PlatformError;
use crate::reminder::DisplayTime;
use crate::storage::{ChannelConfig, Database, NotificationsConfig};

/// An installed trigger with its next fire time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingTrigger {
    #[serde(flatten)]
    pub trigger: InstalledTrigger,
    pub next_fire: NaiveDateTime,
}

pub struct LocalPlatform<'a> {
    db: &'a Database,
    enabled: bool,
    channel_id: Option<String>,
}

impl<'a> LocalPlatform<'a> {
    /// Permission follows `notifications.enabled`.
    pub fn new(db: &'a Database, config: &NotificationsConfig) -> Self {
        Self {
            db,
            enabled: config.enabled,
            channel_id: None,
        }
    }

    /// Installed triggers ordered by their next fire time after `now`.
    pub fn upcoming(&self, now: NaiveDateTime) -> Result<Vec<UpcomingTrigger>, PlatformError> {
        let mut upcoming = Vec::new();
        for trigger in self.scheduled()? {
            let time = DisplayTime::new(trigger.hour as u32, trigger.minute as u32)
                .map_err(|e| PlatformError::Unavailable(e.to_string()))?;
            upcoming.push(UpcomingTrigger {
                next_fire: time.next_occurrence(now),
                trigger,
            });
        }
        upcoming.sort_by(|a, b| a.next_fire.cmp(&b.next_fire));
        Ok(upcoming)
    }
}

fn unavailable(e: impl std::fmt::Display) -> PlatformError {
    PlatformError::Unavailable(e.to_string())
}

impl PermissionGate for LocalPlatform<'_> {
    fn request_permission(&mut self) -> Result<bool, PlatformError> {
        Ok(self.enabled)
    }
}

impl NotificationPlatform for LocalPlatform<'_> {
    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), PlatformError> {
        tracing::debug!(channel = %channel.id, name = %channel.name, "configured notification channel");
        self.channel_id = Some(channel.id.clone());
        Ok(())
    }

    fn install_daily_trigger(
        &mut self,
        trigger: &DailyTrigger,
        content: &NotificationContent,
    ) -> Result<String, PlatformError> {
        if !self.enabled {
            return Err(PlatformError::PermissionDenied);
        }
        let installed = InstalledTrigger {
            id: Uuid::new_v4().to_string(),
            hour: trigger.hour,
            minute: trigger.minute,
            title: content.title.clone(),
            body: content.body.clone(),
            channel_id: trigger.channel_id.clone().or_else(|| self.channel_id.clone()),
            created_at: Utc::now(),
        };
        self.db
            .insert_trigger(&installed)
            .map_err(|e| PlatformError::InstallFailed {
                hour: trigger.hour,
                minute: trigger.minute,
                message: e.to_string(),
            })?;
        Ok(installed.id)
    }

    fn cancel_trigger(&mut self, id: &str) -> Result<(), PlatformError> {
        let removed = self
            .db
            .delete_trigger(id)
            .map_err(|e| PlatformError::CancelFailed {
                id: id.to_string(),
                message: e.to_string(),
            })?;
        if !removed {
            tracing::debug!(id, "trigger already gone");
        }
        Ok(())
    }

    fn cancel_all_triggers(&mut self) -> Result<(), PlatformError> {
        let n = self.db.delete_all_triggers().map_err(unavailable)?;
        tracing::debug!(count = n, "canceled all local triggers");
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError> {
        self.db.list_triggers().map_err(unavailable)
    }
}
