use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;
use crate::storage::ChannelConfig;

/// What a notification shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: String,
}

/// A trigger that fires every day at `hour:minute` local time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrigger {
    pub hour: u8,
    pub minute: u8,
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// A trigger as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledTrigger {
    pub id: String,
    pub hour: u8,
    pub minute: u8,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Asks the user (or the OS) whether notifications may be shown.
pub trait PermissionGate {
    fn request_permission(&mut self) -> Result<bool, PlatformError>;
}

/// Installs and removes daily recurring notifications.
///
/// Identifiers returned by `install_daily_trigger` are opaque and are not
/// stable across installs of the same time.
pub trait NotificationPlatform {
    /// One-time channel setup. Platforms without channels ignore it.
    fn configure_channel(&mut self, _channel: &ChannelConfig) -> Result<(), PlatformError> {
        Ok(()) // default no-op
    }

    fn install_daily_trigger(
        &mut self,
        trigger: &DailyTrigger,
        content: &NotificationContent,
    ) -> Result<String, PlatformError>;

    fn cancel_trigger(&mut self, id: &str) -> Result<(), PlatformError>;

    /// Remove every scheduled trigger, including ones nobody remembers.
    fn cancel_all_triggers(&mut self) -> Result<(), PlatformError>;

    /// Currently scheduled triggers, for inspection.
    fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError>;
}

impl<T: NotificationPlatform + ?Sized> NotificationPlatform for &mut T {
    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), PlatformError> {
        (**self).configure_channel(channel)
    }

    fn install_daily_trigger(
        &mut self,
        trigger: &DailyTrigger,
        content: &NotificationContent,
    ) -> Result<String, PlatformError> {
        (**self).install_daily_trigger(trigger, content)
    }

    fn cancel_trigger(&mut self, id: &str) -> Result<(), PlatformError> {
        (**self).cancel_trigger(id)
    }

    fn cancel_all_triggers(&mut self) -> Result<(), PlatformError> {
        (**self).cancel_all_triggers()
    }

    fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError> {
        (**self).scheduled()
    }
}

impl<T: PermissionGate + ?Sized> PermissionGate for &mut T {
    fn request_permission(&mut self) -> Result<bool, PlatformError> {
        (**self).request_permission()
    }
}
