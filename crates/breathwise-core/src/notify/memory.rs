use std::collections::{HashMap, HashSet};

use chrono::Utc;

use super::platform::{
    DailyTrigger, InstalledTrigger, NotificationContent, NotificationPlatform, PermissionGate,
};
use crate::error::PlatformError;
use crate::storage::ChannelConfig;

/// In-process notification platform.
///
/// Identifiers are sequential (`trigger-1`, `trigger-2`, ...) and never
/// reused. Permission, install failures and cancel failures can be scripted.
#[derive(Debug)]
pub struct MemoryPlatform {
    triggers: Vec<InstalledTrigger>,
    next_id: u64,
    permission: bool,
    permission_requests: usize,
    channel: Option<ChannelConfig>,
    /// Remaining forced failures per `(hour, minute)`.
    failing_installs: HashMap<(u8, u8), u32>,
    failing_cancels: HashSet<String>,
    install_attempts: usize,
    cancel_all_calls: usize,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self {
            triggers: Vec::new(),
            next_id: 1,
            permission: true,
            permission_requests: 0,
            channel: None,
            failing_installs: HashMap::new(),
            failing_cancels: HashSet::new(),
            install_attempts: 0,
            cancel_all_calls: 0,
        }
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_permission(mut self) -> Self {
        self.permission = false;
        self
    }

    /// Fail the next `times` installs at `hour:minute`.
    pub fn fail_installs_at(&mut self, hour: u8, minute: u8, times: u32) {
        self.failing_installs.insert((hour, minute), times);
    }

    /// Refuse to cancel `id` until cleared.
    pub fn fail_cancel(&mut self, id: impl Into<String>) {
        self.failing_cancels.insert(id.into());
    }

    pub fn clear_cancel_failures(&mut self) {
        self.failing_cancels.clear();
    }

    pub fn triggers(&self) -> &[InstalledTrigger] {
        &self.triggers
    }

    /// Sorted `(hour, minute)` pairs of everything installed.
    pub fn times(&self) -> Vec<(u8, u8)> {
        let mut times: Vec<_> = self.triggers.iter().map(|t| (t.hour, t.minute)).collect();
        times.sort_unstable();
        times
    }

    pub fn channel(&self) -> Option<&ChannelConfig> {
        self.channel.as_ref()
    }

    pub fn permission_requests(&self) -> usize {
        self.permission_requests
    }

    pub fn install_attempts(&self) -> usize {
        self.install_attempts
    }

    pub fn cancel_all_calls(&self) -> usize {
        self.cancel_all_calls
    }
}

impl PermissionGate for MemoryPlatform {
    fn request_permission(&mut self) -> Result<bool, PlatformError> {
        self.permission_requests += 1;
        Ok(self.permission)
    }
}

impl NotificationPlatform for MemoryPlatform {
    fn configure_channel(&mut self, channel: &ChannelConfig) -> Result<(), PlatformError> {
        self.channel = Some(channel.clone());
        Ok(())
    }

    fn install_daily_trigger(
        &mut self,
        trigger: &DailyTrigger,
        content: &NotificationContent,
    ) -> Result<String, PlatformError> {
        self.install_attempts += 1;
        if let Some(remaining) = self.failing_installs.get_mut(&(trigger.hour, trigger.minute)) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(PlatformError::InstallFailed {
                    hour: trigger.hour,
                    minute: trigger.minute,
                    message: "scripted failure".to_string(),
                });
            }
        }

        let id = format!("trigger-{}", self.next_id);
        self.next_id += 1;
        self.triggers.push(InstalledTrigger {
            id: id.clone(),
            hour: trigger.hour,
            minute: trigger.minute,
            title: content.title.clone(),
            body: content.body.clone(),
            channel_id: trigger.channel_id.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn cancel_trigger(&mut self, id: &str) -> Result<(), PlatformError> {
        if self.failing_cancels.contains(id) {
            return Err(PlatformError::CancelFailed {
                id: id.to_string(),
                message: "scripted failure".to_string(),
            });
        }
        self.triggers.retain(|t| t.id != id);
        Ok(())
    }

    fn cancel_all_triggers(&mut self) -> Result<(), PlatformError> {
        self.cancel_all_calls += 1;
        self.triggers.clear();
        Ok(())
    }

    fn scheduled(&self) -> Result<Vec<InstalledTrigger>, PlatformError> {
        Ok(self.triggers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> NotificationContent {
        NotificationContent {
            title: "Break Free".to_string(),
            body: "body".to_string(),
            sound: "default".to_string(),
        }
    }

    fn at(hour: u8, minute: u8) -> DailyTrigger {
        DailyTrigger {
            hour,
            minute,
            channel_id: None,
        }
    }

    #[test]
    fn ids_are_never_reused() {
        let mut platform = MemoryPlatform::new();
        let a = platform.install_daily_trigger(&at(7, 0), &content()).unwrap();
        platform.cancel_all_triggers().unwrap();
        let b = platform.install_daily_trigger(&at(7, 0), &content()).unwrap();
        assert_ne!(a, b);
        assert_eq!(platform.times(), vec![(7, 0)]);
    }

    #[test]
    fn scripted_install_failures_run_out() {
        let mut platform = MemoryPlatform::new();
        platform.fail_installs_at(12, 0, 1);
        assert!(platform.install_daily_trigger(&at(12, 0), &content()).is_err());
        assert!(platform.install_daily_trigger(&at(12, 0), &content()).is_ok());
        assert_eq!(platform.install_attempts(), 2);
    }

    #[test]
    fn scripted_cancel_failure_keeps_trigger() {
        let mut platform = MemoryPlatform::new();
        let id = platform.install_daily_trigger(&at(7, 0), &content()).unwrap();
        platform.fail_cancel(id.clone());
        assert!(platform.cancel_trigger(&id).is_err());
        assert_eq!(platform.triggers().len(), 1);
        platform.clear_cancel_failures();
        platform.cancel_trigger(&id).unwrap();
        assert!(platform.triggers().is_empty());
    }
}
