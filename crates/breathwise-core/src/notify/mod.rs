mod local;
mod memory;
mod platform;
mod scheduler;
mod service;

pub use local::{LocalPlatform, UpcomingTrigger};
pub use memory::MemoryPlatform;
pub use platform::{
    DailyTrigger, InstalledTrigger, NotificationContent, NotificationPlatform, PermissionGate,
};
pub use scheduler::{FailedInstall, NotificationScheduler, ReconcileOutcome, ReconcileReport};
pub use service::ReminderService;
