mod slot;
mod store;
mod time;

pub use slot::{ReminderList, ReminderSlot, TriggerRecord};
pub use store::{ReminderStore, NOTIFICATION_IDS_KEY, REMINDERS_KEY};
pub use time::{format_display_time, parse_display_time, DisplayTime};
