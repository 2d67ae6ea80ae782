//! # Breathwise Core Library
//!
//! Core logic for the Breathwise short-break breathing timer. Every GUI shell
//! and the standalone CLI binary sit on top of this crate.
//!
//! ## Architecture
//!
//! - **Reminders**: slot model, 12-hour display time parsing, and the
//!   whole-list reminder store under fixed keys
//! - **Notifications**: the reconciliation pass that cancels old daily
//!   triggers and installs one per enabled slot, behind a platform trait
//! - **Storage**: key-value persistence (SQLite or in-memory) and TOML
//!   configuration
//! - **Session**: wall-clock countdown for one breathing session
//!
//! ## Key Components
//!
//! - [`ReminderService`]: initialization, permission gate and save-then-reconcile
//! - [`NotificationScheduler`]: the reconciliation pass itself
//! - [`ReminderStore`]: reminder list and trigger-id records
//! - [`Config`]: application configuration management
//! - [`SessionTimer`]: breathing countdown state machine

pub mod error;
pub mod events;
pub mod notify;
pub mod reminder;
pub mod session;
pub mod storage;

pub use error::{ConfigError, CoreError, PlatformError, StorageError, TimeParseError, ValidationError};
pub use events::{EventBus, ReminderEvent, Subscription};
pub use notify::{
    LocalPlatform, MemoryPlatform, NotificationPlatform, NotificationScheduler, PermissionGate,
    ReconcileOutcome, ReconcileReport, ReminderService,
};
pub use reminder::{DisplayTime, ReminderList, ReminderSlot, ReminderStore, TriggerRecord};
pub use session::{SessionEvent, SessionState, SessionTimer};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
