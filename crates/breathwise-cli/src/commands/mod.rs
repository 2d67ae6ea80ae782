pub mod config;
pub mod notify;
pub mod reminders;
pub mod session;

use breathwise_core::{
    Config, Database, EventBus, LocalPlatform, ReconcileOutcome, ReconcileReport, ReminderService,
    ReminderStore,
};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type LocalService<'a> = ReminderService<&'a Database, LocalPlatform<'a>>;

/// Bootstrap the reminder service against the local database.
pub fn open_service<'a>(db: &'a Database, config: &Config) -> LocalService<'a> {
    ReminderService::initialize(
        config,
        ReminderStore::new(db),
        LocalPlatform::new(db, &config.notifications),
        EventBus::new(),
    )
}

pub fn print_report(report: &ReconcileReport, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match report.outcome {
        ReconcileOutcome::PermissionDenied => {
            eprintln!("Notification permissions are required for reminders to work!");
        }
        ReconcileOutcome::NothingConfigured => println!("no reminders to schedule"),
        ReconcileOutcome::NothingEnabled => println!("no enabled reminders to schedule"),
        ReconcileOutcome::AllFailed => {
            eprintln!("no reminders could be scheduled");
        }
        ReconcileOutcome::Scheduled => {
            println!("scheduled {} reminder(s)", report.installed.len());
            for record in &report.installed {
                println!("  {} -> {}", record.label, record.id);
            }
        }
    }
    for failure in &report.failed {
        eprintln!("  failed [{}] {}: {}", failure.index, failure.label, failure.error);
    }
    if !report.retained.is_empty() {
        eprintln!(
            "  {} old trigger(s) could not be canceled and will be retried",
            report.retained.len()
        );
    }
    Ok(())
}
