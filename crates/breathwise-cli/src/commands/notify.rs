use chrono::Local;
use clap::Subcommand;
use breathwise_core::{Config, Database, NotificationPlatform};

use super::{open_service, print_report, CliResult};

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Check permission and schedule saved reminders
    Init,
    /// Re-run reconciliation
    Reconcile {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show scheduled triggers with their next fire time
    Pending {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Cancel every scheduled trigger
    CancelAll,
}

pub fn run(action: NotifyAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let mut service = open_service(&db, &config);

    match action {
        NotifyAction::Init => {
            if !service.permission_granted() {
                eprintln!("Notification permissions are required for reminders to work!");
                return Ok(());
            }
            let report = service.reconcile()?;
            print_report(&report, false)?;
        }
        NotifyAction::Reconcile { json } => {
            let report = service.reconcile()?;
            print_report(&report, json)?;
        }
        NotifyAction::Pending { json } => {
            let upcoming = service
                .scheduler()
                .platform()
                .upcoming(Local::now().naive_local())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&upcoming)?);
            } else if upcoming.is_empty() {
                println!("no scheduled reminders");
            } else {
                for u in &upcoming {
                    println!(
                        "{:02}:{:02}  next {}  {}",
                        u.trigger.hour,
                        u.trigger.minute,
                        u.next_fire.format("%Y-%m-%d %H:%M"),
                        u.trigger.body
                    );
                }
            }
        }
        NotifyAction::CancelAll => {
            let scheduler = service.scheduler_mut();
            scheduler.platform_mut().cancel_all_triggers()?;
            scheduler.store().clear_triggers()?;
            println!("all reminders canceled");
        }
    }
    Ok(())
}
