//! Reminder slot editing.
//!
//! Every edit saves the whole list and reconciles notifications, the same
//! as pressing save in the reminder editor.

use clap::Subcommand;
use breathwise_core::{Config, Database, DisplayTime, ReminderList, ReminderSlot};

use super::{open_service, print_report, CliResult};

#[derive(Subcommand)]
pub enum RemindersAction {
    /// List reminder slots
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change the time of a slot
    SetTime {
        /// Slot index as shown by `list`
        index: usize,
        /// Time such as "7:30 AM"
        time: String,
    },
    /// Enable or disable a slot
    Toggle {
        /// Slot index
        index: usize,
    },
    /// Rename a slot
    Rename {
        /// Slot index
        index: usize,
        /// New label
        label: String,
    },
    /// Append a slot
    Add {
        /// Label, e.g. "Afternoon"
        label: String,
        /// Time such as "3:00 PM"
        time: String,
        /// Add the slot disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a slot
    Remove {
        /// Slot index
        index: usize,
    },
    /// Restore the four default slots
    Reset,
}

pub fn run(action: RemindersAction) -> CliResult {
    let db = Database::open()?;
    let config = Config::load_or_default();
    let mut service = open_service(&db, &config);
    let mut list = service.load_reminders()?;

    match action {
        RemindersAction::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print_list(&list);
            }
            return Ok(());
        }
        RemindersAction::SetTime { index, time } => {
            let time: DisplayTime = time.parse()?;
            list.set_time(index, time)?;
        }
        RemindersAction::Toggle { index } => {
            let enabled = list.toggle(index)?;
            println!("[{index}] {}", if enabled { "enabled" } else { "disabled" });
        }
        RemindersAction::Rename { index, label } => {
            list.rename(index, label)?;
        }
        RemindersAction::Add {
            label,
            time,
            disabled,
        } => {
            let mut slot = ReminderSlot::new(label, time.parse()?);
            slot.enabled = !disabled;
            list.push(slot);
        }
        RemindersAction::Remove { index } => {
            let removed = list.remove(index)?;
            println!("removed {}", removed.label);
        }
        RemindersAction::Reset => {
            list = ReminderList::defaults();
        }
    }

    let report = service.save_and_reconcile(&list)?;
    print_list(&list);
    print_report(&report, false)
}

fn print_list(list: &ReminderList) {
    if list.is_empty() {
        println!("no reminder slots");
        return;
    }
    for (i, slot) in list.slots().iter().enumerate() {
        let state = if slot.enabled { "on" } else { "off" };
        println!("[{i}] {:<10} {:>8}  {state}", slot.label, slot.time);
    }
}
