//! Terminal breathing session.

use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use breathwise_core::{Config, SessionEvent, SessionState, SessionTimer};

use super::CliResult;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run one session in the foreground (ctrl-c stops it)
    Run {
        /// Countdown length in seconds
        #[arg(long)]
        duration: Option<u64>,
        /// Preparation length in seconds
        #[arg(long)]
        prepare: Option<u64>,
    },
    /// Print the configured session as JSON
    Show,
}

pub fn run(action: SessionAction) -> CliResult {
    let config = Config::load_or_default();
    match action {
        SessionAction::Run { duration, prepare } => {
            let mut session = config.session.clone();
            if let Some(secs) = duration {
                session.duration_secs = secs;
            }
            if let Some(secs) = prepare {
                session.prepare_secs = secs;
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_session(SessionTimer::new(&session)))
        }
        SessionAction::Show => {
            let timer = SessionTimer::new(&config.session);
            println!("{}", serde_json::to_string_pretty(&timer)?);
            Ok(())
        }
    }
}

async fn run_session(mut timer: SessionTimer) -> CliResult {
    let mut interval = tokio::time::interval(Duration::from_millis(250));
    if let Some(event) = timer.start() {
        report(&event);
    }

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for event in timer.tick() {
                    report(&event);
                    if matches!(event, SessionEvent::Completed { .. }) {
                        return Ok(());
                    }
                }
                if timer.state() == SessionState::Running {
                    print!("\r{}  {:>5}", timer.status_label(), timer.remaining_label());
                    std::io::stdout().flush()?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(event) = timer.stop() {
                    report(&event);
                }
                return Ok(());
            }
        }
    }
}

fn report(event: &SessionEvent) {
    tracing::debug!(?event, "session event");
    match event {
        SessionEvent::PreparationStarted { prepare_secs, .. } => {
            println!("Settle in. Finding your calm space... ({prepare_secs}s)");
        }
        SessionEvent::CountdownStarted { duration_secs, .. } => {
            println!("Breathe. {duration_secs}s session started.");
        }
        SessionEvent::Completed { .. } => println!("\nComplete"),
        SessionEvent::Stopped { .. } => println!("\nSession stopped"),
        SessionEvent::Reset { .. } => {}
    }
}
