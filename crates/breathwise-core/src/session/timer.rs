//! Breathing session countdown.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Preparing -> Running -> Complete -> Idle
//! ```
//!
//! `stop()` returns to `Idle` from anywhere. A late `tick()` catches up on
//! every transition it skipped over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    /// Guidance audio plays while the user settles in.
    Preparing,
    Running,
    /// Countdown reached zero; returns to idle after the reset delay.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    PreparationStarted { prepare_secs: u64, at: DateTime<Utc> },
    CountdownStarted { duration_secs: u64, at: DateTime<Utc> },
    Completed { at: DateTime<Utc> },
    /// Automatic return to idle after completion.
    Reset { at: DateTime<Utc> },
    /// The user abandoned the session.
    Stopped { at: DateTime<Utc> },
}

/// Countdown for one breathing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    duration_ms: u64,
    prepare_ms: u64,
    reset_delay_ms: u64,
    state: SessionState,
    /// Time left in the current phase (preparation, countdown or reset delay).
    phase_remaining_ms: u64,
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl SessionTimer {
    pub fn new(config: &SessionConfig) -> Self {
        let duration_ms = config.duration_secs.saturating_mul(1000);
        Self {
            duration_ms,
            prepare_ms: config.prepare_secs.saturating_mul(1000),
            reset_delay_ms: config.reset_delay_secs.saturating_mul(1000),
            state: SessionState::Idle,
            phase_remaining_ms: duration_ms,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Countdown time left. Full duration before the countdown starts.
    pub fn remaining_ms(&self) -> u64 {
        match self.state {
            SessionState::Idle | SessionState::Preparing => self.duration_ms,
            SessionState::Running => self.phase_remaining_ms,
            SessionState::Complete => 0,
        }
    }

    /// Whole seconds left, rounded up so the display starts at the full
    /// duration.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms().div_ceil(1000)
    }

    /// `M:SS`.
    pub fn remaining_label(&self) -> String {
        let secs = self.remaining_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    /// 0.0 .. 1.0 through the countdown.
    pub fn progress(&self) -> f64 {
        match self.state {
            SessionState::Running if self.duration_ms > 0 => {
                1.0 - (self.phase_remaining_ms as f64 / self.duration_ms as f64)
            }
            SessionState::Complete => 1.0,
            _ => 0.0,
        }
    }

    pub fn status_label(&self) -> &'static str {
        match self.state {
            SessionState::Idle => "Tap to Start",
            SessionState::Preparing => "Preparing your session",
            SessionState::Running => "Meditating",
            SessionState::Complete => "Complete",
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<SessionEvent> {
        self.start_at(now_ms())
    }

    /// Begin preparation. Ignored unless idle.
    pub fn start_at(&mut self, now_ms: u64) -> Option<SessionEvent> {
        if self.state != SessionState::Idle {
            return None;
        }
        self.state = SessionState::Preparing;
        self.phase_remaining_ms = self.prepare_ms;
        self.last_tick_epoch_ms = Some(now_ms);
        Some(SessionEvent::PreparationStarted {
            prepare_secs: self.prepare_ms / 1000,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<SessionEvent> {
        if self.state == SessionState::Idle {
            return None;
        }
        self.reset();
        Some(SessionEvent::Stopped { at: Utc::now() })
    }

    pub fn tick(&mut self) -> Vec<SessionEvent> {
        self.tick_at(now_ms())
    }

    /// Advance by the wall-clock time since the previous tick.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let Some(last) = self.last_tick_epoch_ms else {
            return events;
        };
        let mut elapsed = now_ms.saturating_sub(last);
        self.last_tick_epoch_ms = Some(now_ms);

        while self.state != SessionState::Idle {
            if elapsed < self.phase_remaining_ms {
                self.phase_remaining_ms -= elapsed;
                break;
            }
            elapsed -= self.phase_remaining_ms;
            events.push(self.finish_phase());
        }
        events
    }

    fn finish_phase(&mut self) -> SessionEvent {
        match self.state {
            SessionState::Preparing => {
                self.state = SessionState::Running;
                self.phase_remaining_ms = self.duration_ms;
                SessionEvent::CountdownStarted {
                    duration_secs: self.duration_ms / 1000,
                    at: Utc::now(),
                }
            }
            SessionState::Running => {
                self.state = SessionState::Complete;
                self.phase_remaining_ms = self.reset_delay_ms;
                SessionEvent::Completed { at: Utc::now() }
            }
            SessionState::Complete | SessionState::Idle => {
                self.reset();
                SessionEvent::Reset { at: Utc::now() }
            }
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.phase_remaining_ms = self.duration_ms;
        self.last_tick_epoch_ms = None;
    }
}

fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> SessionTimer {
        SessionTimer::new(&SessionConfig::default())
    }

    #[test]
    fn idle_shows_full_duration() {
        let t = timer();
        assert_eq!(t.state(), SessionState::Idle);
        assert_eq!(t.remaining_label(), "2:00");
        assert_eq!(t.progress(), 0.0);
        assert_eq!(t.status_label(), "Tap to Start");
    }

    #[test]
    fn preparation_then_countdown() {
        let mut t = timer();
        assert!(matches!(
            t.start_at(0),
            Some(SessionEvent::PreparationStarted { prepare_secs: 30, .. })
        ));
        // second start while preparing is ignored
        assert!(t.start_at(10).is_none());

        assert!(t.tick_at(29_000).is_empty());
        assert_eq!(t.state(), SessionState::Preparing);
        assert_eq!(t.remaining_label(), "2:00");

        let events = t.tick_at(30_000);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::CountdownStarted { duration_secs: 120, .. }]
        ));
        assert_eq!(t.state(), SessionState::Running);

        t.tick_at(31_000);
        assert_eq!(t.remaining_label(), "1:59");
        t.tick_at(31_500);
        assert_eq!(t.remaining_label(), "1:59");
        t.tick_at(90_000);
        assert_eq!(t.remaining_label(), "1:00");
        assert!((t.progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn completes_and_resets_after_delay() {
        let mut t = timer();
        t.start_at(0);
        t.tick_at(30_000);

        let events = t.tick_at(150_000);
        assert!(matches!(events.as_slice(), [SessionEvent::Completed { .. }]));
        assert_eq!(t.state(), SessionState::Complete);
        assert_eq!(t.remaining_label(), "0:00");
        assert_eq!(t.progress(), 1.0);

        let events = t.tick_at(152_000);
        assert!(matches!(events.as_slice(), [SessionEvent::Reset { .. }]));
        assert_eq!(t.state(), SessionState::Idle);
        assert_eq!(t.remaining_label(), "2:00");
    }

    #[test]
    fn late_tick_catches_up_on_every_phase() {
        let mut t = timer();
        t.start_at(1_000);
        let events = t.tick_at(1_000 + 10 * 60_000);
        assert_eq!(events.len(), 3);
        assert_eq!(t.state(), SessionState::Idle);
    }

    #[test]
    fn stop_returns_to_idle() {
        let mut t = timer();
        assert!(t.stop().is_none());
        t.start_at(0);
        t.tick_at(45_000);
        assert!(matches!(t.stop(), Some(SessionEvent::Stopped { .. })));
        assert_eq!(t.state(), SessionState::Idle);
        assert!(t.tick_at(200_000).is_empty());
        assert_eq!(t.remaining_ms(), 120_000);
    }

    #[test]
    fn zero_preparation_starts_immediately() {
        let config = SessionConfig {
            duration_secs: 5,
            prepare_secs: 0,
            reset_delay_secs: 2,
        };
        let mut t = SessionTimer::new(&config);
        t.start_at(0);
        let events = t.tick_at(0);
        assert!(matches!(events.as_slice(), [SessionEvent::CountdownStarted { .. }]));
        assert_eq!(t.remaining_label(), "0:05");
    }
}
