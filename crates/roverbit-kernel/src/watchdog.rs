//! [`IdleWatchdog`] – command-recency monitor.
//!
//! The dispatcher calls [`IdleWatchdog::record_activity`] for every inbound
//! command.  The scheduler tick calls [`IdleWatchdog::poll`], which compares
//! the silence since the last command against the timeout and reports the
//! resulting [`Transition`].
//!
//! ```text
//!            silence > timeout
//!   Active ─────────────────────▶ Idle
//!     ▲                             │
//!     └─────────────────────────────┘
//!       command (record_activity) or silence ≤ timeout on poll
//! ```
//!
//! Times are [`Duration`]s read from a monotonic [`Clock`][roverbit_hal::Clock].

use std::time::Duration;

use tracing::{debug, info};

/// Silence allowed before idle mode engages.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(10_000);

/// The two watchdog states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle,
}

/// Result of one [`IdleWatchdog::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Commands are recent; handle them normally.
    StayActive,
    /// First tick of an idle episode.
    EnterIdle,
    /// Still idle.
    StayIdle,
    /// The silence ended without a command clearing the flag first.
    LeaveIdle,
}

impl Transition {
    /// Whether this tick should run the idle animation.
    pub fn is_idle(self) -> bool {
        matches!(self, Transition::EnterIdle | Transition::StayIdle)
    }
}

/// Tracks the last command time and the idle flag.
#[derive(Debug, Clone)]
pub struct IdleWatchdog {
    timeout: Duration,
    last_activity: Duration,
    idle_mode: bool,
}

impl IdleWatchdog {
    /// Create a watchdog that treats `started_at` as the last activity, so
    /// idle mode cannot engage before one full timeout has elapsed.
    pub fn new(timeout: Duration, started_at: Duration) -> Self {
        Self {
            timeout,
            last_activity: started_at,
            idle_mode: false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn last_activity(&self) -> Duration {
        self.last_activity
    }

    pub fn state(&self) -> ActivityState {
        if self.idle_mode {
            ActivityState::Idle
        } else {
            ActivityState::Active
        }
    }

    pub fn is_idle(&self) -> bool {
        self.idle_mode
    }

    /// Note a command received at `now`.
    ///
    /// Returns `true` when this cancelled an idle episode.
    pub fn record_activity(&mut self, now: Duration) -> bool {
        self.last_activity = now;
        let was_idle = std::mem::replace(&mut self.idle_mode, false);
        if was_idle {
            info!(at_ms = now.as_millis() as u64, "command received, leaving idle mode");
        }
        was_idle
    }

    /// Evaluate the timeout at `now` and update the idle flag.
    pub fn poll(&mut self, now: Duration) -> Transition {
        let silence = now.saturating_sub(self.last_activity);
        let timed_out = silence > self.timeout;
        match (timed_out, self.idle_mode) {
            (true, false) => {
                self.idle_mode = true;
                info!(silence_ms = silence.as_millis() as u64, "no commands, entering idle mode");
                Transition::EnterIdle
            }
            (true, true) => Transition::StayIdle,
            (false, true) => {
                self.idle_mode = false;
                debug!("timeout condition cleared, leaving idle mode");
                Transition::LeaveIdle
            }
            (false, false) => Transition::StayActive,
        }
    }
}

impl Default for IdleWatchdog {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TIMEOUT, Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn starts_active() {
        let wd = IdleWatchdog::new(ms(10_000), ms(0));
        assert_eq!(wd.state(), ActivityState::Active);
        assert_eq!(wd.last_activity(), ms(0));
    }

    #[test]
    fn cannot_go_idle_before_first_window() {
        let mut wd = IdleWatchdog::new(ms(10_000), ms(3_000));
        assert_eq!(wd.poll(ms(12_000)), Transition::StayActive);
        assert_eq!(wd.poll(ms(13_001)), Transition::EnterIdle);
    }

    #[test]
    fn timeout_boundary_is_exclusive() {
        let mut wd = IdleWatchdog::new(ms(10_000), ms(0));
        assert_eq!(wd.poll(ms(10_000)), Transition::StayActive);
        assert_eq!(wd.poll(ms(10_001)), Transition::EnterIdle);
    }

    #[test]
    fn enter_idle_is_reported_once_per_episode() {
        let mut wd = IdleWatchdog::default();
        assert_eq!(wd.poll(ms(10_001)), Transition::EnterIdle);
        assert_eq!(wd.poll(ms(10_800)), Transition::StayIdle);
        assert_eq!(wd.poll(ms(11_600)), Transition::StayIdle);
        assert!(wd.is_idle());
    }

    #[test]
    fn command_cancels_idle_and_resets_timer() {
        let mut wd = IdleWatchdog::new(ms(10_000), ms(0));
        wd.record_activity(ms(0));
        assert_eq!(wd.poll(ms(10_001)), Transition::EnterIdle);

        assert!(wd.record_activity(ms(10_500)));
        assert_eq!(wd.last_activity(), ms(10_500));
        assert!(!wd.is_idle());
        assert_eq!(wd.poll(ms(10_600)), Transition::StayActive);
    }

    #[test]
    fn command_while_active_reports_no_cancel() {
        let mut wd = IdleWatchdog::default();
        assert!(!wd.record_activity(ms(500)));
    }

    #[test]
    fn new_episode_after_second_silence() {
        let mut wd = IdleWatchdog::default();
        assert_eq!(wd.poll(ms(10_001)), Transition::EnterIdle);
        wd.record_activity(ms(15_000));
        assert_eq!(wd.poll(ms(20_000)), Transition::StayActive);
        assert_eq!(wd.poll(ms(25_001)), Transition::EnterIdle);
    }

    #[test]
    fn leave_idle_when_silence_shrinks() {
        // Activity moved forward without going through record_activity.
        let mut wd = IdleWatchdog::new(ms(100), ms(0));
        assert_eq!(wd.poll(ms(200)), Transition::EnterIdle);
        wd.last_activity = ms(150);
        assert_eq!(wd.poll(ms(200)), Transition::LeaveIdle);
        assert_eq!(wd.state(), ActivityState::Active);
    }

    #[test]
    fn transition_idle_predicate() {
        assert!(Transition::EnterIdle.is_idle());
        assert!(Transition::StayIdle.is_idle());
        assert!(!Transition::StayActive.is_idle());
        assert!(!Transition::LeaveIdle.is_idle());
    }
}
