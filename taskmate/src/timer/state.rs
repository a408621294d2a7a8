//! Work/break countdown state machine.
//!
//! [`TimerState`] holds the transitions only. It has no clock of its own;
//! [`IntervalTimer`](super::IntervalTimer) calls [`TimerState::tick`] once
//! per period.

use std::fmt;

/// Default work session length: 25 minutes.
pub const DEFAULT_WORK_SECS: u32 = 25 * 60;

/// Default break session length: 5 minutes.
pub const DEFAULT_BREAK_SECS: u32 = 5 * 60;

/// Which interval is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// Focused work interval.
    Work,
    /// Rest interval.
    Break,
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Work => write!(f, "work"),
            Self::Break => write!(f, "break"),
        }
    }
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// Seconds left right after the decrement.
    pub countdown: u32,
    /// Set when the countdown hit zero: the new session and its full length.
    pub switched: Option<(Session, u32)>,
}

impl TickOutcome {
    /// Formatted times to announce, in order: the decrement, then the
    /// session switch if one happened.
    #[must_use]
    pub fn notifications(&self) -> Vec<String> {
        let mut out = vec![format_clock(self.countdown)];
        if let Some((_, remaining)) = self.switched {
            out.push(format_clock(remaining));
        }
        out
    }
}

/// Countdown state for alternating work and break sessions.
///
/// # Invariant
///
/// `remaining_time` stays within `0..=max(work_duration, break_duration)`,
/// and a tick that reaches zero switches sessions before returning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    work_duration: u32,
    break_duration: u32,
    is_running: bool,
    session: Session,
    remaining: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_SECS, DEFAULT_BREAK_SECS)
    }
}

impl TimerState {
    /// Idle state at the start of a work session.
    #[must_use]
    pub const fn new(work_duration: u32, break_duration: u32) -> Self {
        Self {
            work_duration,
            break_duration,
            is_running: false,
            session: Session::Work,
            remaining: work_duration,
        }
    }

    /// Overrides the seconds left in the current session, clamped to the
    /// longer of the two durations.
    #[must_use]
    pub fn with_remaining(mut self, remaining: u32) -> Self {
        self.remaining = remaining.min(self.work_duration.max(self.break_duration));
        self
    }

    /// Configured work length in seconds.
    #[must_use]
    pub const fn work_duration(&self) -> u32 {
        self.work_duration
    }

    /// Configured break length in seconds.
    #[must_use]
    pub const fn break_duration(&self) -> u32 {
        self.break_duration
    }

    /// Whether the countdown is active.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.is_running
    }

    /// Current session.
    #[must_use]
    pub const fn session(&self) -> Session {
        self.session
    }

    /// `true` during a work session.
    #[must_use]
    pub const fn is_work_session(&self) -> bool {
        matches!(self.session, Session::Work)
    }

    /// Seconds left in the current session.
    #[must_use]
    pub const fn remaining_time(&self) -> u32 {
        self.remaining
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn display(&self) -> String {
        format_clock(self.remaining)
    }

    /// Marks the countdown as running. Returns `false` if it already was.
    pub const fn start(&mut self) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        true
    }

    /// Advances one second, switching sessions when the countdown hits zero.
    pub fn tick(&mut self) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(1);
        let countdown = self.remaining;
        let switched = (self.remaining == 0).then(|| {
            self.session = match self.session {
                Session::Work => Session::Break,
                Session::Break => Session::Work,
            };
            self.remaining = self.duration_of(self.session);
            (self.session, self.remaining)
        });
        TickOutcome {
            countdown,
            switched,
        }
    }

    /// Same state with the running flag cleared.
    #[must_use]
    pub(super) const fn stopped(mut self) -> Self {
        self.is_running = false;
        self
    }

    /// Stops the countdown and rewinds to the start of a work session.
    pub const fn reset(&mut self) {
        self.is_running = false;
        self.session = Session::Work;
        self.remaining = self.work_duration;
    }

    const fn duration_of(&self, session: Session) -> u32 {
        match session {
            Session::Work => self.work_duration,
            Session::Break => self.break_duration,
        }
    }
}

/// Formats seconds as zero-padded `MM:SS`. Minutes are not capped, so
/// 3900 seconds is `65:00`.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
