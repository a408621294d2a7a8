//! Work/break interval timer.
//!
//! [`IntervalTimer`] drives a [`TimerState`] from a tokio interval (one
//! second by default) and announces the remaining time, formatted `MM:SS`,
//! to every subscriber registered with [`IntervalTimer::on_tick`].
//!
//! Notifications are sent on every decrement, on every session switch, and
//! on reset. A tick that ends a session therefore produces two
//! notifications.

pub mod state;

pub use state::{
    DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS, Session, TickOutcome, TimerState, format_clock,
};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Default tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Errors that can occur when driving the timer.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// `start` was called outside a tokio runtime.
    #[error("interval timer requires a running tokio runtime")]
    NoRuntime,
}

type TickCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// State shared between the timer handle and its tick task.
struct Shared {
    inner: Mutex<Inner>,
    subscribers: Mutex<Vec<(u64, TickCallback)>>,
    next_subscriber: AtomicU64,
}

struct Inner {
    state: TimerState,
    /// Bumped on every start and reset; a tick task exits once its epoch is
    /// stale.
    epoch: u64,
}

impl Shared {
    /// Delivers each notification to every subscriber, in registration order.
    fn notify(&self, notifications: &[String]) {
        let callbacks: Vec<TickCallback> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for time in notifications {
            for cb in &callbacks {
                cb(time);
            }
        }
    }
}

/// Handle to a tick subscription returned by [`IntervalTimer::on_tick`].
///
/// Dropping the handle leaves the callback registered; call
/// [`unsubscribe`](Self::unsubscribe) to stop delivery.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Removes the callback. Returns `false` if it was already gone (the
    /// timer was dropped).
    pub fn unsubscribe(self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let mut subscribers = shared.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != self.id);
        subscribers.len() != before
    }

    /// Returns `true` while the callback is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.subscribers.lock().iter().any(|(id, _)| *id == self.id))
    }
}

/// Work/break countdown driven by a periodic tokio task.
///
/// Cloning is not supported; share it behind an `Arc` if several parts of
/// a host need it.
pub struct IntervalTimer {
    shared: Arc<Shared>,
    period: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::from_state(TimerState::default())
    }
}

impl IntervalTimer {
    /// Creates an idle timer with the given session lengths in seconds.
    #[must_use]
    pub fn new(work_secs: u32, break_secs: u32) -> Self {
        Self::from_state(TimerState::new(work_secs, break_secs))
    }

    /// Creates a timer starting from an explicit state. The state's running
    /// flag is cleared; call [`start`](Self::start) to begin ticking.
    #[must_use]
    pub fn from_state(state: TimerState) -> Self {
        let state = state.stopped();
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { state, epoch: 0 }),
                subscribers: Mutex::new(Vec::new()),
                next_subscriber: AtomicU64::new(0),
            }),
            period: TICK_PERIOD,
            ticker: Mutex::new(None),
        }
    }

    /// Overrides the tick period.
    #[must_use]
    pub const fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Starts the countdown. Does nothing if it is already running.
    ///
    /// The first tick happens one period after this call.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] if called outside a tokio runtime.
    pub fn start(&self) -> Result<(), TimerError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;

        let epoch = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.start() {
                return Ok(());
            }
            inner.epoch += 1;
            tracing::info!(
                session = %inner.state.session(),
                remaining = inner.state.remaining_time(),
                "interval timer started"
            );
            inner.epoch
        };

        let shared = Arc::clone(&self.shared);
        let period = self.period;
        let first_tick = tokio::time::Instant::now() + period;
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(first_tick, period);
            loop {
                interval.tick().await;
                let outcome = {
                    let mut inner = shared.inner.lock();
                    if inner.epoch != epoch || !inner.state.is_running() {
                        break;
                    }
                    inner.state.tick()
                };
                if let Some((session, remaining)) = outcome.switched {
                    tracing::info!(%session, remaining, "interval timer switched session");
                }
                shared.notify(&outcome.notifications());
            }
        });

        if let Some(previous) = self.ticker.lock().replace(task) {
            previous.abort();
        }
        Ok(())
    }

    /// Stops the countdown and rewinds to a full work session, then
    /// announces the reset time. Safe to call when idle.
    pub fn reset(&self) {
        if let Some(task) = self.ticker.lock().take() {
            task.abort();
        }
        let time = {
            let mut inner = self.shared.inner.lock();
            inner.epoch += 1;
            inner.state.reset();
            inner.state.display()
        };
        tracing::info!(remaining = %time, "interval timer reset");
        self.shared.notify(&[time]);
    }

    /// Registers a callback receiving every formatted time. Callbacks run
    /// synchronously on the tick task in registration order and should not
    /// block.
    pub fn on_tick<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.shared.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.shared
            .subscribers
            .lock()
            .push((id, Arc::new(callback)));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> TimerState {
        self.shared.inner.lock().state.clone()
    }

    /// Whether the countdown is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.inner.lock().state.is_running()
    }

    /// `true` during a work session.
    #[must_use]
    pub fn is_work_session(&self) -> bool {
        self.shared.inner.lock().state.is_work_session()
    }

    /// Seconds left in the current session.
    #[must_use]
    pub fn remaining_time(&self) -> u32 {
        self.shared.inner.lock().state.remaining_time()
    }

    /// Remaining time as `MM:SS`.
    #[must_use]
    pub fn display(&self) -> String {
        self.shared.inner.lock().state.display()
    }

    /// Number of registered tick callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.lock().len()
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        if let Some(task) = self.ticker.get_mut().take() {
            task.abort();
        }
    }
}
