//! Integration tests for the work/break interval timer.
//!
//! All tests run on a paused tokio clock and advance it one period at a
//! time, so tick counts are exact.
//!
//! Verification command: `cargo test --test interval_timer`

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use taskmate::timer::{IntervalTimer, Session, TimerState};

async fn advance_secs(secs: u64) {
    for _ in 0..secs {
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
    }
}

fn record(timer: &IntervalTimer) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    // Handle dropped on purpose; the callback stays registered.
    let _ = timer.on_tick(move |t| sink.lock().push(t.to_string()));
    seen
}

#[tokio::test(start_paused = true)]
async fn thousand_ticks_from_full_work_session() {
    let timer = IntervalTimer::new(1500, 300);
    let seen = record(&timer);
    timer.start().unwrap();

    advance_secs(1000).await;

    assert_eq!(timer.remaining_time(), 500);
    assert!(timer.is_work_session());
    assert!(timer.is_running());
    assert_eq!(seen.lock().len(), 1000);
    assert_eq!(seen.lock().last().map(String::as_str), Some("08:20"));
}

#[tokio::test(start_paused = true)]
async fn last_work_second_switches_to_break() {
    let timer = IntervalTimer::from_state(TimerState::default().with_remaining(1));
    let seen = record(&timer);
    timer.start().unwrap();

    advance_secs(1).await;

    assert!(!timer.is_work_session());
    assert_eq!(timer.remaining_time(), 300);
    assert_eq!(*seen.lock(), ["00:00", "05:00"]);
}

#[tokio::test(start_paused = true)]
async fn full_cycle_returns_to_work() {
    let timer = IntervalTimer::new(3, 2);
    let seen = record(&timer);
    timer.start().unwrap();

    advance_secs(5).await;

    assert!(timer.is_work_session());
    assert_eq!(timer.remaining_time(), 3);
    assert_eq!(
        *seen.lock(),
        ["00:02", "00:01", "00:00", "00:02", "00:01", "00:00", "00:03"]
    );
    assert_eq!(timer.snapshot().session(), Session::Work);
}

#[tokio::test(start_paused = true)]
async fn reset_mid_break_rewinds_to_work() {
    let timer = IntervalTimer::new(2, 10);
    let seen = record(&timer);
    timer.start().unwrap();
    advance_secs(4).await;
    assert!(!timer.is_work_session());

    timer.reset();

    assert!(!timer.is_running());
    assert!(timer.is_work_session());
    assert_eq!(timer.remaining_time(), 2);
    assert_eq!(seen.lock().last().map(String::as_str), Some("00:02"));

    let before = seen.lock().len();
    advance_secs(10).await;
    assert_eq!(seen.lock().len(), before);
}

#[tokio::test(start_paused = true)]
async fn restart_after_reset_ticks_again() {
    let timer = IntervalTimer::default();
    timer.start().unwrap();
    advance_secs(10).await;
    timer.reset();

    timer.start().unwrap();
    advance_secs(3).await;
    assert_eq!(timer.remaining_time(), 1497);
}

#[tokio::test(start_paused = true)]
async fn custom_period() {
    let timer = IntervalTimer::new(60, 30).with_period(Duration::from_secs(2));
    timer.start().unwrap();

    advance_secs(1).await;
    assert_eq!(timer.remaining_time(), 60);
    advance_secs(1).await;
    assert_eq!(timer.remaining_time(), 59);
}

#[tokio::test(start_paused = true)]
async fn display_is_minutes_and_seconds() {
    let timer = IntervalTimer::new(3900, 300);
    assert_eq!(timer.display(), "65:00");
    timer.start().unwrap();
    advance_secs(61).await;
    assert_eq!(timer.display(), "63:59");
}
