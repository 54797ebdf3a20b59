//! Integration tests for the two-slot session timer table.
//!
//! Uses `#[tokio::test(start_paused = true)]` so sleeps advance a virtual
//! clock instantly and deterministically.

use std::time::Duration;

use sessionward_timer::{SessionTimers, TimerId, TimerKind};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

type Fired = (&'static str, TimerId);

/// Schedules a timer that reports `label` on the channel when it fires.
fn schedule_labelled(
    timers: &mut SessionTimers,
    kind: TimerKind,
    delay_ms: u64,
    label: &'static str,
    tx: &mpsc::UnboundedSender<Fired>,
) -> TimerId {
    let tx = tx.clone();
    timers.schedule(kind, Duration::from_millis(delay_ms), move |id| {
        let _ = tx.send((label, id));
    })
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// =========================================================================
// Firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_schedule_fires_after_delay_not_before() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    let id = schedule_labelled(&mut timers, TimerKind::Expiration, 5_000, "exp", &tx);

    sleep_ms(4_999).await;
    assert!(rx.try_recv().is_err(), "timer must not fire early");

    sleep_ms(2).await;
    let (label, fired_id) = rx.try_recv().expect("timer should have fired");
    assert_eq!(label, "exp");
    assert_eq!(fired_id, id);
}

#[tokio::test(start_paused = true)]
async fn test_schedule_same_kind_cancels_previous() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();

    schedule_labelled(&mut timers, TimerKind::Expiration, 5_000, "a", &tx);
    let b = schedule_labelled(&mut timers, TimerKind::Expiration, 8_000, "b", &tx);

    sleep_ms(6_000).await;
    assert!(rx.try_recv().is_err(), "first timer must never fire");

    sleep_ms(2_001).await;
    assert_eq!(rx.try_recv().expect("second timer fires"), ("b", b));
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_schedule_different_kinds_are_independent() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();

    let exp = schedule_labelled(&mut timers, TimerKind::Expiration, 3_000, "exp", &tx);
    let rearm = schedule_labelled(&mut timers, TimerKind::Rearm, 1_000, "rearm", &tx);

    sleep_ms(1_001).await;
    assert_eq!(rx.try_recv().unwrap(), ("rearm", rearm));

    sleep_ms(2_000).await;
    assert_eq!(rx.try_recv().unwrap(), ("exp", exp));
}

// =========================================================================
// Cancellation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_cancel_prevents_firing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    schedule_labelled(&mut timers, TimerKind::Rearm, 1_000, "rearm", &tx);

    assert!(timers.cancel(TimerKind::Rearm));
    assert!(!timers.is_scheduled(TimerKind::Rearm));

    sleep_ms(5_000).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_empty_slot_returns_false() {
    let mut timers = SessionTimers::new();
    assert!(!timers.cancel(TimerKind::Expiration));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_clears_both_slots() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    schedule_labelled(&mut timers, TimerKind::Expiration, 1_000, "exp", &tx);
    schedule_labelled(&mut timers, TimerKind::Rearm, 1_000, "rearm", &tx);

    timers.cancel_all();

    assert!(!timers.is_scheduled(TimerKind::Expiration));
    assert!(!timers.is_scheduled(TimerKind::Rearm));
    sleep_ms(2_000).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_drop_table_cancels_pending_timers() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    {
        let mut timers = SessionTimers::new();
        schedule_labelled(&mut timers, TimerKind::Expiration, 1_000, "exp", &tx);
    }

    sleep_ms(2_000).await;
    assert!(rx.try_recv().is_err());
}

// =========================================================================
// Staleness
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_complete_current_id_clears_slot() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    schedule_labelled(&mut timers, TimerKind::Expiration, 100, "exp", &tx);

    sleep_ms(101).await;
    let (_, id) = rx.try_recv().unwrap();

    assert!(timers.complete(TimerKind::Expiration, id));
    assert!(!timers.is_scheduled(TimerKind::Expiration));
    // A second acknowledgement of the same firing is stale.
    assert!(!timers.complete(TimerKind::Expiration, id));
}

#[tokio::test(start_paused = true)]
async fn test_complete_superseded_id_is_stale() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    schedule_labelled(&mut timers, TimerKind::Rearm, 100, "old", &tx);

    // Let the first timer fire, then reschedule before its event is handled.
    sleep_ms(101).await;
    let (_, old_id) = rx.try_recv().unwrap();
    let new_id = schedule_labelled(&mut timers, TimerKind::Rearm, 100, "new", &tx);

    assert!(!timers.complete(TimerKind::Rearm, old_id));
    assert!(timers.is_current(TimerKind::Rearm, new_id));
}

#[tokio::test(start_paused = true)]
async fn test_complete_wrong_kind_is_stale() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();
    let id = schedule_labelled(&mut timers, TimerKind::Rearm, 100, "rearm", &tx);

    assert!(!timers.complete(TimerKind::Expiration, id));
    assert!(timers.is_scheduled(TimerKind::Rearm));
}

#[tokio::test(start_paused = true)]
async fn test_timer_ids_are_never_reused() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut timers = SessionTimers::new();

    let a = schedule_labelled(&mut timers, TimerKind::Expiration, 100, "a", &tx);
    let b = schedule_labelled(&mut timers, TimerKind::Rearm, 100, "b", &tx);
    let c = schedule_labelled(&mut timers, TimerKind::Expiration, 100, "c", &tx);

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
    assert_eq!(timers.current_id(TimerKind::Expiration), Some(c));
}
