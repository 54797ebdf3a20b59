//! Wall-clock sources used to turn absolute expiration timestamps into
//! delays.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

/// Source of the current Unix time in milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

fn system_now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// The system wall clock, read on every call.
///
/// This is the default for production use. Expiration timestamps are
/// absolute wall times, so "now" has to follow the wall clock through
/// suspend/resume and clock steps rather than a monotonic source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        system_now_ms()
    }
}

/// Unix time anchored once, then advanced by `tokio::time`.
///
/// Meant for tests running on a paused runtime. Reads the system clock a
/// single time at construction and measures
/// everything after that with a tokio [`Instant`]. Under a paused test
/// runtime the clock therefore moves exactly as far as the test advances
/// time, which keeps expiration arithmetic and timer delays in lockstep.
#[derive(Debug, Clone)]
pub struct TokioClock {
    anchor_ms: i64,
    anchor: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            anchor_ms: system_now_ms(),
            anchor: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        self.anchor_ms + self.anchor.elapsed().as_millis() as i64
    }
}

/// A clock that only moves when told to. Cheap to clone; clones share
/// the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now_ms)),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by_ms: i64) {
        self.now.fetch_add(by_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        clock.advance(500);
        assert_eq!(other.now_ms(), 1_500);

        other.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn test_system_clock_tracks_system_time() {
        let before = system_now_ms();
        let now = SystemClock.now_ms();
        let after = system_now_ms();

        assert!(before <= now && now <= after);
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_ignores_paused_tokio_time() {
        let clock = SystemClock;

        tokio::time::advance(Duration::from_secs(3_600)).await;

        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default();
        assert!((clock.now_ms() - wall).abs() < 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_follows_paused_time() {
        let clock = TokioClock::new();
        let start = clock.now_ms();

        tokio::time::advance(Duration::from_millis(2_500)).await;

        assert_eq!(clock.now_ms() - start, 2_500);
    }
}
