//! Cancellable session timers for sessionward.
//!
//! A session owns at most two pending delays at any time:
//!
//! - an **expiration** delay that forces logout when the token dies, and
//! - a **rearm** delay that arms the activity gate after a stretch of
//!   inactivity.
//!
//! [`SessionTimers`] keeps one slot per [`TimerKind`]. Scheduling into an
//! occupied slot cancels the previous timer first, so two live timers of
//! the same kind can never coexist.
//!
//! # Staleness
//!
//! A timer task may fire just before it is cancelled, leaving its event in
//! the owner's queue. Every firing therefore carries its [`TimerId`], and
//! the owner calls [`SessionTimers::complete`] which only succeeds for the
//! id currently in the slot:
//!
//! ```ignore
//! SessionEvent::TimerFired { kind, id } => {
//!     if !self.timers.complete(kind, id) {
//!         return; // superseded by a later login/logout
//!     }
//!     // act on the firing
//! }
//! ```
//!
//! # Time
//!
//! Delays run on `tokio::time`, so tests can use
//! `#[tokio::test(start_paused = true)]` and advance time by hand. The
//! [`Clock`] trait supplies "now" for converting absolute expiration
//! timestamps into delays. [`SystemClock`] reads the wall clock and is the
//! production default; [`TokioClock`] follows paused tokio time for tests.

mod clock;
mod timers;

pub use clock::{Clock, ManualClock, SystemClock, TokioClock};
pub use timers::{SessionTimers, TimerHandle, TimerId, TimerKind};
