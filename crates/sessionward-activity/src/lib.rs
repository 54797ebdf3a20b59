//! User-activity detection for sessionward.
//!
//! After a session has been idle for its inactivity delay, the next sign of
//! life from the user should trigger exactly one token renewal. This crate
//! provides the two pieces that make that work:
//!
//! 1. **Signal source**: [`ActivitySource`] is a broadcast pub/sub hub.
//!    The UI layer (or a test) calls [`ActivitySource::emit`] for every
//!    pointer move, click and key press.
//! 2. **Gate**: [`ActivityGate`] subscribes while armed, filters out
//!    modifier-key chords, and fires its renewal callback on the first
//!    qualifying signal, then unsubscribes.
//!
//! ```text
//!   reset()            arm()             qualifying signal
//! ─────────→ [Idle] ──────────→ [Armed] ──────────────────→ [Renewing]
//!              ↑                                                 │
//!              └──────────────────── reset() ────────────────────┘
//! ```

mod gate;
mod signal;

pub use gate::{ActivityGate, GateState, SignalOutcome};
pub use signal::{
    ActivityKind, ActivityListener, ActivitySignal, ActivitySource, DEFAULT_CAPACITY, Modifiers,
};
