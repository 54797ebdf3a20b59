//! The activity gate: turns "user is back" into exactly one renewal.

use std::fmt;

use tracing::{debug, info};

use crate::{ActivityListener, ActivitySignal, ActivitySource};

/// Lifecycle state of the [`ActivityGate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// Not listening.
    #[default]
    Idle,
    /// Listening for the first qualifying signal.
    Armed,
    /// A renewal was triggered; not listening, will not trigger again
    /// until [`ActivityGate::reset`] or [`ActivityGate::arm`].
    Renewing,
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Armed => write!(f, "armed"),
            Self::Renewing => write!(f, "renewing"),
        }
    }
}

/// What [`ActivityGate::handle_signal`] did with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// The gate was not armed; the signal was ignored.
    NotArmed,
    /// A modifier chord; ignored without touching the gate.
    Filtered,
    /// The renewal callback ran and the gate is now renewing.
    Fired,
}

/// Listens for user activity once armed and fires one renewal per arming.
///
/// The gate owns its listener registration: arming subscribes to the
/// [`ActivitySource`], firing or resetting drops the subscription. A burst
/// of signals queued behind the first one is discarded with it.
#[derive(Debug)]
pub struct ActivityGate {
    source: ActivitySource,
    state: GateState,
    listener: Option<ActivityListener>,
}

impl ActivityGate {
    pub fn new(source: ActivitySource) -> Self {
        Self {
            source,
            state: GateState::Idle,
            listener: None,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Returns `true` while the gate holds a listener registration.
    pub fn is_listening(&self) -> bool {
        self.listener.is_some()
    }

    /// Starts listening. Arming an already armed gate keeps the existing
    /// registration.
    pub fn arm(&mut self) {
        if self.listener.is_none() {
            self.listener = Some(self.source.subscribe());
        }
        debug!(from = %self.state, "activity gate armed");
        self.state = GateState::Armed;
    }

    /// Stops listening and returns to [`GateState::Idle`].
    pub fn reset(&mut self) {
        if self.listener.take().is_some() {
            debug!(from = %self.state, "activity listeners removed");
        }
        self.state = GateState::Idle;
    }

    /// Processes one signal.
    ///
    /// `on_renew` is invoked only when the gate is armed and the signal
    /// qualifies; the gate is then already in [`GateState::Renewing`] with
    /// its listener dropped, so the callback runs at most once per arming.
    pub fn handle_signal<F>(&mut self, signal: &ActivitySignal, on_renew: F) -> SignalOutcome
    where
        F: FnOnce(),
    {
        if self.state != GateState::Armed {
            debug!(state = %self.state, kind = %signal.kind(), "ignoring activity signal");
            return SignalOutcome::NotArmed;
        }
        if !signal.is_qualifying() {
            return SignalOutcome::Filtered;
        }

        self.listener = None;
        self.state = GateState::Renewing;
        info!(kind = %signal.kind(), "activity after inactivity, renewing token");
        on_renew();
        SignalOutcome::Fired
    }

    /// Waits for the next signal on the gate's listener.
    ///
    /// Pends forever when the gate is not listening, so it can sit in a
    /// `tokio::select!` loop next to other branches. If the source goes
    /// away the registration is dropped and the future pends as well.
    pub async fn next_signal(&mut self) -> ActivitySignal {
        if let Some(listener) = self.listener.as_mut() {
            if let Some(signal) = listener.recv().await {
                return signal;
            }
            debug!("activity source closed, dropping listener");
            self.listener = None;
        }
        std::future::pending().await
    }
}
