//! The two-slot timer table owned by a session manager.

use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// TimerKind / TimerId
// ---------------------------------------------------------------------------

/// Which of the two session delays a timer implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fires when the token expires. Forces logout.
    Expiration,
    /// Fires after the inactivity delay. Arms the activity gate.
    Rearm,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expiration => write!(f, "expiration"),
            Self::Rearm => write!(f, "rearm"),
        }
    }
}

/// Identifies one scheduling of a timer. Never reused within a
/// [`SessionTimers`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TimerHandle
// ---------------------------------------------------------------------------

/// A pending delayed action.
///
/// Dropping the handle aborts the underlying task, so a handle that leaves
/// its slot can never fire afterwards.
#[derive(Debug)]
pub struct TimerHandle {
    kind: TimerKind,
    id: TimerId,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancels the timer. Its callback will not run unless it already has.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// SessionTimers
// ---------------------------------------------------------------------------

/// One slot per [`TimerKind`], plus an id counter.
///
/// All methods take `&mut self`: the table belongs to a single owner (the
/// session actor) and is never shared.
#[derive(Debug, Default)]
pub struct SessionTimers {
    expiration: Option<TimerHandle>,
    rearm: Option<TimerHandle>,
    next_id: u64,
}

impl SessionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `on_fire` to run after `delay`, replacing any live timer
    /// of the same kind.
    ///
    /// The callback receives the new timer's id so the owner can check it
    /// with [`complete`](Self::complete) before acting.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn schedule<F>(&mut self, kind: TimerKind, delay: Duration, on_fire: F) -> TimerId
    where
        F: FnOnce(TimerId) + Send + 'static,
    {
        self.cancel(kind);

        self.next_id += 1;
        let id = TimerId(self.next_id);

        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            trace!(%kind, %id, "timer elapsed");
            on_fire(id);
        });

        debug!(
            %kind,
            %id,
            delay_ms = delay.as_millis() as u64,
            "timer scheduled"
        );

        *self.slot_mut(kind) = Some(TimerHandle { kind, id, task });
        id
    }

    /// Cancels the live timer of `kind`, if any. Returns `true` if one was
    /// cancelled.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.slot_mut(kind).take() {
            Some(handle) => {
                debug!(%kind, id = %handle.id, "timer cancelled");
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels both timers.
    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::Expiration);
        self.cancel(TimerKind::Rearm);
    }

    /// Returns `true` if `id` is the live timer of `kind`.
    pub fn is_current(&self, kind: TimerKind, id: TimerId) -> bool {
        self.current_id(kind) == Some(id)
    }

    /// Acknowledges a firing.
    ///
    /// If `id` is still the live timer of `kind`, the slot is cleared and
    /// `true` is returned: the owner should act on the firing. Otherwise the
    /// firing is stale (a later schedule or cancel superseded it) and
    /// `false` is returned.
    pub fn complete(&mut self, kind: TimerKind, id: TimerId) -> bool {
        if !self.is_current(kind, id) {
            debug!(%kind, %id, "discarding stale timer firing");
            return false;
        }
        // The task has already run its callback; dropping the handle just
        // aborts a finished task.
        self.slot_mut(kind).take();
        true
    }

    /// Returns `true` if a timer of `kind` is pending.
    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some()
    }

    /// The id of the live timer of `kind`, if any.
    pub fn current_id(&self, kind: TimerKind) -> Option<TimerId> {
        self.slot(kind).as_ref().map(TimerHandle::id)
    }

    fn slot(&self, kind: TimerKind) -> &Option<TimerHandle> {
        match kind {
            TimerKind::Expiration => &self.expiration,
            TimerKind::Rearm => &self.rearm,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<TimerHandle> {
        match kind {
            TimerKind::Expiration => &mut self.expiration,
            TimerKind::Rearm => &mut self.rearm,
        }
    }
}
