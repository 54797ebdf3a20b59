//! Activity signals and the broadcast source they travel through.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of buffered signals per listener.
pub const DEFAULT_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier keys held during a key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Returns `true` if at least one modifier is held.
    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }
}

// ---------------------------------------------------------------------------
// ActivitySignal
// ---------------------------------------------------------------------------

/// The three input streams the gate listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    PointerMove,
    Click,
    KeyPress,
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointerMove => write!(f, "pointer-move"),
            Self::Click => write!(f, "click"),
            Self::KeyPress => write!(f, "key-press"),
        }
    }
}

/// One user-input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActivitySignal {
    PointerMove,
    Click,
    KeyPress {
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl ActivitySignal {
    /// A key press with no modifier held.
    pub fn key() -> Self {
        Self::KeyPress {
            modifiers: Modifiers::NONE,
        }
    }

    /// A key press with the given modifiers held.
    pub fn key_with(modifiers: Modifiers) -> Self {
        Self::KeyPress { modifiers }
    }

    pub fn kind(&self) -> ActivityKind {
        match self {
            Self::PointerMove => ActivityKind::PointerMove,
            Self::Click => ActivityKind::Click,
            Self::KeyPress { .. } => ActivityKind::KeyPress,
        }
    }

    /// Returns `true` if this signal counts as renewed user activity.
    ///
    /// Key presses with a modifier held (alt-tab, ctrl-tab, cmd-space...)
    /// come from focus switching, not from the user working in the app.
    /// Pointer moves and clicks always count.
    pub fn is_qualifying(&self) -> bool {
        match self {
            Self::KeyPress { modifiers } => !modifiers.any(),
            Self::PointerMove | Self::Click => true,
        }
    }
}

// ---------------------------------------------------------------------------
// ActivitySource / ActivityListener
// ---------------------------------------------------------------------------

/// Broadcast hub for activity signals.
///
/// Cheap to clone: every clone publishes to the same listeners. A listener
/// registered with [`subscribe`](Self::subscribe) receives all three kinds
/// of signal; dropping it deregisters it.
#[derive(Debug, Clone)]
pub struct ActivitySource {
    sender: broadcast::Sender<ActivitySignal>,
}

impl ActivitySource {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a signal. Returns how many listeners received it; zero
    /// when nobody is listening, which is the normal idle case.
    pub fn emit(&self, signal: ActivitySignal) -> usize {
        let kind = signal.kind();
        let delivered = self.sender.send(signal).unwrap_or(0);
        trace!(%kind, delivered, "activity signal emitted");
        delivered
    }

    /// Registers a listener for pointer-move, click and key-press signals.
    pub fn subscribe(&self) -> ActivityListener {
        ActivityListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ActivitySource {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A registered listener. Dropping it deregisters it from the source.
#[derive(Debug)]
pub struct ActivityListener {
    receiver: broadcast::Receiver<ActivitySignal>,
}

impl ActivityListener {
    /// Waits for the next signal. Returns `None` once every
    /// [`ActivitySource`] clone is gone.
    ///
    /// If the listener fell behind a burst and the buffer overflowed, the
    /// dropped signals are skipped: any later signal is just as good a
    /// sign of activity.
    pub async fn recv(&mut self) -> Option<ActivitySignal> {
        loop {
            match self.receiver.recv().await {
                Ok(signal) => return Some(signal),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    trace!(skipped, "activity listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
