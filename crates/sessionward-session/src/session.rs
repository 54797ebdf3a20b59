//! Session types: the record of who is logged in and until when.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sessionward_protocol::{Identity, RenewedToken};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Capacity of the manager's command channel. Callers wait when it
    /// is full. Clamped to at least 1.
    pub command_channel_size: usize,

    /// Show the "session expired" notice when the expiration timer forces
    /// a logout (or a login arrives with an already-expired token).
    pub notify_on_expiry: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            command_channel_size: 64,
            notify_on_expiry: true,
        }
    }
}

impl SessionConfig {
    /// Fixes out-of-range values. Called by the manager builder.
    pub fn validated(mut self) -> Self {
        if self.command_channel_size == 0 {
            tracing::warn!("command_channel_size is 0, using 1");
            self.command_channel_size = 1;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Whether the current session is the anonymous sentinel.
///
/// ```text
///   Anonymous ──(login)──→ Authenticated ──(login: renewal)──→ Authenticated
///       ↑                        │
///       └──(logout / expiry)─────┘
/// ```
///
/// A renewal in flight is not a state of its own: the session stays
/// authenticated while the activity gate is renewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Anonymous,
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "anonymous"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A session handed to [`SessionManager::login`](crate::SessionManager::login).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Who the session belongs to.
    pub identity: Identity,

    /// Opaque credential. Empty for anonymous.
    pub token: String,

    /// Absolute Unix time (ms) after which `token` is invalid.
    pub expires_at_ms: i64,

    /// Inactivity before the renewal gate is armed. `<= 0` disables
    /// inactivity renewal for this session.
    #[serde(default)]
    pub inactivity_renew_delay_ms: i64,

    /// The session is already awaiting renewal. The manager arms its
    /// timers but keeps the previous identity installed.
    #[serde(default)]
    pub needs_renew_already: bool,
}

impl Session {
    /// A session for `identity` with no inactivity renewal.
    pub fn new(identity: Identity, token: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            identity,
            token: token.into(),
            expires_at_ms,
            inactivity_renew_delay_ms: 0,
            needs_renew_already: false,
        }
    }

    /// The logged-out sentinel.
    pub fn anonymous() -> Self {
        Self::new(Identity::anonymous(), "", 0)
    }

    pub fn with_inactivity_renew_delay_ms(mut self, delay_ms: i64) -> Self {
        self.inactivity_renew_delay_ms = delay_ms;
        self
    }

    /// Flags the session as already awaiting renewal.
    pub fn needing_renewal(mut self) -> Self {
        self.needs_renew_already = true;
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.identity.is_anonymous()
    }

    pub fn state(&self) -> SessionState {
        if self.is_anonymous() {
            SessionState::Anonymous
        } else {
            SessionState::Authenticated
        }
    }

    /// Time left before expiration, or `None` if already expired at
    /// `now_ms`.
    pub fn delay_until_expiration(&self, now_ms: i64) -> Option<Duration> {
        positive_millis(self.expires_at_ms.saturating_sub(now_ms))
    }

    /// The inactivity delay, or `None` when inactivity renewal is off.
    pub fn inactivity_renew_delay(&self) -> Option<Duration> {
        positive_millis(self.inactivity_renew_delay_ms)
    }

    /// A fresh session for the same identity carrying the renewed token.
    pub fn renewed(&self, renewed: RenewedToken) -> Self {
        Self {
            identity: self.identity.clone(),
            token: renewed.token,
            expires_at_ms: renewed.expires_at_ms,
            inactivity_renew_delay_ms: renewed.inactivity_renew_delay_ms,
            needs_renew_already: false,
        }
    }
}

fn positive_millis(ms: i64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms as u64))
}

/// The token is never printed.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity.uri)
            .field("token", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .field("inactivity_renew_delay_ms", &self.inactivity_renew_delay_ms)
            .field("needs_renew_already", &self.needs_renew_already)
            .finish()
    }
}
