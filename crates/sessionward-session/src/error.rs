//! Error types for the session layer.

use sessionward_protocol::ProtocolError;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The renewal RPC answered with an error, or could not be reached.
    #[error("token renewal failed: {0}")]
    RenewalFailed(String),

    /// The renewal response could not be decoded or was unusable.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The session manager task has stopped (after `shutdown()`, or once
    /// every handle was dropped).
    #[error("session manager is not running")]
    Unavailable,
}
