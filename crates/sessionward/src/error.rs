//! Unified error type for sessionward.

use sessionward_protocol::ProtocolError;
use sessionward_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `sessionward` meta-crate you deal with this single error
/// type instead of importing errors from each sub-crate. `#[from]` on each
/// layer variant lets `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SessionwardError {
    /// A protocol-level error (encode, decode, invalid payload).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (renewal failure, manager stopped).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A [`StoreConfig`](crate::StoreConfig) document could not be parsed.
    #[error("invalid store configuration: {0}")]
    Config(#[source] serde_json::Error),
}
