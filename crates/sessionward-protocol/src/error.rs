//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding protocol types.
///
/// When you see a `ProtocolError`, the problem is in the shape of the
/// data, not in the session lifecycle or the renewal transport.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `token` field, or an
    /// expiration timestamp that isn't a number.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The payload decoded fine but its content is unusable, e.g. a
    /// renewal response carrying an empty token.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
