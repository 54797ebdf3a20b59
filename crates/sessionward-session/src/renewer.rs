//! The renewal RPC hook.
//!
//! sessionward doesn't talk to an authentication server itself. It defines
//! the [`TokenRenewer`] trait: one async method that exchanges the current
//! token for a new one. You implement it with your HTTP client, gRPC stub
//! or whatever your auth service speaks; tests implement it with a fake.

use std::future::Future;

use sessionward_protocol::{Codec, RenewedToken};

use crate::SessionError;

/// Exchanges a still-valid token for a fresh one.
///
/// - `Send + Sync` → the renewer is shared with the spawned renewal task.
/// - `'static` → it lives as long as the session manager.
///
/// # Example
///
/// ```rust
/// use sessionward_protocol::{JsonCodec, RenewedToken};
/// use sessionward_session::{SessionError, TokenRenewer, decode_renewal};
///
/// /// Answers every renewal from a canned JSON body.
/// struct CannedRenewer(Vec<u8>);
///
/// impl TokenRenewer for CannedRenewer {
///     async fn renew_token(&self, _token: &str) -> Result<RenewedToken, SessionError> {
///         decode_renewal(&JsonCodec, &self.0)
///     }
/// }
/// ```
pub trait TokenRenewer: Send + Sync + 'static {
    /// Sends the renewal request for `token`.
    ///
    /// Called at most once per inactivity episode. There is no timeout at
    /// this layer: a hung request is bounded by the session's expiration
    /// timer, which logs out regardless.
    ///
    /// # Returns
    /// - `Ok(RenewedToken)`: the new token and its timings
    /// - `Err(SessionError)`: reported to the notifier and swallowed
    fn renew_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<RenewedToken, SessionError>> + Send;
}

/// Decodes and validates a renewal response body.
///
/// # Errors
/// [`SessionError::Protocol`] if the body is malformed or carries an empty
/// token.
pub fn decode_renewal<C: Codec>(codec: &C, body: &[u8]) -> Result<RenewedToken, SessionError> {
    let renewed: RenewedToken = codec.decode(body)?;
    renewed.validate()?;
    Ok(renewed)
}

#[cfg(test)]
mod tests {
    use sessionward_protocol::{JsonCodec, ProtocolError};

    use super::*;

    #[test]
    fn test_decode_renewal_valid_body() {
        let body = br#"{"token":"fresh","expiresAtMs":42,"inactivityRenewDelayMs":7}"#;

        let renewed = decode_renewal(&JsonCodec, body).expect("valid");

        assert_eq!(renewed.token, "fresh");
        assert_eq!(renewed.expires_at_ms, 42);
    }

    #[test]
    fn test_decode_renewal_empty_token_is_protocol_error() {
        let body = br#"{"token":"","expiresAtMs":42}"#;

        let result = decode_renewal(&JsonCodec, body);

        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolError::InvalidPayload(_)))
        ));
    }

    #[test]
    fn test_decode_renewal_malformed_body_is_protocol_error() {
        let result = decode_renewal(&JsonCodec, b"{");
        assert!(matches!(
            result,
            Err(SessionError::Protocol(ProtocolError::Decode(_)))
        ));
    }
}
