//! Codec trait and implementations for (de)serializing protocol types.
//!
//! The renewal RPC hands back a raw response body. A [`Codec`] turns that
//! body into a [`RenewedToken`](crate::RenewedToken) (or any other protocol
//! type) without the session layer caring which format was used.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// - `Send + Sync` → one codec can be shared by every renewal task.
/// - `'static` → it owns everything it needs, so it can live inside a
///   long-running actor.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Authentication services almost always answer in JSON, so this is the
/// default. It sits behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use sessionward_protocol::{Codec, JsonCodec, RenewedToken};
///
/// let body = br#"{"token":"abc","expiresAtMs":1700000000000,"inactivityRenewDelayMs":60000}"#;
/// let renewed: RenewedToken = JsonCodec.decode(body).unwrap();
/// assert_eq!(renewed.token, "abc");
/// assert_eq!(renewed.inactivity_renew_delay_ms, 60_000);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Identity, RenewedToken};

    #[test]
    fn test_decode_renewal_body_uses_camel_case_fields() {
        let body = br#"{"token":"t-2","expiresAtMs":5000,"inactivityRenewDelayMs":0}"#;

        let renewed: RenewedToken = JsonCodec.decode(body).expect("valid body");

        assert_eq!(renewed.token, "t-2");
        assert_eq!(renewed.expires_at_ms, 5000);
        assert_eq!(renewed.inactivity_renew_delay_ms, 0);
    }

    #[test]
    fn test_decode_missing_token_returns_decode_error() {
        let body = br#"{"expiresAtMs":5000}"#;

        let result: Result<RenewedToken, _> = JsonCodec.decode(body);

        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<Identity, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_encode_identity_omits_nothing_needed_for_decode() {
        let identity = Identity::new("urn:user:ada", "ada@example.org")
            .with_credentials(["user-read"]);

        let bytes = JsonCodec.encode(&identity).expect("encodes");
        let json = String::from_utf8(bytes).expect("utf8");

        assert!(json.contains("\"uri\":\"urn:user:ada\""));
        assert!(json.contains("\"credentials\":[\"user-read\"]"));
    }
}
