//! Codec trait, the JSON implementation, and the frame-level entry points.
//!
//! A [`Codec`] converts between Rust types and raw bytes. The rest of the
//! client only ever calls [`encode_command`] and [`decode_frame`], which sit
//! on top of whichever codec is plugged in, so no other crate touches the
//! wire format.

use serde::{Serialize, de::DeserializeOwned};

use crate::wire::RawFrame;
use crate::{Command, Inbound, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so the client can be moved into a spawned task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`). The game protocol is JSON,
/// so this is the codec every client uses in practice.
///
/// ```rust
/// use gridword_protocol::{Command, JsonCodec, encode_command};
///
/// let text = encode_command(&JsonCodec, &Command::Ready).unwrap();
/// assert_eq!(text, r#"{"command":"ready"}"#);
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

// ---------------------------------------------------------------------------
// Frame entry points
// ---------------------------------------------------------------------------

/// Encodes a command as the text of one outbound frame.
pub fn encode_command<C: Codec>(
    codec: &C,
    command: &Command,
) -> Result<String, ProtocolError> {
    let bytes = codec.encode(command)?;
    String::from_utf8(bytes).map_err(|e| {
        ProtocolError::InvalidMessage(format!("encoded command is not UTF-8: {e}"))
    })
}

/// Decodes the text of one inbound frame into a normalized event.
///
/// # Errors
/// - `ProtocolError::Decode` — not JSON, or a field has the wrong type
/// - `ProtocolError::InvalidMessage` — JSON, but breaks the protocol
///
/// Unknown `type`/`command` values and unknown lobby states are *not*
/// errors: they decode to [`Event::Unrecognized`](crate::Event::Unrecognized).
pub fn decode_frame<C: Codec>(codec: &C, text: &str) -> Result<Inbound, ProtocolError> {
    let raw: RawFrame = codec.decode(text.as_bytes())?;
    let inbound = raw.normalize()?;
    tracing::trace!(event = inbound.event.kind(), "decoded frame");
    Ok(inbound)
}
