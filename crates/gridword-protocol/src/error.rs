//! Error types for the protocol layer.

/// Errors that can occur while encoding commands or decoding frames.
///
/// A decode error never reaches the player: the client drops the frame and
/// logs it at debug level. The variants exist so tests and logs can tell a
/// frame that wasn't JSON apart from one that was JSON but nonsense.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a command into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON or a field of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but violates the protocol, e.g. a 3×4 grid or a
    /// join acknowledgment that doesn't name the lobby.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
