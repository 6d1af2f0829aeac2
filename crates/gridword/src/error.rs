//! Unified error type for the Gridword client.

use gridword_protocol::ProtocolError;
use gridword_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GridwordError {
    /// The connection failed or went away.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A global tracing subscriber was already installed.
    #[error("failed to install log subscriber: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}
