//! Error types for the session layer.

/// Why an inbound event was not applied to the model.
///
/// A rejected event leaves the model exactly as it was, flash included.
/// None of these are fatal: the caller logs them and carries on.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The event names a lobby other than the one we are in.
    #[error("event for lobby {got:?} while in lobby {expected:?}")]
    ForeignLobby { expected: String, got: String },

    /// The event only makes sense inside a lobby and we are not in one.
    #[error("{0} received while not in a lobby")]
    NotInLobby(&'static str),

    /// A join was acknowledged without a lobby name, and no join is
    /// outstanding to take the name from.
    #[error("join acknowledgment names no lobby and none was requested")]
    UnnamedJoin,

    /// A word was acknowledged while no round is running.
    #[error("word {0:?} accepted outside of a running round")]
    NotInGame(String),

    /// The server sent something this client does not understand.
    #[error("unrecognized event {0:?}")]
    Unrecognized(String),
}
