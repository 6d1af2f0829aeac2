//! Outbound commands: what the client asks the server to do.

use serde::{Deserialize, Serialize};

/// A request from the client to the server.
///
/// Serializes to a single flat JSON object tagged by `command`:
///
/// ```text
/// {"command": "join", "lobbyName": "lobby1"}
/// {"command": "word", "word": "cat"}
/// {"command": "part"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Command {
    /// Join a lobby, creating it if it doesn't exist.
    Join {
        #[serde(rename = "lobbyName")]
        lobby_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        nickname: Option<String>,
    },

    /// Leave the current lobby.
    Part,

    /// Signal readiness for the next round.
    Ready,

    /// Submit a word during a round.
    Word { word: String },

    /// Submit a word, for servers that name the command `guess`.
    Guess { word: String },

    /// Ask the server to end the session.
    Quit,
}

impl Command {
    /// Shorthand for a plain join with no password or nickname.
    pub fn join(lobby_name: impl Into<String>) -> Self {
        Self::Join {
            lobby_name: lobby_name.into(),
            password: None,
            nickname: None,
        }
    }

    /// Shorthand for submitting a word.
    pub fn word(word: impl Into<String>) -> Self {
        Self::Word { word: word.into() }
    }

    /// The value of the `command` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Part => "part",
            Self::Ready => "ready",
            Self::Word { .. } => "word",
            Self::Guess { .. } => "guess",
            Self::Quit => "quit",
        }
    }
}
