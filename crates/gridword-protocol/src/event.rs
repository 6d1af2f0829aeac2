//! Inbound events: the single closed union every server frame decodes into.

use std::collections::BTreeMap;

use crate::{LobbySnapshot, Notice, PhaseUpdate, RoundScore};

/// A server event, independent of which frame shape carried it.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Connection acknowledged; the server may assign our nickname.
    Welcome { nickname: Option<String> },

    /// We joined a lobby.
    Joined {
        nickname: Option<String>,
        lobby: LobbySnapshot,
    },

    /// We are no longer in a lobby.
    Parted { nickname: Option<String> },

    /// The lobby changed phase, timer, grid or roster.
    ///
    /// `lobby` names the lobby when the frame says which one it is about.
    StateUpdate {
        nickname: Option<String>,
        lobby: Option<String>,
        phase: PhaseUpdate,
    },

    /// The server recorded a word we submitted.
    WordAccepted { word: String },

    /// The round ended; per-player results keyed by nickname.
    RoundResult {
        lobby: Option<String>,
        results: BTreeMap<String, RoundScore>,
    },

    /// The server rejected a request.
    Error {
        command: Option<String>,
        message: String,
    },

    /// Well-formed but unknown: a `type`/`command` we don't speak, or a
    /// lobby state we don't know.
    Unrecognized { kind: String },
}

impl Event {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::Joined { .. } => "joined",
            Self::Parted { .. } => "parted",
            Self::StateUpdate { .. } => "state_update",
            Self::WordAccepted { .. } => "word_accepted",
            Self::RoundResult { .. } => "round_result",
            Self::Error { .. } => "error",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }
}

/// A decoded frame: the event plus the optional flash message it carried.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    /// What happened.
    pub event: Event,
    /// Text to flash to the player, if the frame had any.
    pub notice: Option<Notice>,
}

impl Inbound {
    /// An inbound event without a notice.
    pub fn bare(event: Event) -> Self {
        Self {
            event,
            notice: None,
        }
    }

    /// Attaches a notice.
    pub fn with_notice(mut self, text: impl Into<String>, is_error: bool) -> Self {
        self.notice = Some(Notice {
            text: text.into(),
            is_error,
        });
        self
    }
}
