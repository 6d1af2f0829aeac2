//! The session model: what the client believes the world looks like.
//!
//! Front-ends read these types; only [`Session`](crate::Session) writes
//! them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use gridword_protocol::{Grid, LobbyState, PlayerSnapshot, RoundScore};

use crate::Flash;

// ---------------------------------------------------------------------------
// ConnectionStatus
// ---------------------------------------------------------------------------

/// State of the link to the server.
///
/// ```text
///   Connecting ──(opened)──→ Open ──(lost)──→ Closed
/// ```
///
/// `Closed` is terminal; the client never reconnects on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Open,
    Closed,
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the local player is: outside any lobby, or in a lobby phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoLobby,
    InLobby(LobbyState),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoLobby => f.write_str("noLobby"),
            Self::InLobby(state) => state.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A member of the current lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub nickname: String,
    /// Cumulative score across rounds.
    pub score: u32,
    pub is_ready: bool,
    /// Eligible to submit words in the running round.
    pub is_playing: bool,
    /// Result of the most recent scored round.
    pub result: Option<RoundScore>,
}

impl Player {
    /// A player we know only by name.
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            score: 0,
            is_ready: false,
            is_playing: false,
            result: None,
        }
    }

    pub(crate) fn from_snapshot(nickname: String, snapshot: PlayerSnapshot) -> Self {
        Self {
            nickname,
            score: snapshot.score,
            is_ready: snapshot.ready,
            is_playing: snapshot.playing,
            result: snapshot.result,
        }
    }
}

// ---------------------------------------------------------------------------
// Lobby
// ---------------------------------------------------------------------------

/// The lobby the local player belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Lobby {
    /// Unique per server.
    pub name: String,
    pub state: LobbyState,
    /// Keyed by nickname; iteration order is display order.
    pub players: BTreeMap<String, Player>,
    /// When the current phase's timer runs out.
    pub deadline: Option<Instant>,
    /// The round's grid. Only present while `state` is `InGame`.
    pub grid: Option<Grid>,
    /// Every word the last board held, including the ones nobody found.
    /// Kept until the next round starts.
    pub master_solution: Option<RoundScore>,
}

impl Lobby {
    /// An empty lobby in `state`.
    pub fn new(name: impl Into<String>, state: LobbyState) -> Self {
        Self {
            name: name.into(),
            state,
            players: BTreeMap::new(),
            deadline: None,
            grid: None,
            master_solution: None,
        }
    }

    /// Time left on the phase timer at `now`.
    pub fn time_remaining(&self, now: Instant) -> Duration {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

// ---------------------------------------------------------------------------
// SessionModel
// ---------------------------------------------------------------------------

/// The single source of truth for what the client displays.
#[derive(Debug, Clone)]
pub struct SessionModel {
    /// Assigned by the server; empty until it tells us.
    pub nickname: String,
    /// Present iff we belong to a lobby.
    pub lobby: Option<Lobby>,
    /// The last grid shown. Starts as the placeholder board.
    pub grid: Grid,
    /// Words the server accepted from us this round, oldest first.
    pub submitted_words: Vec<String>,
    pub flash: Flash,
    pub connection: ConnectionStatus,
}

impl SessionModel {
    pub(crate) fn new(flash_duration: Duration) -> Self {
        Self {
            nickname: String::new(),
            lobby: None,
            grid: Grid::placeholder(),
            submitted_words: Vec::new(),
            flash: Flash::new(flash_duration),
            connection: ConnectionStatus::default(),
        }
    }

    /// The lobby phase, or `NoLobby`.
    pub fn phase(&self) -> Phase {
        match &self.lobby {
            Some(lobby) => Phase::InLobby(lobby.state),
            None => Phase::NoLobby,
        }
    }

    /// The local player's entry in the lobby roster.
    pub fn self_player(&self) -> Option<&Player> {
        self.lobby.as_ref()?.players.get(&self.nickname)
    }

    /// Whether a `ready` command makes sense right now.
    pub fn can_ready(&self) -> bool {
        self.lobby
            .as_ref()
            .is_some_and(|lobby| lobby.state.accepts_ready())
            && self.self_player().is_none_or(|player| !player.is_ready)
    }

    /// Whether words can be submitted: a round is running and we are in it.
    pub fn can_submit_words(&self) -> bool {
        self.lobby
            .as_ref()
            .is_some_and(|lobby| lobby.state.accepts_words())
            && self.self_player().is_some_and(|player| player.is_playing)
    }

    /// One line describing the current phase.
    pub fn state_description(&self) -> &'static str {
        match self.phase() {
            Phase::NoLobby => "Not in a lobby",
            Phase::InLobby(LobbyState::AwaitingPlayers) => "Waiting for more players...",
            Phase::InLobby(LobbyState::BetweenGames) => "Waiting for the next game",
            Phase::InLobby(LobbyState::Countdown) => "Game starting momentarily",
            Phase::InLobby(LobbyState::InGame) => "Game in progress",
        }
    }

    /// The grid to draw: the round's grid while one is running, otherwise
    /// the last one shown.
    pub fn displayed_grid(&self) -> &Grid {
        self.lobby
            .as_ref()
            .and_then(|lobby| lobby.grid.as_ref())
            .unwrap_or(&self.grid)
    }

    /// The status line at `now`: a visible notice, else the lobby name,
    /// else `title`.
    pub fn status_line(&self, now: Instant, title: &str) -> String {
        if let Some(notice) = self.flash.current(now) {
            return notice.text.clone();
        }
        match &self.lobby {
            Some(lobby) => format!("Lobby {}", lobby.name),
            None => title.to_owned(),
        }
    }
}
