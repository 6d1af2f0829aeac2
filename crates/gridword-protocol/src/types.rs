//! Core value types shared by the wire format and the session model.
//!
//! These are the *normalized* shapes: whatever variant of the protocol a
//! server speaks, by the time a frame leaves this crate its lobby state is a
//! [`LobbyState`], its grid a validated [`Grid`], and its scores
//! [`RoundScore`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// LobbyState
// ---------------------------------------------------------------------------

/// The phase a lobby is in.
///
/// The server drives the cycle; the edges it actually takes are:
///
/// ```text
///                 ┌────────────── (players left) ──────────────┐
///                 ▼                                            │
/// AwaitingPlayers ──→ BetweenGames ──→ Countdown ──→ InGame ──→ BetweenGames …
///                 └──────────────────────↗
/// ```
///
/// Any in-lobby phase can fall back to `AwaitingPlayers` when too few
/// players remain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum LobbyState {
    /// Not enough players to start.
    AwaitingPlayers,
    /// Between rounds; players may ready up.
    BetweenGames,
    /// A round is about to start.
    Countdown,
    /// A round is running; players submit words.
    InGame,
}

impl LobbyState {
    /// The wire name of this state (`"awaitingPlayers"`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPlayers => "awaitingPlayers",
            Self::BetweenGames => "betweenGames",
            Self::Countdown => "countdown",
            Self::InGame => "inGame",
        }
    }

    /// Whether players may signal readiness in this state.
    pub fn accepts_ready(self) -> bool {
        matches!(self, Self::BetweenGames)
    }

    /// Whether players may submit words in this state.
    pub fn accepts_words(self) -> bool {
        matches!(self, Self::InGame)
    }

    /// Returns `true` if the server is expected to move from `self` to
    /// `target`. Staying in the same state is always expected.
    pub fn can_transition_to(self, target: Self) -> bool {
        use LobbyState::*;
        self == target
            || matches!(
                (self, target),
                (AwaitingPlayers, BetweenGames | Countdown)
                    | (BetweenGames, Countdown | AwaitingPlayers)
                    | (Countdown, InGame | AwaitingPlayers)
                    | (InGame, BetweenGames | AwaitingPlayers)
            )
    }
}

impl FromStr for LobbyState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaitingPlayers" => Ok(Self::AwaitingPlayers),
            "betweenGames" => Ok(Self::BetweenGames),
            "countdown" => Ok(Self::Countdown),
            "inGame" => Ok(Self::InGame),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown lobby state {other:?}"
            ))),
        }
    }
}

impl fmt::Display for LobbyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// Side length of the letter grid.
pub const GRID_SIZE: usize = 4;

/// A 4×4 matrix of letter tiles.
///
/// Each tile is one or two letters; two-letter tiles are digraphs such as
/// `"Qu"`. A `Grid` can only be built from a well-formed matrix, so holders
/// never need to re-check its shape.
///
/// On the wire it is a plain array of rows: `[["G","T","S","S"], …]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Grid([[String; GRID_SIZE]; GRID_SIZE]);

impl Grid {
    /// The board shown before any lobby has sent a real one.
    pub fn placeholder() -> Self {
        let rows = [
            ["G", "T", "S", "S"],
            ["O", "U", "E", "T"],
            ["C", "X", "I", "M"],
            ["F", "E", "R", "N"],
        ];
        Self(rows.map(|row| row.map(String::from)))
    }

    /// Returns the tile at `row`, `col`, or `None` when out of range.
    pub fn tile(&self, row: usize, col: usize) -> Option<&str> {
        self.0.get(row)?.get(col).map(String::as_str)
    }

    /// Iterates over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[String; GRID_SIZE]> {
        self.0.iter()
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::placeholder()
    }
}

fn is_valid_tile(tile: &str) -> bool {
    let len = tile.chars().count();
    (1..=2).contains(&len) && tile.chars().all(char::is_alphabetic)
}

impl TryFrom<Vec<Vec<String>>> for Grid {
    type Error = ProtocolError;

    fn try_from(rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        if rows.len() != GRID_SIZE
            || rows.iter().any(|row| row.len() != GRID_SIZE)
        {
            return Err(ProtocolError::InvalidMessage(format!(
                "grid must be {GRID_SIZE}x{GRID_SIZE}"
            )));
        }
        if let Some(bad) = rows.iter().flatten().find(|t| !is_valid_tile(t)) {
            return Err(ProtocolError::InvalidMessage(format!(
                "invalid grid tile {bad:?}"
            )));
        }

        let mut cells: [[String; GRID_SIZE]; GRID_SIZE] = Default::default();
        for (dst_row, src_row) in cells.iter_mut().zip(rows) {
            for (dst, src) in dst_row.iter_mut().zip(src_row) {
                *dst = src;
            }
        }
        Ok(Self(cells))
    }
}

impl From<Grid> for Vec<Vec<String>> {
    fn from(grid: Grid) -> Self {
        grid.0.into_iter().map(Vec::from).collect()
    }
}

impl fmt::Display for Grid {
    /// One row per line, tiles separated by spaces; digraphs keep their
    /// column aligned.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<String> =
                row.iter().map(|tile| format!("{tile:<2}")).collect();
            write!(f, "{}", line.join(" ").trim_end())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// How a scored word should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordVerdict {
    /// Valid and unique; worth its points.
    Accepted,
    /// Duplicate or not a word; shown struck through.
    Invalid,
    /// Not on the board; costs a point.
    Penalty,
}

/// One word from a player's round result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredWord {
    /// The word as submitted.
    pub word: String,
    /// Points awarded: positive, zero, or `-1` for a penalty.
    pub points: i32,
}

impl ScoredWord {
    /// Classifies the word by its points.
    pub fn verdict(&self) -> WordVerdict {
        match self.points {
            p if p > 0 => WordVerdict::Accepted,
            0 => WordVerdict::Invalid,
            _ => WordVerdict::Penalty,
        }
    }
}

/// A player's result for one round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    /// Points for the round. Sent as `score` or `total`.
    #[serde(default, rename = "score", alias = "total")]
    pub total: i64,
    /// The player's words, in the order the server scored them.
    #[serde(default)]
    pub words: Vec<ScoredWord>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// A player as reported in a lobby snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerSnapshot {
    /// Cumulative score across rounds.
    pub score: u32,
    /// Readied up for the next round.
    pub ready: bool,
    /// Eligible to submit words in the running round.
    pub playing: bool,
    /// Result of the last round, once scored.
    pub result: Option<RoundScore>,
}

/// Players keyed by nickname. Iteration order is the display order.
pub type Roster = BTreeMap<String, PlayerSnapshot>;

/// The phase-related part of a lobby snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseUpdate {
    /// The lobby's phase.
    pub state: LobbyState,
    /// Seconds until the phase's timer expires, as reported by the server.
    pub seconds_remaining: Option<f64>,
    /// The round's grid. Only meaningful while `state` is `InGame`.
    pub grid: Option<Grid>,
    /// Full player roster, when the frame carries one.
    pub players: Option<Roster>,
    /// Every word the board held, scored, once a round has ended.
    pub master_solution: Option<RoundScore>,
}

/// Everything a join acknowledgment tells us about the joined lobby.
#[derive(Debug, Clone, PartialEq)]
pub struct LobbySnapshot {
    /// Lobby name, unique per server. Some servers acknowledge a join
    /// without naming the lobby; the session then uses the one it asked for.
    pub name: Option<String>,
    /// Phase, timer, grid and roster.
    pub phase: PhaseUpdate,
}

/// A human-readable message attached to a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// The text to show.
    pub text: String,
    /// Whether to style it as an error.
    pub is_error: bool,
}
