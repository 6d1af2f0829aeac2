//! Raw frame shapes and their normalization into [`Inbound`] events.
//!
//! Two server dialects exist:
//!
//! - **typed** frames, tagged by `type`:
//!   `{"type":"state","nickname":"bob","lobby":{…},"message":"…"}`,
//!   `{"type":"word","word":"cat"}`, `{"type":"error","message":"…"}`
//! - **command** frames, tagged by `command` with an `ok` flag:
//!   `{"ok":true,"command":"join","message":"…","metadata":{…}}`
//!
//! Both are deserialized into the permissive [`RawFrame`] and then mapped
//! onto the closed [`Event`] union exactly once, here. Nothing downstream
//! looks at raw field presence.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    Event, Grid, Inbound, LobbySnapshot, LobbyState, Notice, PhaseUpdate,
    PlayerSnapshot, ProtocolError, Roster, RoundScore, ScoredWord,
};

/// Any frame either dialect can send. Every field is optional; which ones
/// matter depends on `type` / `command`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawFrame {
    #[serde(rename = "type")]
    kind: Option<String>,
    command: Option<String>,
    ok: Option<bool>,
    message: Option<String>,
    nickname: Option<String>,
    lobby: Option<WireLobby>,
    word: Option<String>,
    players: Option<WirePlayers>,
    metadata: Option<WireLobby>,
}

/// A lobby object, or a command frame's `metadata` (which carries the same
/// fields, sometimes nested one level down under `lobby`).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLobby {
    #[serde(alias = "lobbyName")]
    name: Option<String>,
    state: Option<String>,
    #[serde(alias = "remainingSeconds")]
    seconds_remaining: Option<f64>,
    grid: Option<Vec<Vec<String>>>,
    players: Option<WirePlayers>,
    nickname: Option<String>,
    word: Option<String>,
    master_solution: Option<RoundScore>,
    lobby: Option<Box<WireLobby>>,
}

/// Either a bare list of nicknames (join acknowledgments) or a map of
/// nickname to player details.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePlayers {
    Names(Vec<String>),
    Detailed(BTreeMap<String, WirePlayer>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WirePlayer {
    score: i64,
    #[serde(alias = "ready", alias = "isReady")]
    readied: bool,
    #[serde(alias = "isPlaying")]
    playing: bool,
    result: Option<RoundScore>,
    // Result frames list the round's words directly on the player.
    words: Option<Vec<ScoredWord>>,
    total: Option<i64>,
}

impl WirePlayer {
    fn into_snapshot(self) -> PlayerSnapshot {
        PlayerSnapshot {
            score: u32::try_from(self.score.max(0)).unwrap_or(u32::MAX),
            ready: self.readied,
            playing: self.playing,
            result: self.result,
        }
    }

    fn into_round_score(self) -> RoundScore {
        match self.result {
            Some(result) => result,
            None => RoundScore {
                total: self.total.unwrap_or(self.score),
                words: self.words.unwrap_or_default(),
            },
        }
    }
}

/// A parsed value, or the name of the lobby state that stopped us.
enum Parsed<T> {
    Known(T),
    UnknownState(String),
}

impl RawFrame {
    /// Maps the frame onto the event union.
    pub(crate) fn normalize(self) -> Result<Inbound, ProtocolError> {
        match (self.kind.clone(), self.command.clone()) {
            (Some(kind), _) => typed_frame(&kind, self),
            (None, Some(command)) => command_frame(command, self),
            (None, None) => Ok(Inbound::bare(Event::Unrecognized {
                kind: String::new(),
            })),
        }
    }
}

fn typed_frame(kind: &str, frame: RawFrame) -> Result<Inbound, ProtocolError> {
    let notice = notice(frame.message.clone(), kind == "error");

    let event = match kind {
        "state" => match frame.lobby {
            None => Event::Parted {
                nickname: frame.nickname,
            },
            Some(lobby) => state_update(frame.nickname, lobby)?,
        },
        "word" => Event::WordAccepted {
            word: require(frame.word, "word frame without a word")?,
        },
        "error" => Event::Error {
            command: frame.command,
            message: frame.message.unwrap_or_default(),
        },
        "result" => Event::RoundResult {
            lobby: frame.lobby.and_then(|lobby| lobby.name),
            results: results(frame.players)?,
        },
        other => Event::Unrecognized {
            kind: other.to_owned(),
        },
    };

    Ok(Inbound { event, notice })
}

fn command_frame(
    command: String,
    frame: RawFrame,
) -> Result<Inbound, ProtocolError> {
    let ok = frame.ok.ok_or_else(|| {
        ProtocolError::InvalidMessage(format!(
            "{command} response without an ok flag"
        ))
    })?;
    let notice = notice(frame.message.clone(), !ok);

    if !ok {
        let message = frame
            .message
            .unwrap_or_else(|| format!("{command} failed"));
        return Ok(Inbound {
            event: Event::Error {
                command: Some(command),
                message,
            },
            notice,
        });
    }

    let mut meta = frame.metadata.unwrap_or_default();
    let nickname = meta.nickname.take().or(frame.nickname);
    let word = meta.word.take().or(frame.word);

    let event = match command.as_str() {
        "connect" => Event::Welcome { nickname },
        "join" => {
            let mut lobby = unnest(meta);
            // The plain join response lists the players beside `command`.
            if lobby.players.is_none() {
                lobby.players = frame.players;
            }
            let name = lobby.name.clone().filter(|name| !name.is_empty());
            match phase_update(lobby, Some(LobbyState::AwaitingPlayers))? {
                Parsed::Known(phase) => Event::Joined {
                    nickname,
                    lobby: LobbySnapshot { name, phase },
                },
                Parsed::UnknownState(kind) => Event::Unrecognized { kind },
            }
        }
        "part" | "quit" => Event::Parted { nickname },
        "state" => state_update(nickname, unnest(meta))?,
        "word" | "guess" => Event::WordAccepted {
            word: require(word, "word acknowledgment without a word")?,
        },
        "result" => {
            let players = meta.players.take().or(frame.players);
            Event::RoundResult {
                lobby: meta.name,
                results: results(players)?,
            }
        }
        other => Event::Unrecognized {
            kind: other.to_owned(),
        },
    };

    Ok(Inbound { event, notice })
}

fn notice(message: Option<String>, is_error: bool) -> Option<Notice> {
    message
        .filter(|text| !text.is_empty())
        .map(|text| Notice { text, is_error })
}

fn require(value: Option<String>, what: &str) -> Result<String, ProtocolError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProtocolError::InvalidMessage(what.into()))
}

/// Metadata sometimes wraps the lobby as `{"lobby": {…}}`.
fn unnest(mut meta: WireLobby) -> WireLobby {
    match meta.lobby.take() {
        Some(inner) => *inner,
        None => meta,
    }
}

fn state_update(
    nickname: Option<String>,
    lobby: WireLobby,
) -> Result<Event, ProtocolError> {
    let name = lobby.name.clone();
    Ok(match phase_update(lobby, None)? {
        Parsed::Known(phase) => Event::StateUpdate {
            nickname,
            lobby: name,
            phase,
        },
        Parsed::UnknownState(kind) => Event::Unrecognized { kind },
    })
}

fn phase_update(
    lobby: WireLobby,
    fallback: Option<LobbyState>,
) -> Result<Parsed<PhaseUpdate>, ProtocolError> {
    let state = match (lobby.state, fallback) {
        (Some(raw), _) => match raw.parse::<LobbyState>() {
            Ok(state) => state,
            Err(_) => return Ok(Parsed::UnknownState(format!("state:{raw}"))),
        },
        (None, Some(state)) => state,
        (None, None) => {
            return Err(ProtocolError::InvalidMessage(
                "lobby without a state".into(),
            ));
        }
    };

    Ok(Parsed::Known(PhaseUpdate {
        state,
        seconds_remaining: lobby.seconds_remaining,
        grid: grid(lobby.grid)?,
        players: lobby.players.map(roster),
        master_solution: lobby.master_solution,
    }))
}

/// Servers send an all-blank grid outside of rounds; that means "no grid".
fn grid(rows: Option<Vec<Vec<String>>>) -> Result<Option<Grid>, ProtocolError> {
    match rows {
        None => Ok(None),
        Some(rows) if rows.iter().flatten().all(|tile| tile.is_empty()) => {
            Ok(None)
        }
        Some(rows) => Grid::try_from(rows).map(Some),
    }
}

fn roster(players: WirePlayers) -> Roster {
    match players {
        WirePlayers::Names(names) => names
            .into_iter()
            .map(|name| (name, PlayerSnapshot::default()))
            .collect(),
        WirePlayers::Detailed(players) => players
            .into_iter()
            .map(|(name, player)| (name, player.into_snapshot()))
            .collect(),
    }
}

fn results(
    players: Option<WirePlayers>,
) -> Result<BTreeMap<String, RoundScore>, ProtocolError> {
    match players {
        Some(WirePlayers::Detailed(players)) => Ok(players
            .into_iter()
            .map(|(name, player)| (name, player.into_round_score()))
            .collect()),
        _ => Err(ProtocolError::InvalidMessage(
            "round result without per-player scores".into(),
        )),
    }
}
