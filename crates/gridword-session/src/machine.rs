//! The lobby state machine.
//!
//! [`Session::apply`] is the only way server events reach the model. Every
//! event is checked against the current model first and only then applied,
//! so a rejected event changes nothing, not even the flash notice.
//!
//! ```text
//!                 Joined / full StateUpdate
//!   NoLobby ───────────────────────────────────→ InLobby(state)
//!      ▲                                            │
//!      └──────── Parted / connection lost ──────────┘
//! ```
//!
//! Inside a lobby the server drives the phase; see
//! [`LobbyState`](gridword_protocol::LobbyState) for the expected edges.

use std::collections::BTreeMap;
use std::time::Instant;

use gridword_protocol::{
    Event, Inbound, LobbyState, Notice, PhaseUpdate, RoundScore,
};

use crate::countdown::{deadline_after, format_time_remaining};
use crate::{ConnectionStatus, Lobby, Phase, Player, SessionConfig, SessionError, SessionModel};

/// Text flashed when the server goes away.
const CONNECTION_LOST: &str = "Disconnected from the server";

/// The phase before and after an applied event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

impl Transition {
    /// Whether the event moved us to a different phase.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// The session: configuration plus the model it maintains.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    model: SessionModel,
    /// The lobby named by the last join we sent, until it is acknowledged.
    pending_join: Option<String>,
}

impl Session {
    /// Creates a session outside any lobby, waiting for the connection.
    pub fn new(config: SessionConfig) -> Self {
        let model = SessionModel::new(config.flash_duration);
        Self {
            config,
            model,
            pending_join: None,
        }
    }

    /// The current model.
    pub fn model(&self) -> &SessionModel {
        &self.model
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Time left on the lobby's phase timer as `M:SS`.
    pub fn time_remaining_label(&self, now: Instant) -> String {
        let deadline = self.model.lobby.as_ref().and_then(|lobby| lobby.deadline);
        format_time_remaining(deadline, now)
    }

    /// The status line at `now`.
    pub fn status_line(&self, now: Instant) -> String {
        self.model.status_line(now, &self.config.title)
    }

    /// Shows a notice that did not come from the server.
    pub fn flash_local(&mut self, text: impl Into<String>, is_error: bool, now: Instant) {
        let notice = Notice {
            text: text.into(),
            is_error,
        };
        self.model.flash.show(notice, now);
    }

    /// Records that a join for `lobby` went out, so an acknowledgment that
    /// doesn't name the lobby can still be placed.
    pub fn join_requested(&mut self, lobby: impl Into<String>) {
        self.pending_join = Some(lobby.into());
    }

    /// Records that the connection is up.
    pub fn connection_opened(&mut self) {
        self.model.connection = ConnectionStatus::Open;
        tracing::debug!("connection open");
    }

    /// Records that the connection is gone for good: leaves the lobby and
    /// flashes an error.
    pub fn connection_lost(&mut self, now: Instant) -> Transition {
        let from = self.model.phase();
        self.model.connection = ConnectionStatus::Closed;
        self.pending_join = None;
        self.leave_lobby();
        self.flash_local(CONNECTION_LOST, true, now);
        tracing::warn!(%from, "connection lost");
        Transition {
            from,
            to: self.model.phase(),
        }
    }

    /// Applies one decoded server frame.
    ///
    /// # Errors
    /// Returns a [`SessionError`] and leaves the model untouched when the
    /// event is unrecognized, names a lobby we are not in, or makes no
    /// sense in the current phase.
    pub fn apply(&mut self, inbound: Inbound, now: Instant) -> Result<Transition, SessionError> {
        self.check(&inbound.event)?;

        let from = self.model.phase();
        match inbound.event {
            Event::Welcome { nickname } => self.adopt_nickname(nickname),
            Event::Joined { nickname, lobby } => {
                let name = lobby.name.or_else(|| self.pending_join.take());
                let Some(name) = name else {
                    return Err(SessionError::UnnamedJoin);
                };
                self.pending_join = None;
                self.adopt_nickname(nickname);
                self.enter_lobby(name, lobby.phase, now);
            }
            Event::Parted { nickname } => {
                self.adopt_nickname(nickname);
                if let Some(lobby) = &self.model.lobby {
                    tracing::info!(lobby = %lobby.name, "left lobby");
                }
                self.leave_lobby();
            }
            Event::StateUpdate {
                nickname,
                lobby,
                phase,
            } => {
                self.adopt_nickname(nickname);
                let outside = self.model.lobby.is_none();
                match lobby {
                    // Without a join acknowledgment, a full snapshot is how
                    // we learn we are in a lobby.
                    Some(name) if outside => self.enter_lobby(name, phase, now),
                    _ => self.update_phase(phase, now),
                }
            }
            Event::WordAccepted { word } => {
                tracing::debug!(%word, "word accepted");
                self.model.submitted_words.push(word);
            }
            Event::RoundResult { results, .. } => self.record_results(results),
            Event::Error { command, message } => {
                tracing::debug!(command = command.as_deref().unwrap_or(""), %message, "server rejected request");
            }
            // Rejected by `check`.
            Event::Unrecognized { .. } => {}
        }

        if let Some(notice) = inbound.notice {
            self.model.flash.show(notice, now);
        }

        Ok(Transition {
            from,
            to: self.model.phase(),
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    fn check(&self, event: &Event) -> Result<(), SessionError> {
        let lobby = self.model.lobby.as_ref();
        match event {
            Event::Unrecognized { kind } => Err(SessionError::Unrecognized(kind.clone())),
            Event::StateUpdate {
                lobby: named,
                phase,
                ..
            } => match (lobby, named) {
                (Some(lobby), Some(named)) => same_lobby(lobby, named),
                (Some(_), None) => Ok(()),
                (None, Some(_)) if phase.players.is_some() => Ok(()),
                (None, _) => Err(SessionError::NotInLobby("state update")),
            },
            Event::RoundResult { lobby: named, .. } => match (lobby, named) {
                (None, _) => Err(SessionError::NotInLobby("round result")),
                (Some(lobby), Some(named)) => same_lobby(lobby, named),
                (Some(_), None) => Ok(()),
            },
            Event::Joined { lobby: joined, .. } => {
                if joined.name.is_none() && self.pending_join.is_none() {
                    Err(SessionError::UnnamedJoin)
                } else {
                    Ok(())
                }
            }
            Event::WordAccepted { word } => match lobby {
                Some(lobby) if lobby.state == LobbyState::InGame => Ok(()),
                _ => Err(SessionError::NotInGame(word.clone())),
            },
            Event::Welcome { .. } | Event::Parted { .. } | Event::Error { .. } => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    fn adopt_nickname(&mut self, nickname: Option<String>) {
        if let Some(nickname) = nickname.filter(|n| !n.is_empty()) {
            if nickname != self.model.nickname {
                tracing::debug!(%nickname, "nickname assigned");
                self.model.nickname = nickname;
            }
        }
    }

    fn enter_lobby(&mut self, name: String, phase: PhaseUpdate, now: Instant) {
        if let Some(old) = &self.model.lobby {
            tracing::warn!(old = %old.name, new = %name, "joined a lobby while in another");
        }
        tracing::info!(lobby = %name, state = %phase.state, "joined lobby");

        let mut lobby = Lobby::new(name, phase.state);
        lobby.deadline = phase.seconds_remaining.map(|s| deadline_after(now, s));
        lobby.master_solution = phase.master_solution;
        if let Some(roster) = phase.players {
            lobby.players = roster
                .into_iter()
                .map(|(name, snap)| (name.clone(), Player::from_snapshot(name, snap)))
                .collect();
        }
        if phase.state == LobbyState::InGame {
            if let Some(grid) = phase.grid {
                self.model.grid = grid.clone();
                lobby.grid = Some(grid);
            }
        }

        self.model.submitted_words.clear();
        self.model.lobby = Some(lobby);
    }

    fn leave_lobby(&mut self) {
        self.model.lobby = None;
        self.model.submitted_words.clear();
    }

    fn update_phase(&mut self, phase: PhaseUpdate, now: Instant) {
        let Some(lobby) = self.model.lobby.as_mut() else {
            return;
        };

        let previous = lobby.state;
        let changed = previous != phase.state;
        if !previous.can_transition_to(phase.state) {
            tracing::warn!(lobby = %lobby.name, from = %previous, to = %phase.state, "unexpected lobby transition");
        } else if changed {
            tracing::info!(lobby = %lobby.name, from = %previous, to = %phase.state, "lobby state changed");
        }
        lobby.state = phase.state;

        // Within one phase the deadline only ever moves closer.
        match phase.seconds_remaining.map(|s| deadline_after(now, s)) {
            Some(new) if !changed => {
                lobby.deadline = Some(lobby.deadline.map_or(new, |old| old.min(new)));
            }
            Some(new) => lobby.deadline = Some(new),
            None if changed => lobby.deadline = None,
            None => {}
        }

        // Results stay on display until the next round begins.
        let starting_round = changed && matches!(phase.state, LobbyState::Countdown | LobbyState::InGame);
        if starting_round {
            for player in lobby.players.values_mut() {
                player.result = None;
            }
            lobby.master_solution = None;
        }
        if phase.master_solution.is_some() {
            lobby.master_solution = phase.master_solution;
        }

        if let Some(roster) = phase.players {
            let mut previous_players = std::mem::take(&mut lobby.players);
            lobby.players = roster
                .into_iter()
                .map(|(name, snap)| {
                    let mut player = Player::from_snapshot(name.clone(), snap);
                    if player.result.is_none() {
                        player.result = previous_players.remove(&name).and_then(|p| p.result);
                    }
                    (name, player)
                })
                .collect();
        }

        if phase.state == LobbyState::InGame {
            if let Some(grid) = phase.grid {
                self.model.grid = grid.clone();
                lobby.grid = Some(grid);
            }
            if changed {
                self.model.submitted_words.clear();
            }
        } else {
            lobby.grid = None;
            self.model.submitted_words.clear();
        }
    }

    fn record_results(&mut self, results: BTreeMap<String, RoundScore>) {
        let Some(lobby) = self.model.lobby.as_mut() else {
            return;
        };

        for (name, score) in results {
            lobby
                .players
                .entry(name.clone())
                .or_insert_with(|| Player::new(name))
                .result = Some(score);
        }

        if lobby.state == LobbyState::InGame {
            tracing::info!(lobby = %lobby.name, "round over");
            lobby.state = LobbyState::BetweenGames;
            lobby.grid = None;
            lobby.deadline = None;
            self.model.submitted_words.clear();
        }
    }
}

fn same_lobby(lobby: &Lobby, named: &str) -> Result<(), SessionError> {
    if lobby.name == named {
        Ok(())
    } else {
        Err(SessionError::ForeignLobby {
            expected: lobby.name.clone(),
            got: named.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gridword_protocol::{Grid, LobbySnapshot, PlayerSnapshot, Roster, ScoredWord};

    use super::*;

    fn phase(state: LobbyState, seconds: Option<f64>) -> PhaseUpdate {
        PhaseUpdate {
            state,
            seconds_remaining: seconds,
            grid: None,
            players: None,
            master_solution: None,
        }
    }

    fn joined(session: &mut Session, state: LobbyState, now: Instant) {
        let event = Event::Joined {
            nickname: Some("bob".into()),
            lobby: LobbySnapshot {
                name: Some("den".into()),
                phase: phase(state, None),
            },
        };
        session.apply(Inbound::bare(event), now).unwrap();
    }

    fn update(state: LobbyState, seconds: Option<f64>) -> Inbound {
        Inbound::bare(Event::StateUpdate {
            nickname: None,
            lobby: None,
            phase: phase(state, seconds),
        })
    }

    #[test]
    fn test_welcome_sets_nickname_only() {
        let mut session = Session::new(SessionConfig::default());
        let t = session
            .apply(
                Inbound::bare(Event::Welcome {
                    nickname: Some("guest1".into()),
                }),
                Instant::now(),
            )
            .unwrap();
        assert!(!t.changed());
        assert_eq!(session.model().nickname, "guest1");
        assert_eq!(session.model().phase(), Phase::NoLobby);
    }

    #[test]
    fn test_deadline_never_extends_within_phase() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::InGame, now);

        session.apply(update(LobbyState::InGame, Some(60.0)), now).unwrap();
        session.apply(update(LobbyState::InGame, Some(90.0)), now).unwrap();
        let deadline = session.model().lobby.as_ref().unwrap().deadline;
        assert_eq!(deadline, Some(now + Duration::from_secs(60)));

        session.apply(update(LobbyState::InGame, Some(30.0)), now).unwrap();
        let deadline = session.model().lobby.as_ref().unwrap().deadline;
        assert_eq!(deadline, Some(now + Duration::from_secs(30)));
    }

    #[test]
    fn test_phase_change_replaces_deadline() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::Countdown, now);
        session.apply(update(LobbyState::Countdown, Some(5.0)), now).unwrap();

        session.apply(update(LobbyState::InGame, Some(180.0)), now).unwrap();
        let lobby = session.model().lobby.as_ref().unwrap();
        assert_eq!(lobby.deadline, Some(now + Duration::from_secs(180)));

        session.apply(update(LobbyState::AwaitingPlayers, None), now).unwrap();
        assert!(session.model().lobby.as_ref().unwrap().deadline.is_none());
    }

    #[test]
    fn test_words_cleared_when_round_ends() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::InGame, now);
        session
            .apply(Inbound::bare(Event::WordAccepted { word: "cat".into() }), now)
            .unwrap();
        assert_eq!(session.model().submitted_words, ["cat"]);

        session.apply(update(LobbyState::BetweenGames, Some(60.0)), now).unwrap();
        assert!(session.model().submitted_words.is_empty());
    }

    #[test]
    fn test_word_outside_round_is_rejected() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::BetweenGames, now);

        let err = session
            .apply(
                Inbound::bare(Event::WordAccepted { word: "cat".into() }).with_notice("ok", false),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::NotInGame(_)));
        assert!(session.model().submitted_words.is_empty());
        assert!(session.model().flash.latest().is_none());
    }

    #[test]
    fn test_foreign_lobby_is_rejected() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::BetweenGames, now);

        let err = session
            .apply(
                Inbound::bare(Event::StateUpdate {
                    nickname: None,
                    lobby: Some("attic".into()),
                    phase: phase(LobbyState::InGame, Some(60.0)),
                }),
                now,
            )
            .unwrap_err();
        assert!(matches!(err, SessionError::ForeignLobby { .. }));
        assert_eq!(session.model().phase(), Phase::InLobby(LobbyState::BetweenGames));
    }

    #[test]
    fn test_full_snapshot_joins_without_ack() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        let mut players = Roster::new();
        players.insert("amy".into(), PlayerSnapshot::default());
        let inbound = Inbound::bare(Event::StateUpdate {
            nickname: Some("amy".into()),
            lobby: Some("den".into()),
            phase: PhaseUpdate {
                players: Some(players),
                ..phase(LobbyState::AwaitingPlayers, None)
            },
        });

        let t = session.apply(inbound, now).unwrap();
        assert_eq!(t.from, Phase::NoLobby);
        assert_eq!(t.to, Phase::InLobby(LobbyState::AwaitingPlayers));
        assert!(session.model().self_player().is_some());
    }

    #[test]
    fn test_partial_update_without_lobby_is_rejected() {
        let mut session = Session::new(SessionConfig::default());
        let err = session
            .apply(update(LobbyState::InGame, Some(60.0)), Instant::now())
            .unwrap_err();
        assert!(matches!(err, SessionError::NotInLobby(_)));
    }

    #[test]
    fn test_results_survive_roster_refresh_until_next_round() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::InGame, now);

        let mut results = BTreeMap::new();
        results.insert(
            "bob".to_string(),
            RoundScore {
                total: 1,
                words: vec![ScoredWord {
                    word: "cat".into(),
                    points: 1,
                }],
            },
        );
        session
            .apply(Inbound::bare(Event::RoundResult { lobby: None, results }), now)
            .unwrap();

        let mut roster = Roster::new();
        roster.insert("bob".into(), PlayerSnapshot::default());
        let refresh = |state| {
            Inbound::bare(Event::StateUpdate {
                nickname: None,
                lobby: None,
                phase: PhaseUpdate {
                    players: Some(roster.clone()),
                    ..phase(state, None)
                },
            })
        };

        session.apply(refresh(LobbyState::BetweenGames), now).unwrap();
        assert!(session.model().self_player().unwrap().result.is_some());

        session.apply(refresh(LobbyState::Countdown), now).unwrap();
        assert!(session.model().self_player().unwrap().result.is_none());
        session.apply(refresh(LobbyState::InGame), now).unwrap();
        assert!(session.model().self_player().unwrap().result.is_none());
    }

    #[test]
    fn test_countdown_clears_results_without_roster() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::InGame, now);

        let mut results = BTreeMap::new();
        results.insert("bob".to_string(), RoundScore::default());
        session
            .apply(Inbound::bare(Event::RoundResult { lobby: None, results }), now)
            .unwrap();
        let solution = RoundScore {
            total: 2,
            words: vec![ScoredWord {
                word: "stone".into(),
                points: 2,
            }],
        };
        session
            .apply(
                Inbound::bare(Event::StateUpdate {
                    nickname: None,
                    lobby: None,
                    phase: PhaseUpdate {
                        master_solution: Some(solution.clone()),
                        ..phase(LobbyState::BetweenGames, Some(10.0))
                    },
                }),
                now,
            )
            .unwrap();
        let lobby = session.model().lobby.as_ref().unwrap();
        assert_eq!(lobby.master_solution.as_ref(), Some(&solution));
        assert!(lobby.players["bob"].result.is_some());

        session.apply(update(LobbyState::Countdown, Some(5.0)), now).unwrap();
        let lobby = session.model().lobby.as_ref().unwrap();
        assert!(lobby.master_solution.is_none());
        assert!(lobby.players["bob"].result.is_none());
    }

    #[test]
    fn test_unnamed_join_uses_requested_lobby() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        let unnamed = || {
            Inbound::bare(Event::Joined {
                nickname: None,
                lobby: LobbySnapshot {
                    name: None,
                    phase: phase(LobbyState::AwaitingPlayers, None),
                },
            })
        };

        let err = session.apply(unnamed(), now).unwrap_err();
        assert!(matches!(err, SessionError::UnnamedJoin));
        assert_eq!(session.model().phase(), Phase::NoLobby);

        session.join_requested("den");
        let t = session.apply(unnamed(), now).unwrap();
        assert_eq!(t.to, Phase::InLobby(LobbyState::AwaitingPlayers));
        assert_eq!(session.model().lobby.as_ref().unwrap().name, "den");

        // The request is used up by the acknowledgment.
        session
            .apply(Inbound::bare(Event::Parted { nickname: None }), now)
            .unwrap();
        assert!(matches!(session.apply(unnamed(), now), Err(SessionError::UnnamedJoin)));
    }

    #[test]
    fn test_grid_only_kept_in_game() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::Countdown, now);

        let grid = Grid::try_from(vec![vec!["A".to_string(); 4]; 4]).unwrap();
        session
            .apply(
                Inbound::bare(Event::StateUpdate {
                    nickname: None,
                    lobby: None,
                    phase: PhaseUpdate {
                        grid: Some(grid.clone()),
                        ..phase(LobbyState::InGame, Some(180.0))
                    },
                }),
                now,
            )
            .unwrap();
        assert_eq!(session.model().displayed_grid(), &grid);

        session.apply(update(LobbyState::BetweenGames, None), now).unwrap();
        assert!(session.model().lobby.as_ref().unwrap().grid.is_none());
        // The last board stays on screen.
        assert_eq!(session.model().displayed_grid(), &grid);
    }

    #[test]
    fn test_connection_lost_leaves_lobby_with_error() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        session.connection_opened();
        joined(&mut session, LobbyState::InGame, now);

        let t = session.connection_lost(now);
        assert!(t.changed());
        assert_eq!(session.model().connection, ConnectionStatus::Closed);
        assert_eq!(session.model().phase(), Phase::NoLobby);
        let notice = session.model().flash.current(now).unwrap();
        assert!(notice.is_error);
    }

    #[test]
    fn test_error_event_only_flashes() {
        let now = Instant::now();
        let mut session = Session::new(SessionConfig::default());
        joined(&mut session, LobbyState::BetweenGames, now);

        let inbound = Inbound::bare(Event::Error {
            command: Some("ready".into()),
            message: "nope".into(),
        })
        .with_notice("nope", true);
        let t = session.apply(inbound, now).unwrap();
        assert!(!t.changed());
        assert_eq!(session.status_line(now), "nope");
    }
}
