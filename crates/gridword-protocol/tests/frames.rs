//! Decoding tests for both server dialects.
//!
//! Each test feeds the exact text of a frame through [`decode_frame`] and
//! checks the normalized event, so a change to the raw shapes in `wire.rs`
//! shows up here as a failing frame rather than a silent mismatch.

use gridword_protocol::{
    Command, Event, JsonCodec, LobbyState, ProtocolError, WordVerdict,
    decode_frame, encode_command,
};

fn decode(text: &str) -> gridword_protocol::Inbound {
    decode_frame(&JsonCodec, text).expect("frame should decode")
}

const GRID_JSON: &str =
    r#"[["A","B","C","D"],["E","F","G","H"],["I","J","K","L"],["M","N","O","Qu"]]"#;

// =========================================================================
// Outbound
// =========================================================================

#[test]
fn test_encoded_word_decodes_as_generic_json() {
    let text = encode_command(&JsonCodec, &Command::word("CAT")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value, serde_json::json!({"command": "word", "word": "CAT"}));
}

#[test]
fn test_encoded_join_uses_lobby_name_field() {
    let text = encode_command(&JsonCodec, &Command::join("my lobby")).unwrap();
    assert_eq!(text, r#"{"command":"join","lobbyName":"my lobby"}"#);
}

// =========================================================================
// Typed dialect
// =========================================================================

#[test]
fn test_typed_state_with_lobby_is_state_update() {
    let text = format!(
        r#"{{
            "type": "state",
            "nickname": "bob",
            "message": "Game begin!",
            "lobby": {{
                "name": "den",
                "state": "inGame",
                "secondsRemaining": 180,
                "grid": {GRID_JSON},
                "players": {{
                    "bob": {{"score": 3, "readied": false, "playing": true}},
                    "amy": {{"score": 0, "readied": true, "playing": false}}
                }}
            }}
        }}"#
    );
    let inbound = decode(&text);

    let Event::StateUpdate {
        nickname,
        lobby,
        phase,
    } = inbound.event
    else {
        panic!("expected StateUpdate, got {:?}", inbound.event);
    };
    assert_eq!(nickname.as_deref(), Some("bob"));
    assert_eq!(lobby.as_deref(), Some("den"));
    assert_eq!(phase.state, LobbyState::InGame);
    assert_eq!(phase.seconds_remaining, Some(180.0));
    assert_eq!(phase.grid.unwrap().tile(3, 3), Some("Qu"));

    let players = phase.players.unwrap();
    let names: Vec<&str> = players.keys().map(String::as_str).collect();
    assert_eq!(names, ["amy", "bob"]);
    assert!(players["bob"].playing);
    assert!(players["amy"].ready);
    assert_eq!(players["bob"].score, 3);

    let notice = inbound.notice.unwrap();
    assert_eq!(notice.text, "Game begin!");
    assert!(!notice.is_error);
}

#[test]
fn test_typed_state_carries_master_solution() {
    let inbound = decode(
        r#"{"type":"state","lobby":{"name":"den","state":"betweenGames",
            "masterSolution":{"score":7,"words":[{"word":"stone","points":2},{"word":"notes","points":2}]}}}"#,
    );
    let Event::StateUpdate { phase, .. } = inbound.event else {
        panic!("expected StateUpdate");
    };
    let solution = phase.master_solution.unwrap();
    assert_eq!(solution.total, 7);
    assert_eq!(solution.words.len(), 2);
    assert_eq!(solution.words[0].word, "stone");
}

#[test]
fn test_typed_state_without_lobby_is_parted() {
    let inbound = decode(
        r#"{"type":"state","nickname":"bob","lobby":null,"message":"You have left den"}"#,
    );
    assert_eq!(
        inbound.event,
        Event::Parted {
            nickname: Some("bob".into())
        }
    );
    assert_eq!(inbound.notice.unwrap().text, "You have left den");
}

#[test]
fn test_blank_grid_outside_rounds_is_no_grid() {
    let inbound = decode(
        r#"{"type":"state","lobby":{"name":"den","state":"countdown",
            "grid":[["","","",""],["","","",""],["","","",""],["","","",""]]}}"#,
    );
    let Event::StateUpdate { phase, .. } = inbound.event else {
        panic!("expected StateUpdate");
    };
    assert!(phase.grid.is_none());
}

#[test]
fn test_typed_word_and_error() {
    let word = decode(r#"{"type":"word","word":"cat"}"#);
    assert_eq!(word.event, Event::WordAccepted { word: "cat".into() });
    assert!(word.notice.is_none());

    let error = decode(
        r#"{"type":"error","command":"ready","message":"You may only ready up between games"}"#,
    );
    assert_eq!(
        error.event,
        Event::Error {
            command: Some("ready".into()),
            message: "You may only ready up between games".into(),
        }
    );
    assert!(error.notice.unwrap().is_error);
}

#[test]
fn test_typed_result_carries_scored_words() {
    let inbound = decode(
        r#"{"type":"result","players":{
            "bob":{"total":2,"words":[{"word":"cat","points":1},{"word":"tac","points":0},{"word":"xyz","points":-1}]}
        }}"#,
    );
    let Event::RoundResult { results, .. } = inbound.event else {
        panic!("expected RoundResult");
    };
    let bob = &results["bob"];
    assert_eq!(bob.total, 2);
    let verdicts: Vec<WordVerdict> =
        bob.words.iter().map(|w| w.verdict()).collect();
    assert_eq!(
        verdicts,
        [WordVerdict::Accepted, WordVerdict::Invalid, WordVerdict::Penalty]
    );
}

// =========================================================================
// Command dialect
// =========================================================================

#[test]
fn test_command_join_with_name_list() {
    let inbound = decode(
        r#"{"ok":true,"command":"join","message":"Joined den",
            "metadata":{"name":"den","players":["amy","bob"],"nickname":"bob"}}"#,
    );
    let Event::Joined { nickname, lobby } = inbound.event else {
        panic!("expected Joined");
    };
    assert_eq!(nickname.as_deref(), Some("bob"));
    assert_eq!(lobby.name.as_deref(), Some("den"));
    // A join acknowledgment without a state means a fresh lobby.
    assert_eq!(lobby.phase.state, LobbyState::AwaitingPlayers);
    assert_eq!(lobby.phase.players.unwrap().len(), 2);
}

#[test]
fn test_command_join_with_nested_lobby() {
    let inbound = decode(
        r#"{"ok":true,"command":"join",
            "metadata":{"lobby":{"lobbyName":"den","state":"betweenGames","remainingSeconds":42}}}"#,
    );
    let Event::Joined { lobby, .. } = inbound.event else {
        panic!("expected Joined");
    };
    assert_eq!(lobby.name.as_deref(), Some("den"));
    assert_eq!(lobby.phase.state, LobbyState::BetweenGames);
    assert_eq!(lobby.phase.seconds_remaining, Some(42.0));
}

#[test]
fn test_command_join_without_metadata_uses_top_level_players() {
    let inbound = decode(
        r#"{"command":"join","ok":true,"message":"Joined lobby","players":["amy","bob"]}"#,
    );
    let Event::Joined { nickname, lobby } = inbound.event else {
        panic!("expected Joined");
    };
    assert!(nickname.is_none());
    assert!(lobby.name.is_none());
    assert_eq!(lobby.phase.state, LobbyState::AwaitingPlayers);
    let players = lobby.phase.players.unwrap();
    assert_eq!(players.keys().collect::<Vec<_>>(), ["amy", "bob"]);
    assert_eq!(inbound.notice.unwrap().text, "Joined lobby");
}

#[test]
fn test_command_not_ok_is_error() {
    let inbound = decode(
        r#"{"ok":false,"command":"join","message":"You are already in a lobby"}"#,
    );
    assert_eq!(
        inbound.event,
        Event::Error {
            command: Some("join".into()),
            message: "You are already in a lobby".into(),
        }
    );
    assert!(inbound.notice.unwrap().is_error);
}

#[test]
fn test_command_connect_part_word_result() {
    let welcome =
        decode(r#"{"ok":true,"command":"connect","message":"Hello world!","metadata":{"nickname":"guest7"}}"#);
    assert_eq!(
        welcome.event,
        Event::Welcome {
            nickname: Some("guest7".into())
        }
    );

    let part = decode(r#"{"ok":true,"command":"part"}"#);
    assert_eq!(part.event, Event::Parted { nickname: None });

    let word = decode(r#"{"ok":true,"command":"guess","metadata":{"word":"dog"}}"#);
    assert_eq!(word.event, Event::WordAccepted { word: "dog".into() });

    let result = decode(
        r#"{"ok":true,"command":"result","metadata":{"name":"den","players":{"bob":{"score":5,"words":[{"word":"stone","points":5}]}}}}"#,
    );
    let Event::RoundResult { lobby, results } = result.event else {
        panic!("expected RoundResult");
    };
    assert_eq!(lobby.as_deref(), Some("den"));
    assert_eq!(results["bob"].total, 5);
}

// =========================================================================
// Unknown and malformed
// =========================================================================

#[test]
fn test_unknown_type_and_command_are_unrecognized() {
    let typed = decode(r#"{"type":"fireworks"}"#);
    assert_eq!(
        typed.event,
        Event::Unrecognized {
            kind: "fireworks".into()
        }
    );

    let command = decode(r#"{"ok":true,"command":"dance"}"#);
    assert_eq!(
        command.event,
        Event::Unrecognized {
            kind: "dance".into()
        }
    );

    let neither = decode(r#"{"hello":"world"}"#);
    assert!(matches!(neither.event, Event::Unrecognized { .. }));
}

#[test]
fn test_unknown_lobby_state_is_unrecognized() {
    let inbound =
        decode(r#"{"type":"state","lobby":{"name":"den","state":"halftime"}}"#);
    assert_eq!(
        inbound.event,
        Event::Unrecognized {
            kind: "state:halftime".into()
        }
    );
}

#[test]
fn test_garbage_is_decode_error() {
    let err = decode_frame(&JsonCodec, "not json at all").unwrap_err();
    assert!(matches!(err, ProtocolError::Decode(_)));
}

#[test]
fn test_bad_grid_is_invalid_message() {
    let err = decode_frame(
        &JsonCodec,
        r#"{"type":"state","lobby":{"name":"den","state":"inGame","grid":[["A","B"]]}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidMessage(_)));
}


#[test]
fn test_command_without_ok_is_invalid_message() {
    let err =
        decode_frame(&JsonCodec, r#"{"command":"part"}"#).unwrap_err();
    assert!(matches!(err, ProtocolError::InvalidMessage(_)));
}
