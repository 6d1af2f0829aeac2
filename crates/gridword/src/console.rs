//! Console command dispatch.
//!
//! Turns a typed line into a [`Command`] for the server or a local action.
//! A line whose first token starts with `/` names a command; any other line
//! is handed whole to the default command, `word`, so during a round the
//! player just types the words they find.
//!
//! ```text
//! /join den              →  {"command":"join","lobbyName":"den"}
//! /join den s3cret bob   →  {"command":"join","lobbyName":"den","password":"s3cret","nickname":"bob"}
//! cat                    →  {"command":"word","word":"cat"}
//! ```
//!
//! Argument counts are checked here; a bad line never reaches the wire.

use std::fmt;

use gridword_protocol::Command;

use crate::tokenize;

/// A typed line that could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The command exists but got the wrong number of parameters.
    #[error("{name} takes {arity} parameter(s)")]
    Arity { name: &'static str, arity: Arity },

    /// No command has this name.
    #[error("Unknown command: /{0}")]
    Unknown(String),
}

/// The parameter counts a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity(&'static [usize]);

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        self.0.contains(&count)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [only] => write!(f, "exactly {only}"),
            counts => {
                let counts: Vec<String> = counts.iter().map(usize::to_string).collect();
                f.write_str(&counts.join(" or "))
            }
        }
    }
}

/// What a typed line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send this command to the server.
    Send(Command),
    /// Show this text locally.
    Help(String),
}

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// Name of the command that receives lines without a leading `/`.
pub const DEFAULT_COMMAND: &str = "word";

struct Spec {
    name: &'static str,
    usage: &'static str,
    arity: Arity,
    summary: &'static str,
    build: fn(Vec<String>) -> Action,
}

const COMMANDS: &[Spec] = &[
    Spec {
        name: "join",
        usage: "<lobby> [password nickname]",
        arity: Arity(&[1, 3]),
        summary: "joins a lobby, creating it if needed",
        build: join,
    },
    Spec {
        name: "part",
        usage: "",
        arity: Arity(&[0]),
        summary: "leaves the lobby",
        build: |_| Action::Send(Command::Part),
    },
    Spec {
        name: "ready",
        usage: "",
        arity: Arity(&[0]),
        summary: "readies up for the next round",
        build: |_| Action::Send(Command::Ready),
    },
    Spec {
        name: "word",
        usage: "<word>",
        arity: Arity(&[1]),
        summary: "submits a word (the default command)",
        build: |args| Action::Send(Command::word(first(args))),
    },
    Spec {
        name: "guess",
        usage: "<word>",
        arity: Arity(&[1]),
        summary: "submits a word as a guess",
        build: |args| Action::Send(Command::Guess { word: first(args) }),
    },
    Spec {
        name: "quit",
        usage: "",
        arity: Arity(&[0]),
        summary: "ends the session",
        build: |_| Action::Send(Command::Quit),
    },
    Spec {
        name: "help",
        usage: "",
        arity: Arity(&[0]),
        summary: "shows this dialog",
        build: |_| Action::Help(help_text()),
    },
];

fn first(args: Vec<String>) -> String {
    args.into_iter().next().unwrap_or_default()
}

fn join(args: Vec<String>) -> Action {
    let mut args = args.into_iter();
    let lobby_name = args.next().unwrap_or_default();
    Action::Send(Command::Join {
        lobby_name,
        password: args.next(),
        nickname: args.next(),
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Parses one typed line.
///
/// Returns `Ok(None)` for a blank line.
///
/// # Errors
/// [`CommandError::Unknown`] for an unknown `/name`, [`CommandError::Arity`]
/// when the parameter count is wrong.
pub fn parse_line(line: &str) -> Result<Option<Action>, CommandError> {
    let mut tokens = tokenize(line);
    if tokens.is_empty() {
        return Ok(None);
    }

    let name = match tokens[0].strip_prefix('/') {
        Some(name) => {
            let name = name.to_ascii_lowercase();
            tokens.remove(0);
            name
        }
        None => DEFAULT_COMMAND.to_owned(),
    };

    let spec = COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .ok_or(CommandError::Unknown(name))?;

    if !spec.arity.accepts(tokens.len()) {
        return Err(CommandError::Arity {
            name: spec.name,
            arity: spec.arity,
        });
    }

    Ok(Some((spec.build)(tokens)))
}

/// The help dialog: every command sorted by name, descriptions aligned.
pub fn help_text() -> String {
    let mut specs: Vec<&Spec> = COMMANDS.iter().collect();
    specs.sort_by_key(|spec| spec.name);

    let synopses: Vec<String> = specs
        .iter()
        .map(|spec| format!("/{} {}", spec.name, spec.usage).trim_end().to_owned())
        .collect();
    let width = synopses.iter().map(String::len).max().unwrap_or(0);

    let mut text = String::from("Commands:");
    for (spec, synopsis) in specs.iter().zip(&synopses) {
        text.push_str(&format!("\n  {synopsis:<width$} - {}", spec.summary));
    }
    text
}
