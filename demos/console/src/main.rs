//! Line-oriented console client.
//!
//! ```bash
//! gridword --server ws://127.0.0.1:8080/engine --lobby den
//! ```
//!
//! Type `/help` for commands; anything without a leading `/` is submitted
//! as a word.

use std::collections::BTreeMap;

use clap::Parser;
use gridword::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "gridword")]
#[command(about = "Console client for the Gridword word game")]
#[command(version)]
struct Args {
    /// Game server WebSocket URL
    #[arg(short, long, default_value = gridword::DEFAULT_URL)]
    server: String,

    /// Lobby to join on connect
    #[arg(short, long)]
    lobby: Option<String>,

    /// Timer redraw interval in milliseconds (0 disables it)
    #[arg(long, default_value = "1000")]
    refresh_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

// ---------------------------------------------------------------------------
// Presenter
// ---------------------------------------------------------------------------

/// Prints what changed since the last render, one line at a time.
#[derive(Default)]
struct ConsolePresenter {
    phase: Option<Phase>,
    status: String,
    grid: Option<Grid>,
    words_shown: usize,
    roster: BTreeMap<String, (u32, bool)>,
    results_shown: bool,
    solution_shown: bool,
    timer: String,
}

impl Presenter for ConsolePresenter {
    fn render(&mut self, model: &SessionModel, view: &View) {
        let phase = model.phase();
        if self.phase != Some(phase) {
            self.phase = Some(phase);
            self.words_shown = 0;
            self.results_shown = false;
            self.solution_shown = false;
            match &model.lobby {
                Some(lobby) => println!("== {} :: {}", lobby.name, model.state_description()),
                None => println!("== {}", model.state_description()),
            }
        }

        if view.status_line != self.status {
            self.status.clone_from(&view.status_line);
            let marker = if view.status_is_error { '!' } else { '=' };
            println!("{marker} {}", view.status_line);
        }

        let Some(lobby) = &model.lobby else {
            self.roster.clear();
            return;
        };

        let roster: BTreeMap<String, (u32, bool)> = lobby
            .players
            .values()
            .map(|p| (p.nickname.clone(), (p.score, p.is_ready)))
            .collect();
        if roster != self.roster {
            let line: Vec<String> = roster
                .iter()
                .map(|(name, (score, ready))| {
                    let you = if *name == model.nickname { "*" } else { "" };
                    let ready = if *ready { " ready" } else { "" };
                    format!("{you}{name} {score}{ready}")
                })
                .collect();
            println!("   players: {}", line.join(", "));
            self.roster = roster;
        }

        if lobby.state == LobbyState::InGame && self.grid.as_ref() != lobby.grid.as_ref() {
            self.grid.clone_from(&lobby.grid);
            println!("{}", indent(&model.displayed_grid().to_string()));
        }

        for word in model.submitted_words.iter().skip(self.words_shown) {
            println!("   + {word}");
        }
        self.words_shown = model.submitted_words.len();

        if lobby.state == LobbyState::BetweenGames && !self.results_shown {
            let mut any = false;
            for player in lobby.players.values() {
                if let Some(result) = &player.result {
                    println!("   {} ({}): {}", player.nickname, result.total, result_line(result));
                    any = true;
                }
            }
            self.results_shown = any;
        }

        if let (false, Some(solution)) = (self.solution_shown, &lobby.master_solution) {
            println!("   {}", solution_line(solution));
            self.solution_shown = true;
        }
    }

    fn refresh(&mut self, view: &View) {
        if matches!(self.phase, Some(Phase::InLobby(_))) && view.time_remaining != self.timer {
            self.timer.clone_from(&view.time_remaining);
            if view.time_remaining.ends_with('0') {
                println!("   [{}]", view.time_remaining);
            }
        }
    }

    fn report(&mut self, text: &str, is_error: bool) {
        let marker = if is_error { '!' } else { '<' };
        for line in text.lines() {
            println!("{marker} {line}");
        }
    }
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("      {line}")).collect::<Vec<_>>().join("\n")
}

/// `cat (1)  ~tac~  xq (-1)`: accepted words with points, invalid struck
/// through, penalties with their cost.
fn result_line(result: &RoundScore) -> String {
    let words: Vec<String> = result
        .words
        .iter()
        .map(|w| match w.verdict() {
            WordVerdict::Accepted | WordVerdict::Penalty => format!("{} ({})", w.word, w.points),
            WordVerdict::Invalid => format!("~{}~", w.word),
        })
        .collect();
    if words.is_empty() { "no words".into() } else { words.join("  ") }
}

/// `board held 42 words worth 61 points`
fn solution_line(solution: &RoundScore) -> String {
    format!(
        "board held {} words worth {} points",
        solution.words.len(),
        solution.total
    )
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    gridword::telemetry::init(&args.log_level)?;

    let refresh = RefreshConfig::default().with_interval(std::time::Duration::from_millis(args.refresh_ms));
    let mut builder = Client::builder().url(&args.server).refresh_config(refresh);
    if let Some(lobby) = &args.lobby {
        builder = builder.auto_join(lobby);
    }

    println!("= Trying to connect to {}...", args.server);
    let client = builder.connect().await?;
    println!("= Connected. Type /help for commands.");

    let (intents_tx, intents) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let intent = match lines.next_line().await {
                Ok(Some(line)) => Intent::Line(line),
                Ok(None) => Intent::Close,
                Err(error) => {
                    tracing::warn!(%error, "stdin failed");
                    Intent::Close
                }
            };
            let closing = intent == Intent::Close;
            if intents_tx.send(intent).await.is_err() || closing {
                break;
            }
        }
    });

    let mut presenter = ConsolePresenter::default();
    client.run(intents, &mut presenter).await?;
    println!("= Connection closed.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(word: &str, points: i32) -> ScoredWord {
        ScoredWord { word: word.into(), points }
    }

    #[test]
    fn test_result_line_marks_verdicts() {
        let result = RoundScore {
            total: 2,
            words: vec![scored("cats", 2), scored("tac", 0), scored("xq", -1)],
        };
        assert_eq!(result_line(&result), "cats (2)  ~tac~  xq (-1)");
        assert_eq!(result_line(&RoundScore::default()), "no words");
    }

    #[test]
    fn test_solution_line_counts_words() {
        let solution = RoundScore {
            total: 3,
            words: vec![scored("cats", 2), scored("cat", 1)],
        };
        assert_eq!(solution_line(&solution), "board held 2 words worth 3 points");
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["gridword"]);
        assert_eq!(args.server, gridword::DEFAULT_URL);
        assert!(args.lobby.is_none());
        assert_eq!(args.refresh_ms, 1000);
    }
}
