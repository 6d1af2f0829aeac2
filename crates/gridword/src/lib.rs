//! # Gridword
//!
//! Thin client core for a real-time multiplayer word game: players join a
//! lobby, wait for a quorum, watch a countdown, then race to find words on
//! a shared 4×4 letter grid before the timer runs out.
//!
//! This crate wires the layers together:
//!
//! - [`tokenize`] and [`console`] — typed lines to commands
//! - [`Client`] — connection + codec + session on a single task, with a
//!   [`Presenter`] seam for whatever draws the screen
//! - [`telemetry`] — log output setup
//! - [`GridwordError`] — what a client call can fail with
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridword::prelude::*;
//!
//! // let (intents_tx, intents) = tokio::sync::mpsc::channel(16);
//! // let client = Client::builder()
//! //     .url("ws://127.0.0.1:8080/engine")
//! //     .auto_join("den")
//! //     .connect()
//! //     .await?;
//! // client.run(intents, &mut my_presenter).await
//! ```

mod client;
pub mod console;
mod error;
pub mod telemetry;
mod tokenize;

pub use client::{
    Client, ClientBuilder, ClientConfig, DEFAULT_URL, Delivery, Intent, LineOutcome, NOT_CONNECTED,
    Presenter, View,
};
pub use error::GridwordError;
pub use tokenize::tokenize;

pub use gridword_protocol as protocol;
pub use gridword_session as session;
pub use gridword_tick as tick;
pub use gridword_transport as transport;

/// Everything a front-end usually needs.
pub mod prelude {
    pub use crate::console::{Action, CommandError, help_text, parse_line};
    pub use crate::{
        Client, ClientBuilder, ClientConfig, Delivery, GridwordError, Intent, LineOutcome,
        Presenter, View, tokenize,
    };
    pub use gridword_protocol::{
        Command, Grid, LobbyState, RoundScore, ScoredWord, WordVerdict,
    };
    pub use gridword_session::{
        ConnectionStatus, Lobby, Phase, Player, SessionConfig, SessionModel,
    };
    pub use gridword_tick::RefreshConfig;
    pub use gridword_transport::{Connection, TransportError};
}
