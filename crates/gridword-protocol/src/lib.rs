//! Wire protocol for Gridword.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Commands** ([`Command`]) — what the client sends.
//! - **Events** ([`Event`], [`Inbound`]) — the closed union every server
//!   frame is normalized into, whichever dialect the server uses.
//! - **Types** ([`LobbyState`], [`Grid`], [`RoundScore`], …) — the values
//!   those carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`], [`encode_command`],
//!   [`decode_frame`]) — how they are converted to and from frame text.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (text frames) → Protocol (Inbound) → Session (SessionModel)
//! ```

mod codec;
mod command;
mod error;
mod event;
mod types;
mod wire;

pub use codec::{Codec, decode_frame, encode_command};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::Command;
pub use error::ProtocolError;
pub use event::{Event, Inbound};
pub use types::{
    GRID_SIZE, Grid, LobbySnapshot, LobbyState, Notice, PhaseUpdate,
    PlayerSnapshot, Roster, RoundScore, ScoredWord, WordVerdict,
};
