//! Client-side session state for Gridword.
//!
//! This crate owns the local copy of everything a front-end displays:
//!
//! 1. **Model** — [`SessionModel`], [`Lobby`], [`Player`] and the read-side
//!    projections over them (phase, permissions, state text).
//! 2. **State machine** — [`Session`] folds normalized server events into
//!    the model, one event at a time, all-or-nothing.
//! 3. **Timers** — the synchronized round deadline and its `M:SS` label
//!    ([`format_time_remaining`]), and transient [`Flash`] notices.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)  ← feeds decoded frames in, reads the model out
//!     ↕
//! Session Layer (this crate)  ← pure state, no I/O, caller passes `now`
//!     ↕
//! Protocol Layer (below)  ← provides Event, LobbyState, Grid types
//! ```
//!
//! Nothing here reads the clock. Every time-dependent operation takes an
//! `Instant`, so tests can step time explicitly.

mod config;
mod countdown;
mod error;
mod flash;
mod machine;
mod model;

pub use config::SessionConfig;
pub use countdown::{deadline_after, format_time_remaining};
pub use error::SessionError;
pub use flash::{Flash, FlashNotice};
pub use machine::{Session, Transition};
pub use model::{ConnectionStatus, Lobby, Phase, Player, SessionModel};
