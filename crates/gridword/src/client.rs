//! The client: one connection, one session, one task.
//!
//! [`Client`] ties the layers together:
//!
//! ```text
//!   Connection ──text──→ decode_frame ──Inbound──→ Session::apply ──→ Presenter
//!        ▲                                                              │
//!        └────text──── encode_command ◄──Command◄── parse_line ◄── Intent
//! ```
//!
//! All model mutation happens on the task driving [`Client::run`]; the
//! front-end only sees `&SessionModel` through its [`Presenter`] and talks
//! back through an intent channel. The connection is opened once and never
//! reopened: when it drops, `run` reports it and returns.

use std::time::{Duration, Instant};

use gridword_protocol::{Codec, Command, JsonCodec, decode_frame, encode_command};
use gridword_session::{ConnectionStatus, Session, SessionConfig, SessionModel, Transition};
use gridword_tick::{RefreshConfig, RefreshTicker};
use gridword_transport::{Connection, TransportError};
use tokio::sync::mpsc;

use crate::GridwordError;
use crate::console::{Action, parse_line};

/// Local notice shown when a command can't be sent.
pub const NOT_CONNECTED: &str = "Not connected.";

/// Default server endpoint.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:8080/engine";

// ---------------------------------------------------------------------------
// Presenter seam
// ---------------------------------------------------------------------------

/// The time-dependent parts of the display, computed for one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// A visible notice, else `"Lobby <name>"`, else the title.
    pub status_line: String,
    /// Whether `status_line` is an error notice.
    pub status_is_error: bool,
    /// The phase timer as `M:SS`.
    pub time_remaining: String,
}

/// Draws the client state. Implemented by front-ends.
///
/// Calls are made from the client task, one at a time.
pub trait Presenter {
    /// The model changed; redraw everything.
    fn render(&mut self, model: &SessionModel, view: &View);

    /// Only time passed; redraw the timer and status line.
    fn refresh(&mut self, view: &View);

    /// Show a message that isn't part of the model (help text, a typo).
    fn report(&mut self, text: &str, is_error: bool);
}

/// What the front-end wants the client to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// A line the user typed, dispatched through the console commands.
    Line(String),
    /// A command built by the front-end itself.
    Command(Command),
    /// Close the connection and stop.
    Close,
}

/// Whether a command went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// The connection isn't open; a "Not connected." notice was flashed.
    NotConnected,
}

/// The local result of a typed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was blank.
    Nothing,
    /// The line became a command and was handed to [`Client::send`].
    Delivered(Delivery),
    /// Text to show locally instead of sending anything.
    Local { text: String, is_error: bool },
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Everything needed to start a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server endpoint, e.g. `ws://host:8080/engine`.
    pub url: String,
    pub session: SessionConfig,
    pub refresh: RefreshConfig,
    /// Lobby to join as soon as the run loop starts.
    pub auto_join: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            session: SessionConfig::default(),
            refresh: RefreshConfig::default(),
            auto_join: None,
        }
    }
}

/// Builder for a [`ClientConfig`], and for a connected client.
///
/// # Example
///
/// ```rust,ignore
/// use gridword::prelude::*;
///
/// let client = Client::builder()
///     .url("ws://127.0.0.1:8080/engine")
///     .auto_join("den")
///     .connect()
///     .await?;
/// client.run(intents, &mut presenter).await
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.config.session = config;
        self
    }

    /// Sets the refresh ticker configuration.
    pub fn refresh_config(mut self, config: RefreshConfig) -> Self {
        self.config.refresh = config;
        self
    }

    /// Joins `lobby` right after connecting.
    pub fn auto_join(mut self, lobby: impl Into<String>) -> Self {
        self.config.auto_join = Some(lobby.into());
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }

    /// Connects over WebSocket with the built configuration.
    #[cfg(feature = "websocket")]
    pub async fn connect(
        self,
    ) -> Result<Client<gridword_transport::WebSocketConnection>, GridwordError> {
        Client::connect(self.config).await
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A connected game client.
pub struct Client<C: Connection, K: Codec = JsonCodec> {
    conn: C,
    codec: K,
    session: Session,
    refresh: RefreshConfig,
    auto_join: Option<String>,
}

#[cfg(feature = "websocket")]
impl Client<gridword_transport::WebSocketConnection> {
    /// Creates a new builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Opens a WebSocket to `config.url` and wraps it.
    ///
    /// # Errors
    /// Returns [`GridwordError::Transport`] if the server can't be reached.
    pub async fn connect(config: ClientConfig) -> Result<Self, GridwordError> {
        tracing::info!(url = %config.url, "connecting");
        let conn = gridword_transport::WebSocketConnection::connect(&config.url).await?;
        Ok(Self::new(conn, config))
    }
}

impl<C> Client<C>
where
    C: Connection<Error = TransportError>,
{
    /// Wraps an already established connection, using JSON frames.
    pub fn new(conn: C, config: ClientConfig) -> Self {
        Self::with_codec(conn, JsonCodec, config)
    }
}

impl<C, K> Client<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    /// Wraps an already established connection with a custom codec.
    pub fn with_codec(conn: C, codec: K, config: ClientConfig) -> Self {
        let mut session = Session::new(config.session);
        if conn.is_open() {
            session.connection_opened();
        }
        Self {
            conn,
            codec,
            session,
            refresh: config.refresh,
            auto_join: config.auto_join,
        }
    }

    /// The session state machine.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The current model.
    pub fn model(&self) -> &SessionModel {
        self.session.model()
    }

    /// The time-dependent display values at `now`.
    pub fn view(&self, now: Instant) -> View {
        let model = self.session.model();
        View {
            status_line: self.session.status_line(now),
            status_is_error: model.flash.current(now).is_some_and(|n| n.is_error),
            time_remaining: self.session.time_remaining_label(now),
        }
    }

    /// Decodes one inbound frame and applies it.
    ///
    /// Malformed frames and events the session refuses are logged and
    /// dropped; returns the transition when the event was applied.
    pub fn handle_frame(&mut self, text: &str, now: Instant) -> Option<Transition> {
        let inbound = match decode_frame(&self.codec, text) {
            Ok(inbound) => inbound,
            Err(error) => {
                tracing::debug!(%error, "dropping malformed frame");
                return None;
            }
        };

        let kind = inbound.event.kind();
        match self.session.apply(inbound, now) {
            Ok(transition) => {
                if transition.changed() {
                    tracing::info!(from = %transition.from, to = %transition.to, event = kind, "phase changed");
                }
                Some(transition)
            }
            Err(error) => {
                tracing::warn!(%error, event = kind, "ignoring event");
                None
            }
        }
    }

    /// Records that the connection is gone.
    pub fn handle_disconnect(&mut self, now: Instant) -> Transition {
        self.session.connection_lost(now)
    }

    /// Encodes and sends `command`.
    ///
    /// When the connection is not open nothing is sent and a
    /// [`NOT_CONNECTED`] notice is flashed instead.
    ///
    /// # Errors
    /// Encoding failures, and transport failures while sending.
    pub async fn send(&mut self, command: &Command, now: Instant) -> Result<Delivery, GridwordError> {
        let open = self.conn.is_open() && self.session.model().connection == ConnectionStatus::Open;
        if !open {
            tracing::debug!(command = command.name(), "not connected, command dropped");
            self.session.flash_local(NOT_CONNECTED, true, now);
            return Ok(Delivery::NotConnected);
        }

        let text = encode_command(&self.codec, command)?;
        self.conn.send(&text).await?;
        tracing::debug!(command = command.name(), "command sent");
        if let Command::Join { lobby_name, .. } = command {
            self.session.join_requested(lobby_name.clone());
        }
        Ok(Delivery::Sent)
    }

    /// Dispatches a typed line: sends the command it names, or returns the
    /// text to show locally (help, or why the line was refused).
    ///
    /// # Errors
    /// Transport failures while sending.
    pub async fn submit_line(&mut self, line: &str, now: Instant) -> Result<LineOutcome, GridwordError> {
        match parse_line(line) {
            Ok(None) => Ok(LineOutcome::Nothing),
            Ok(Some(Action::Send(command))) => Ok(LineOutcome::Delivered(self.send(&command, now).await?)),
            Ok(Some(Action::Help(text))) => Ok(LineOutcome::Local {
                text,
                is_error: false,
            }),
            Err(error) => {
                tracing::debug!(%error, "rejected console line");
                Ok(LineOutcome::Local {
                    text: error.to_string(),
                    is_error: true,
                })
            }
        }
    }

    /// Drives the client until the connection ends or the front-end asks
    /// to stop.
    ///
    /// Waits on three things at once: inbound frames, front-end intents,
    /// and refresh ticks for the timer label. The ticker only runs while a
    /// phase timer is counting down. A closed intent channel is treated
    /// like [`Intent::Close`].
    ///
    /// # Errors
    /// Returns [`GridwordError::Transport`] when the connection fails
    /// (after showing the disconnect through the presenter). A clean close
    /// by the server returns `Ok(())`.
    pub async fn run<P: Presenter>(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
        presenter: &mut P,
    ) -> Result<(), GridwordError> {
        let mut ticker = RefreshTicker::new(self.refresh.clone());
        tracing::info!(conn_id = %self.conn.id(), "client running");

        if let Some(lobby) = self.auto_join.take() {
            if let Err(error) = self.send(&Command::join(lobby), now()).await {
                return Err(self.fail(error, presenter));
            }
        }
        self.render(presenter);

        loop {
            self.sync_ticker(&mut ticker, now());
            tokio::select! {
                frame = self.conn.recv() => match frame {
                    Ok(Some(text)) => {
                        self.handle_frame(&text, now());
                        self.render(presenter);
                    }
                    Ok(None) => {
                        tracing::info!("server closed the connection");
                        self.handle_disconnect(now());
                        self.render(presenter);
                        return Ok(());
                    }
                    Err(error) => return Err(self.fail(error.into(), presenter)),
                },
                intent = intents.recv() => match intent {
                    Some(Intent::Line(line)) => {
                        match self.submit_line(&line, now()).await {
                            Ok(LineOutcome::Local { text, is_error }) => presenter.report(&text, is_error),
                            Ok(_) => {}
                            Err(error) => return Err(self.fail(error, presenter)),
                        }
                        self.render(presenter);
                    }
                    Some(Intent::Command(command)) => {
                        if let Err(error) = self.send(&command, now()).await {
                            return Err(self.fail(error, presenter));
                        }
                        self.render(presenter);
                    }
                    Some(Intent::Close) | None => {
                        tracing::info!("closing connection");
                        self.conn.close().await?;
                        return Ok(());
                    }
                },
                _ = ticker.wait_for_tick() => presenter.refresh(&self.view(now())),
            }
        }
    }

    fn sync_ticker(&self, ticker: &mut RefreshTicker, now: Instant) {
        let counting = self
            .session
            .model()
            .lobby
            .as_ref()
            .is_some_and(|lobby| lobby.time_remaining(now) > Duration::ZERO);
        if counting {
            ticker.resume();
        } else {
            ticker.pause();
        }
    }

    /// Shows a fatal error as a disconnect and hands it back.
    fn fail<P: Presenter>(&mut self, error: GridwordError, presenter: &mut P) -> GridwordError {
        tracing::warn!(%error, "connection failed");
        self.handle_disconnect(now());
        self.render(presenter);
        error
    }

    fn render<P: Presenter>(&self, presenter: &mut P) {
        presenter.render(self.session.model(), &self.view(now()));
    }
}

/// The current instant on Tokio's clock, so paused-time tests see the
/// same time as the ticker.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}
