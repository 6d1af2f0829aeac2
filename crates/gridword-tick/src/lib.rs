//! Display refresh ticker for Gridword.
//!
//! The round timer is shown as an `M:SS` label that has to be redrawn a few
//! times a second. [`RefreshTicker`] produces those redraw moments. It owns
//! no game state: the session keeps an absolute deadline and the label is
//! recomputed from the clock on every tick, so a late or missed tick only
//! delays a redraw, it never skews the countdown.
//!
//! # Disabled mode
//!
//! When the interval is zero, [`RefreshTicker::wait_for_tick`] pends forever.
//! Front-ends that redraw on their own schedule use this.
//!
//! # Missed ticks
//!
//! A redraw only needs the clock as it is now, so ticks missed while the
//! loop was busy are dropped rather than fired back to back. The next tick
//! is scheduled one interval after the late one.
//!
//! # Integration
//!
//! The ticker sits inside the client's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         frame = connection.recv() => { /* apply to the session */ }
//!         _ = ticker.wait_for_tick() => presenter.refresh(&view),
//!     }
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default redraw interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(200);

/// Configuration for the refresh ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between redraws. Zero disables the ticker.
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl RefreshConfig {
    /// A config that never ticks.
    pub fn disabled() -> Self {
        Self {
            interval: Duration::ZERO,
        }
    }

    /// Sets the redraw interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// One redraw moment, returned by [`RefreshTicker::wait_for_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTick {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// How far past its scheduled time this tick fired.
    pub late_by: Duration,
    /// Ticks dropped before this one because the loop was busy.
    pub skipped: u64,
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

/// Free-running, pausable redraw ticker.
#[derive(Debug)]
pub struct RefreshTicker {
    config: RefreshConfig,
    tick_count: u64,
    /// When the next tick is due. `None` while disabled.
    next_tick: Option<Instant>,
    paused: bool,
}

impl RefreshTicker {
    /// Creates a ticker whose first tick is one interval from now.
    pub fn new(config: RefreshConfig) -> Self {
        let next_tick = (!config.interval.is_zero()).then(|| Instant::now() + config.interval);

        if next_tick.is_none() {
            debug!("refresh ticker disabled");
        } else {
            debug!(interval_ms = config.interval.as_millis() as u64, "refresh ticker created");
        }

        Self {
            config,
            tick_count: 0,
            next_tick,
            paused: false,
        }
    }

    /// Waits until the next redraw is due.
    ///
    /// Pends forever while disabled or paused; `tokio::select!` still
    /// drives the other branches. Cancel-safe: dropping the future before
    /// it resolves loses nothing.
    pub async fn wait_for_tick(&mut self) -> RefreshTick {
        let next = match self.next_tick {
            Some(next) if !self.paused => next,
            _ => return std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let interval = self.config.interval;
        let late_by = now.saturating_duration_since(next);
        let skipped = (late_by.as_nanos() / interval.as_nanos()) as u64;
        self.tick_count += 1;
        self.next_tick = Some(now + interval);

        if skipped > 0 {
            debug!(tick = self.tick_count, skipped, "refresh ticks skipped");
        }
        trace!(tick = self.tick_count, "refresh tick");

        RefreshTick {
            tick: self.tick_count,
            late_by,
            skipped,
        }
    }

    /// Stops ticking until [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(tick = self.tick_count, "refresh ticker paused");
        }
    }

    /// Resumes ticking one interval from now, without a burst for the time
    /// spent paused.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            if self.next_tick.is_some() {
                self.next_tick = Some(Instant::now() + self.config.interval);
            }
            debug!(tick = self.tick_count, "refresh ticker resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the ticker never fires (zero interval).
    pub fn is_disabled(&self) -> bool {
        self.next_tick.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}
