//! Transient notices shown in place of the status line.

use std::time::{Duration, Instant};

use gridword_protocol::Notice;

/// A notice and the moment it was shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashNotice {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// The most recent notice, visible for a fixed duration.
///
/// Showing a new notice replaces the old one and restarts the timer.
#[derive(Debug, Clone)]
pub struct Flash {
    latest: Option<FlashNotice>,
    duration: Duration,
}

impl Flash {
    /// Creates an empty flash whose notices last `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            latest: None,
            duration,
        }
    }

    /// Shows `notice` from `now` on.
    pub fn show(&mut self, notice: Notice, now: Instant) {
        self.latest = Some(FlashNotice {
            text: notice.text,
            is_error: notice.is_error,
            shown_at: now,
        });
    }

    /// The notice still visible at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<&FlashNotice> {
        self.latest
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.shown_at) < self.duration)
    }

    /// The last notice shown, visible or not.
    pub fn latest(&self) -> Option<&FlashNotice> {
        self.latest.as_ref()
    }
}
