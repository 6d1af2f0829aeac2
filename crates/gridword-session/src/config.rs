//! Session configuration.

use std::time::Duration;

/// How long a flash notice stays visible by default.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_secs(5);

/// Configuration for a [`Session`](crate::Session).
///
/// Sensible defaults are provided; override just the fields you care
/// about with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a notice stays in the status line before it reverts.
    ///
    /// Default: 5 seconds.
    pub flash_duration: Duration,

    /// Status line text shown outside of any lobby.
    ///
    /// Default: `"Gridword"`.
    pub title: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flash_duration: DEFAULT_FLASH_DURATION,
            title: "Gridword".into(),
        }
    }
}

impl SessionConfig {
    /// Sets how long notices stay visible.
    pub fn with_flash_duration(mut self, duration: Duration) -> Self {
        self.flash_duration = duration;
        self
    }

    /// Sets the idle status line text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.flash_duration, Duration::from_secs(5));
        assert_eq!(config.title, "Gridword");
    }

    #[test]
    fn test_session_config_builders() {
        let config = SessionConfig::default()
            .with_flash_duration(Duration::from_millis(250))
            .with_title("Words!");
        assert_eq!(config.flash_duration, Duration::from_millis(250));
        assert_eq!(config.title, "Words!");
    }
}
