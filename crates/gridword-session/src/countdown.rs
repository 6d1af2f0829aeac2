//! The round deadline and its `M:SS` label.
//!
//! The server reports time left as a number of seconds; the client turns
//! that into an absolute [`Instant`] once, on receipt, and from then on only
//! compares it with the clock. That keeps the label monotone between
//! updates no matter how often it is redrawn.

use std::time::{Duration, Instant};

/// Converts a server-reported `seconds_remaining` into a deadline.
///
/// Negative, NaN or absurdly large values are clamped, so a misbehaving
/// server can shorten the timer to zero but never panic the client.
pub fn deadline_after(now: Instant, seconds_remaining: f64) -> Instant {
    let remaining = if seconds_remaining.is_finite() && seconds_remaining > 0.0 {
        Duration::try_from_secs_f64(seconds_remaining).unwrap_or(Duration::ZERO)
    } else {
        Duration::ZERO
    };
    now.checked_add(remaining).unwrap_or(now)
}

/// Formats the time left until `deadline` as `M:SS`, rounded up to whole
/// seconds.
///
/// Returns `"0:00"` when there is no deadline or it has passed.
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use gridword_session::format_time_remaining;
///
/// let now = Instant::now();
/// let deadline = now + Duration::from_millis(61_200);
/// assert_eq!(format_time_remaining(Some(deadline), now), "1:02");
/// assert_eq!(format_time_remaining(None, now), "0:00");
/// ```
pub fn format_time_remaining(deadline: Option<Instant>, now: Instant) -> String {
    let remaining = deadline
        .map(|deadline| deadline.saturating_duration_since(now))
        .unwrap_or(Duration::ZERO);

    let mut seconds = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        seconds += 1;
    }
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rounds_up() {
        let now = Instant::now();
        let label = |ms| format_time_remaining(Some(now + Duration::from_millis(ms)), now);
        assert_eq!(label(1), "0:01");
        assert_eq!(label(1_000), "0:01");
        assert_eq!(label(1_001), "0:02");
        assert_eq!(label(59_999), "1:00");
        assert_eq!(label(180_000), "3:00");
    }

    #[test]
    fn test_label_zero_without_or_after_deadline() {
        let now = Instant::now();
        assert_eq!(format_time_remaining(None, now), "0:00");
        assert_eq!(format_time_remaining(Some(now), now), "0:00");
        let later = now + Duration::from_secs(10);
        assert_eq!(format_time_remaining(Some(now), later), "0:00");
    }

    #[test]
    fn test_label_never_increases_as_time_passes() {
        let start = Instant::now();
        let deadline = Some(start + Duration::from_secs(75));
        let mut previous = u64::MAX;
        for step in 0..200 {
            let now = start + Duration::from_millis(step * 400);
            let label = format_time_remaining(deadline, now);
            let (m, s) = label.split_once(':').unwrap();
            let total = m.parse::<u64>().unwrap() * 60 + s.parse::<u64>().unwrap();
            assert!(total <= previous, "{label} after {previous}s");
            previous = total;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_deadline_after_clamps_bad_input() {
        let now = Instant::now();
        assert_eq!(deadline_after(now, -3.0), now);
        assert_eq!(deadline_after(now, f64::NAN), now);
        assert_eq!(deadline_after(now, 1.5), now + Duration::from_millis(1_500));
    }
}
