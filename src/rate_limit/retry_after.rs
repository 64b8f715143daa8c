//! Retry-After header parsing.
//!
//! The header has two legal forms: a delay in whole seconds, or an HTTP-date.
//! Parsing never fails: anything unreadable degrades to the supplied default
//! so a malformed throttling hint can't take down the dispatch loop.

use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;

/// Parses a Retry-After header value into a wait duration.
///
/// - An integer value is taken as seconds directly.
/// - Otherwise the value is parsed as an HTTP-date (RFC 2822); the wait is
///   `date - now`, clamped to zero if the date is in the past.
/// - A missing or unparseable value yields `default`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use request_manager::parse_retry_after;
///
/// let default = Duration::from_secs(60);
/// assert_eq!(parse_retry_after(Some("120"), default), Duration::from_secs(120));
/// assert_eq!(parse_retry_after(None, default), default);
/// assert_eq!(parse_retry_after(Some("not a date"), default), default);
/// ```
pub fn parse_retry_after(value: Option<&str>, default: Duration) -> Duration {
    let Some(raw) = value else {
        return default;
    };
    let raw = raw.trim();

    if let Ok(seconds) = raw.parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
        let delta = date.with_timezone(&Utc) - Utc::now();
        // A date in the past means "go now", never a negative wait.
        return delta.to_std().unwrap_or(Duration::ZERO);
    }

    debug!("unparseable Retry-After value {:?}, using default", raw);
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const DEFAULT: Duration = Duration::from_secs(60);

    #[test]
    fn test_integer_seconds() {
        assert_eq!(
            parse_retry_after(Some("120"), DEFAULT),
            Duration::from_secs(120)
        );
        assert_eq!(parse_retry_after(Some("0"), DEFAULT), Duration::ZERO);
        assert_eq!(
            parse_retry_after(Some("  5 "), DEFAULT),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_future_http_date() {
        let future = (Utc::now() + TimeDelta::seconds(90)).to_rfc2822();
        let wait = parse_retry_after(Some(&future), DEFAULT);
        // Allow a little slack for clock movement between format and parse.
        assert!(wait > Duration::from_secs(85), "wait was {:?}", wait);
        assert!(wait <= Duration::from_secs(90), "wait was {:?}", wait);
    }

    #[test]
    fn test_past_http_date_clamps_to_zero() {
        let past = (Utc::now() - TimeDelta::seconds(3600)).to_rfc2822();
        assert_eq!(parse_retry_after(Some(&past), DEFAULT), Duration::ZERO);
    }

    #[test]
    fn test_unparseable_falls_back_to_default() {
        assert_eq!(parse_retry_after(Some("soon"), DEFAULT), DEFAULT);
        assert_eq!(parse_retry_after(Some(""), DEFAULT), DEFAULT);
        assert_eq!(parse_retry_after(Some("-5"), DEFAULT), DEFAULT);
    }

    #[test]
    fn test_absent_value_uses_default() {
        assert_eq!(parse_retry_after(None, DEFAULT), DEFAULT);
    }
}
