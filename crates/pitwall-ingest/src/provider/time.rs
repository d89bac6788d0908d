//! Timestamp parsing at the provider boundary
//!
//! Two upstream timestamp shapes are normalized to elapsed seconds since
//! session start: elapsed-duration strings ("0 days 00:12:00.500000", the
//! original timing feed format) and RFC3339 wall-clock instants that need a
//! session-start reference to become relative.

use chrono::{DateTime, Utc};

/// Parse an elapsed-duration string into fractional seconds.
///
/// Accepts "[N days ]H:MM:SS[.fraction]" and plain "MM:SS[.fraction]".
/// Returns None for anything else; callers drop those rows.
pub fn parse_elapsed(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let (days, rest) = match s.split_once("days") {
        Some((d, rest)) => {
            let days: f64 = d.trim().parse().ok()?;
            (days, rest.trim())
        }
        None => (0.0, s),
    };

    let parts: Vec<&str> = rest.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, sec] => (h.trim().parse::<f64>().ok()?, m.parse::<f64>().ok()?, sec.parse::<f64>().ok()?),
        [m, sec] => (0.0, m.trim().parse::<f64>().ok()?, sec.parse::<f64>().ok()?),
        _ => return None,
    };

    if !(0.0..60.0).contains(&minutes) || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    Some(days * 86_400.0 + hours * 3_600.0 + minutes * 60.0 + seconds)
}

/// Parse an RFC3339 wall-clock string.
pub fn parse_wall_clock(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Elapsed seconds between a session-start reference and a wall-clock instant.
pub fn elapsed_since(start: DateTime<Utc>, instant: DateTime<Utc>) -> f64 {
    (instant - start).num_milliseconds() as f64 / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_elapsed_full_form() {
        assert_eq!(parse_elapsed("0 days 00:12:00.500000"), Some(720.5));
        assert_eq!(parse_elapsed("1 days 01:00:00"), Some(90_000.0));
    }

    #[test]
    fn test_parse_elapsed_short_forms() {
        assert_eq!(parse_elapsed("00:01:12.345"), Some(72.345));
        assert_eq!(parse_elapsed("01:12.345"), Some(72.345));
    }

    #[test]
    fn test_parse_elapsed_rejects_garbage() {
        assert_eq!(parse_elapsed(""), None);
        assert_eq!(parse_elapsed("noon"), None);
        assert_eq!(parse_elapsed("12"), None);
        assert_eq!(parse_elapsed("00:99:00"), None);
    }

    #[test]
    fn test_elapsed_since() {
        let start = Utc.with_ymd_and_hms(2024, 3, 2, 15, 0, 0).unwrap();
        let instant = Utc.with_ymd_and_hms(2024, 3, 2, 15, 30, 15).unwrap();
        assert_eq!(elapsed_since(start, instant), 1_815.0);
    }

    #[test]
    fn test_parse_wall_clock() {
        let parsed = parse_wall_clock("2024-03-02T15:00:00+03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap());
        assert!(parse_wall_clock("yesterday").is_none());
    }
}
