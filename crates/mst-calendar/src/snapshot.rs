//! Raw calendar answers, exactly as a source reported them.
//!
//! Timestamps are **not** normalized here. A source may report an instant
//! with an explicit UTC offset ([`CalendarInstant::Zoned`]) or a bare local
//! wall-clock value with no zone data at all ([`CalendarInstant::Floating`]).
//! Deciding which zone a floating value belongs to is the timer engine's job.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::source::CalendarError;

/// Naive formats accepted for floating instants, tried in order.
const FLOATING_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// One session boundary as reported by a calendar source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarInstant {
    /// Timestamp carrying an explicit UTC offset.
    Zoned(DateTime<FixedOffset>),
    /// Local wall-clock timestamp with no zone information.
    Floating(NaiveDateTime),
}

impl CalendarInstant {
    /// Parse a provider timestamp string.
    ///
    /// RFC 3339 (with offset) yields `Zoned`; an ISO-like value without an
    /// offset yields `Floating`. Anything else is a decode error.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(CalendarInstant::Zoned(dt));
        }
        for fmt in FLOATING_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Ok(CalendarInstant::Floating(naive));
            }
        }
        Err(CalendarError::Decode(format!("unparseable timestamp '{raw}'")))
    }

    /// The zoned value, if the source supplied an offset.
    pub fn zoned(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            CalendarInstant::Zoned(dt) => Some(*dt),
            CalendarInstant::Floating(_) => None,
        }
    }
}

impl fmt::Display for CalendarInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarInstant::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            CalendarInstant::Floating(n) => write!(f, "{} (no zone)", n.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Answer to a single `query_market_calendar` call.
///
/// `next_close` is optional because some sources omit it while the market is
/// closed. When `is_open` is true the engine requires it to be present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSnapshot {
    pub is_open: bool,
    pub next_open: CalendarInstant,
    pub next_close: Option<CalendarInstant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset_is_zoned() {
        let i = CalendarInstant::parse("2025-08-14T09:30:00-04:00").unwrap();
        let dt = i.zoned().unwrap();
        assert_eq!(dt.offset().local_minus_utc(), -4 * 3600);
        assert_eq!(dt.to_rfc3339(), "2025-08-14T09:30:00-04:00");
    }

    #[test]
    fn fractional_seconds_with_offset_are_zoned() {
        let i = CalendarInstant::parse("2025-08-13T20:12:45.123456789-04:00").unwrap();
        assert!(i.zoned().is_some());
    }

    #[test]
    fn missing_offset_is_floating() {
        let i = CalendarInstant::parse("2025-08-14T09:30:00").unwrap();
        assert!(matches!(i, CalendarInstant::Floating(_)));
        assert!(i.zoned().is_none());

        let spaced = CalendarInstant::parse("2025-08-14 09:30:00").unwrap();
        assert_eq!(i, spaced);
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = CalendarInstant::parse("tomorrow-ish").unwrap_err();
        assert!(matches!(err, CalendarError::Decode(_)));
    }

    #[test]
    fn display_marks_floating_values() {
        let i = CalendarInstant::parse("2025-08-14T09:30:00").unwrap();
        assert_eq!(i.to_string(), "2025-08-14T09:30:00 (no zone)");
    }
}
