//! Offline NYSE session calendar.
//!
//! Deterministic, pure logic. No IO and no wall-clock: the caller passes
//! `as_of`.
//!
//! # Rules
//!
//! - Weekdays only (Monday–Friday).
//! - Regular session 09:30–16:00 America/New_York. DST comes from the tz
//!   database, so the UTC open is 13:30 in summer and 14:30 in winter.
//! - Full-day closures from a hardcoded table for 2023–2027.
//! - 13:00 early closes from a hardcoded table for the same years.
//!
//! Dates outside the table years are treated as regular weekdays, and
//! `snapshot_at` logs a warning when it relies on one.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

use crate::snapshot::{CalendarInstant, CalendarSnapshot};
use crate::source::{CalendarError, CalendarSource};

/// How far ahead to search for the next session. The longest NYSE closure
/// in the table is a four-day weekend; two weeks is generous.
const MAX_LOOKAHEAD_DAYS: u32 = 14;

/// Years the holiday and early-close tables cover.
pub const TABLE_YEARS: RangeInclusive<i32> = 2023..=2027;

/// Full-day NYSE closures (observed dates).
const HOLIDAYS: &[(i32, u32, u32)] = &[
    // ── 2023 ─────────────────────────────────────────────────────────
    (2023, 1, 2),   // New Year's Day (observed Mon)
    (2023, 1, 16),  // MLK Day
    (2023, 2, 20),  // Presidents' Day
    (2023, 4, 7),   // Good Friday
    (2023, 5, 29),  // Memorial Day
    (2023, 6, 19),  // Juneteenth
    (2023, 7, 4),   // Independence Day
    (2023, 9, 4),   // Labor Day
    (2023, 11, 23), // Thanksgiving
    (2023, 12, 25), // Christmas
    // ── 2024 ─────────────────────────────────────────────────────────
    (2024, 1, 1),   // New Year's Day
    (2024, 1, 15),  // MLK Day
    (2024, 2, 19),  // Presidents' Day
    (2024, 3, 29),  // Good Friday
    (2024, 5, 27),  // Memorial Day
    (2024, 6, 19),  // Juneteenth
    (2024, 7, 4),   // Independence Day
    (2024, 9, 2),   // Labor Day
    (2024, 11, 28), // Thanksgiving
    (2024, 12, 25), // Christmas
    // ── 2025 ─────────────────────────────────────────────────────────
    (2025, 1, 1),   // New Year's Day
    (2025, 1, 9),   // National Day of Mourning (President Carter)
    (2025, 1, 20),  // MLK Day
    (2025, 2, 17),  // Presidents' Day
    (2025, 4, 18),  // Good Friday
    (2025, 5, 26),  // Memorial Day
    (2025, 6, 19),  // Juneteenth
    (2025, 7, 4),   // Independence Day
    (2025, 9, 1),   // Labor Day
    (2025, 11, 27), // Thanksgiving
    (2025, 12, 25), // Christmas
    // ── 2026 ─────────────────────────────────────────────────────────
    (2026, 1, 1),   // New Year's Day
    (2026, 1, 19),  // MLK Day
    (2026, 2, 16),  // Presidents' Day
    (2026, 4, 3),   // Good Friday
    (2026, 5, 25),  // Memorial Day
    (2026, 6, 19),  // Juneteenth
    (2026, 7, 3),   // Independence Day (observed; July 4 falls on Saturday)
    (2026, 9, 7),   // Labor Day
    (2026, 11, 26), // Thanksgiving
    (2026, 12, 25), // Christmas
    // ── 2027 ─────────────────────────────────────────────────────────
    (2027, 1, 1),   // New Year's Day
    (2027, 1, 18),  // MLK Day
    (2027, 2, 15),  // Presidents' Day
    (2027, 3, 26),  // Good Friday
    (2027, 5, 31),  // Memorial Day
    (2027, 6, 18),  // Juneteenth (observed; June 19 falls on Saturday)
    (2027, 7, 5),   // Independence Day (observed; July 4 falls on Sunday)
    (2027, 9, 6),   // Labor Day
    (2027, 11, 25), // Thanksgiving
    (2027, 12, 24), // Christmas (observed; December 25 falls on Saturday)
];

/// 13:00 ET early closes.
const EARLY_CLOSES: &[(i32, u32, u32)] = &[
    (2023, 7, 3),
    (2023, 11, 24),
    (2024, 7, 3),
    (2024, 11, 29),
    (2024, 12, 24),
    (2025, 7, 3),
    (2025, 11, 28),
    (2025, 12, 24),
    (2026, 11, 27),
    (2026, 12, 24),
    (2027, 11, 26),
];

/// One regular (or shortened) trading session, as UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub open: DateTime<Utc>,
    pub close: DateTime<Utc>,
}

/// Rules-based NYSE calendar.
#[derive(Debug, Clone, Copy)]
pub struct NyseRulesCalendar {
    tz: Tz,
}

impl Default for NyseRulesCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl NyseRulesCalendar {
    pub fn new() -> Self {
        Self {
            tz: chrono_tz::America::New_York,
        }
    }

    /// Trading session on `date` (exchange-local calendar date), or `None`
    /// for weekends and full-day holidays.
    pub fn session_on(&self, date: NaiveDate) -> Result<Option<Session>, CalendarError> {
        if !is_trading_day(date) {
            return Ok(None);
        }
        let open_t = hms(9, 30);
        let close_t = if is_early_close(date) {
            hms(13, 0)
        } else {
            hms(16, 0)
        };
        Ok(Some(Session {
            open: self.exchange_instant(date, open_t)?,
            close: self.exchange_instant(date, close_t)?,
        }))
    }

    /// Compute the snapshot a live calendar would report at `as_of`.
    pub fn snapshot_at(&self, as_of: DateTime<Utc>) -> Result<CalendarSnapshot, CalendarError> {
        let today = as_of.with_timezone(&self.tz).date_naive();

        let mut current: Option<Session> = None;
        let mut upcoming: Option<Session> = None;

        let mut date = today;
        for _ in 0..=MAX_LOOKAHEAD_DAYS {
            if let Some(s) = self.session_on(date)? {
                if s.open <= as_of && as_of < s.close {
                    current = Some(s);
                } else if s.open > as_of {
                    upcoming = Some(s);
                    break;
                }
            }
            date = date.succ_opt().ok_or_else(|| {
                CalendarError::Config(format!("date overflow after {date}"))
            })?;
        }

        let upcoming = upcoming.ok_or_else(|| CalendarError::Api {
            code: None,
            message: format!("no NYSE session within {MAX_LOOKAHEAD_DAYS} days of {today}"),
        })?;

        let next_close = match current {
            Some(s) => s.close,
            None => upcoming.close,
        };

        let session_day = upcoming.open.with_timezone(&self.tz).date_naive();
        if !is_covered_date(today) || !is_covered_date(session_day) {
            warn!(
                as_of = %as_of,
                next_session = %session_day,
                first_year = TABLE_YEARS.start(),
                last_year = TABLE_YEARS.end(),
                "date outside NYSE holiday table; holidays and early closes ignored"
            );
        }

        Ok(CalendarSnapshot {
            is_open: current.is_some(),
            next_open: self.zoned(upcoming.open),
            next_close: Some(self.zoned(next_close)),
        })
    }

    fn exchange_instant(&self, date: NaiveDate, t: NaiveTime) -> Result<DateTime<Utc>, CalendarError> {
        self.tz
            .from_local_datetime(&date.and_time(t))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                CalendarError::Config(format!("{date} {t} is not a single instant in {}", self.tz))
            })
    }

    /// Express a UTC instant with the exchange's offset at that instant.
    fn zoned(&self, at: DateTime<Utc>) -> CalendarInstant {
        let local = at.with_timezone(&self.tz);
        CalendarInstant::Zoned(local.with_timezone(&local.offset().fix()))
    }
}

#[async_trait::async_trait]
impl CalendarSource for NyseRulesCalendar {
    fn name(&self) -> &'static str {
        "nyse-rules"
    }

    async fn query_market_calendar(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        self.snapshot_at(as_of)
    }
}

// ---------------------------------------------------------------------------
// Day classification
// ---------------------------------------------------------------------------

pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !is_nyse_holiday(date)
}

pub fn is_nyse_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.year(), date.month(), date.day()))
}

/// Whether holiday and early-close data exist for `date`'s year.
pub fn is_covered_date(date: NaiveDate) -> bool {
    TABLE_YEARS.contains(&date.year())
}

pub fn is_early_close(date: NaiveDate) -> bool {
    EARLY_CLOSES.contains(&(date.year(), date.month(), date.day()))
}

fn hms(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

// ---------------------------------------------------------------------------
// Unit tests (fast, no external dependencies)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn et(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        chrono_tz::America::New_York
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekend_is_not_trading() {
        assert!(!is_trading_day(date(2024, 1, 6))); // Sat
        assert!(!is_trading_day(date(2024, 1, 7))); // Sun
        assert!(is_trading_day(date(2024, 1, 8))); // Mon
    }

    #[test]
    fn new_years_day_2024_is_not_trading() {
        assert!(!is_trading_day(date(2024, 1, 1)));
    }

    #[test]
    fn summer_open_is_1330_utc_winter_open_is_1430_utc() {
        let cal = NyseRulesCalendar::new();
        let summer = cal.session_on(date(2025, 8, 14)).unwrap().unwrap();
        assert_eq!(summer.open.to_rfc3339(), "2025-08-14T13:30:00+00:00");
        let winter = cal.session_on(date(2024, 1, 8)).unwrap().unwrap();
        assert_eq!(winter.open.to_rfc3339(), "2024-01-08T14:30:00+00:00");
    }

    #[test]
    fn early_close_is_1300_et() {
        let cal = NyseRulesCalendar::new();
        let s = cal.session_on(date(2025, 11, 28)).unwrap().unwrap();
        assert_eq!(s.close, et(2025, 11, 28, 13, 0, 0));
    }

    #[test]
    fn mid_session_is_open_with_same_day_close() {
        let cal = NyseRulesCalendar::new();
        let snap = cal.snapshot_at(et(2025, 8, 13, 11, 0, 0)).unwrap();
        assert!(snap.is_open);
        let close = snap.next_close.unwrap().zoned().unwrap();
        assert_eq!(close.to_rfc3339(), "2025-08-13T16:00:00-04:00");
        let open = snap.next_open.zoned().unwrap();
        assert_eq!(open.to_rfc3339(), "2025-08-14T09:30:00-04:00");
    }

    #[test]
    fn exactly_at_open_is_open_exactly_at_close_is_closed() {
        let cal = NyseRulesCalendar::new();
        assert!(cal.snapshot_at(et(2025, 8, 13, 9, 30, 0)).unwrap().is_open);
        assert!(!cal.snapshot_at(et(2025, 8, 13, 16, 0, 0)).unwrap().is_open);
    }

    #[test]
    fn pre_market_points_at_same_day_open() {
        let cal = NyseRulesCalendar::new();
        let snap = cal.snapshot_at(et(2025, 8, 13, 7, 0, 0)).unwrap();
        assert!(!snap.is_open);
        assert_eq!(
            snap.next_open.zoned().unwrap().to_rfc3339(),
            "2025-08-13T09:30:00-04:00"
        );
        assert_eq!(
            snap.next_close.unwrap().zoned().unwrap().to_rfc3339(),
            "2025-08-13T16:00:00-04:00"
        );
    }

    /// Run `f` with a subscriber that writes plain-text events into a buffer.
    fn captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        use std::sync::{Arc, Mutex};

        #[derive(Clone)]
        struct Buf(Arc<Mutex<Vec<u8>>>);
        impl std::io::Write for Buf {
            fn write(&mut self, b: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(b);
                Ok(b.len())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buf = Buf(Arc::new(Mutex::new(Vec::new())));
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let text = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        (out, text)
    }

    #[test]
    fn table_years_are_covered() {
        assert!(is_covered_date(date(2023, 1, 3)));
        assert!(is_covered_date(date(2027, 12, 31)));
        assert!(!is_covered_date(date(2022, 12, 30)));
        assert!(!is_covered_date(date(2028, 1, 3)));
    }

    #[test]
    fn out_of_table_date_still_answers_but_warns() {
        let cal = NyseRulesCalendar::new();
        // 2028-07-04 is a Tuesday; no table entry, so it is a regular session.
        let (snap, logs) = captured_logs(|| cal.snapshot_at(et(2028, 7, 4, 11, 0, 0)));
        assert!(snap.unwrap().is_open);
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("outside NYSE holiday table"), "{logs}");
    }

    #[test]
    fn next_session_past_table_end_warns() {
        let cal = NyseRulesCalendar::new();
        // Fri 2027-12-31 after the close; the next session is Mon 2028-01-03.
        let (snap, logs) = captured_logs(|| cal.snapshot_at(et(2027, 12, 31, 17, 0, 0)));
        assert_eq!(
            snap.unwrap().next_open.zoned().unwrap().to_rfc3339(),
            "2028-01-03T09:30:00-05:00"
        );
        assert!(logs.contains("next_session=2028-01-03"), "{logs}");
    }

    #[test]
    fn covered_date_does_not_warn() {
        let cal = NyseRulesCalendar::new();
        let (_, logs) = captured_logs(|| cal.snapshot_at(et(2025, 8, 13, 11, 0, 0)));
        assert!(logs.is_empty(), "{logs}");
    }
}
