//! Named NYSE session scenarios, all in US Eastern time.
//!
//! | name            | as_of (ET)             | target                | countdown  |
//! |-----------------|------------------------|-----------------------|------------|
//! | open            | Wed 2025-08-13 15:59:15 | close 16:00 same day  | `00:00:45` |
//! | closed-weekday  | Wed 2025-08-13 20:12:45 | open Thu 09:30        | `13:17:15` |
//! | closed-weekend  | Sat 2025-08-16 12:00:00 | open Mon 09:30        | `45:30:00` |
//! | closed-holiday  | Thu 2025-07-03 14:00:00 | open Mon 07-07 09:30  | `91:30:00` |
//!
//! The holiday case sits after the 13:00 early close, with Independence Day
//! and a weekend before the next session.

use chrono::{DateTime, FixedOffset, Utc};
use mst_calendar::{CalendarInstant, CalendarSnapshot};

use crate::{ManualClock, ScriptedCalendar};

#[derive(Debug, Clone)]
pub struct Fixture {
    pub name: &'static str,
    pub as_of: DateTime<Utc>,
    /// Caller's local offset; equal to the exchange offset on that date.
    pub local_offset: FixedOffset,
    pub snapshot: CalendarSnapshot,
    pub expected_countdown: &'static str,
}

impl Fixture {
    pub fn calendar(&self) -> ScriptedCalendar {
        ScriptedCalendar::always(self.snapshot.clone())
    }

    pub fn clock(&self) -> ManualClock {
        ManualClock::new(self.as_of, self.local_offset)
    }
}

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("fixture timestamps are RFC 3339 literals")
}

fn utc(s: &str) -> DateTime<Utc> {
    ts(s).with_timezone(&Utc)
}

fn edt() -> FixedOffset {
    *ts("2025-08-13T00:00:00-04:00").offset()
}

fn snapshot(is_open: bool, next_open: &str, next_close: &str) -> CalendarSnapshot {
    CalendarSnapshot {
        is_open,
        next_open: CalendarInstant::Zoned(ts(next_open)),
        next_close: Some(CalendarInstant::Zoned(ts(next_close))),
    }
}

pub fn open() -> Fixture {
    Fixture {
        name: "open",
        as_of: utc("2025-08-13T15:59:15-04:00"),
        local_offset: edt(),
        snapshot: snapshot(true, "2025-08-14T09:30:00-04:00", "2025-08-13T16:00:00-04:00"),
        expected_countdown: "00:00:45",
    }
}

pub fn closed_weekday() -> Fixture {
    Fixture {
        name: "closed-weekday",
        as_of: utc("2025-08-13T20:12:45-04:00"),
        local_offset: edt(),
        snapshot: snapshot(false, "2025-08-14T09:30:00-04:00", "2025-08-14T16:00:00-04:00"),
        expected_countdown: "13:17:15",
    }
}

pub fn closed_weekend() -> Fixture {
    Fixture {
        name: "closed-weekend",
        as_of: utc("2025-08-16T12:00:00-04:00"),
        local_offset: edt(),
        snapshot: snapshot(false, "2025-08-18T09:30:00-04:00", "2025-08-18T16:00:00-04:00"),
        expected_countdown: "45:30:00",
    }
}

pub fn closed_holiday() -> Fixture {
    Fixture {
        name: "closed-holiday",
        as_of: utc("2025-07-03T14:00:00-04:00"),
        local_offset: edt(),
        snapshot: snapshot(false, "2025-07-07T09:30:00-04:00", "2025-07-07T16:00:00-04:00"),
        expected_countdown: "91:30:00",
    }
}

pub fn all() -> Vec<Fixture> {
    vec![open(), closed_weekday(), closed_weekend(), closed_holiday()]
}
