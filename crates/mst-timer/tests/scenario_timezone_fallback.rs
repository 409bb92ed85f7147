//! Unusable exchange timezone: the countdown survives, shown in the caller's
//! local time and labelled approximate. Distinct from a calendar failure.

use std::sync::Arc;

use chrono::NaiveDate;
use mst_calendar::{CalendarInstant, CalendarSnapshot};
use mst_testkit::{fixtures, ScriptedCalendar};
use mst_timer::*;

#[tokio::test]
async fn unknown_exchange_zone_renders_local_approximate() {
    let f = fixtures::closed_weekday();
    let settings = TimerSettings {
        exchange_timezone: "Not/AZone".to_string(),
        ..TimerSettings::default()
    };
    let timer = SessionTimer::new(Arc::new(f.calendar()), Arc::new(f.clock()), settings);

    let session = timer.get_current_session().await;
    assert!(session.is_approximate());
    assert_eq!(session.is_open(), Some(false));
    assert_eq!(
        render_status_block(&session),
        vec![
            "Market: CLOSED",
            "Current time: 2025-08-13 20:12:45 -04:00",
            "Next open: 2025-08-14 09:30:00 -04:00 local time (approximate: exchange timezone unavailable)",
            "Opens in: 13:17:15 (approximate)",
        ]
    );
}

#[tokio::test]
async fn floating_boundaries_are_read_as_exchange_local() {
    let f = fixtures::closed_weekday();
    let naive = |d: u32, h: u32, m: u32| {
        CalendarInstant::Floating(
            NaiveDate::from_ymd_opt(2025, 8, d)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
        )
    };
    let snapshot = CalendarSnapshot {
        is_open: false,
        next_open: naive(14, 9, 30),
        next_close: Some(naive(14, 16, 0)),
    };
    let timer = SessionTimer::new(
        Arc::new(ScriptedCalendar::always(snapshot)),
        Arc::new(f.clock()),
        TimerSettings::default(),
    );

    let session = timer.get_current_session().await;
    assert!(!session.is_approximate());
    assert_eq!(render_status_block(&session)[3], "Opens in: 13:17:15");
}
