//! Calendar failures never escape the engine.
//!
//! A failed, hung, or incomplete calendar answer yields an UNKNOWN session
//! whose countdown line is the `status unknown` sentinel: no digits, no
//! invented boundary.

use std::sync::Arc;
use std::time::Duration;

use mst_calendar::{CalendarError, CalendarInstant, CalendarSnapshot};
use mst_testkit::{fixtures, HangingCalendar, ScriptedCalendar};
use mst_timer::*;

fn assert_unknown_block(lines: &[String]) {
    assert_eq!(lines.len(), STATUS_BLOCK_LINES);
    assert_eq!(lines[0], "Market: UNKNOWN (unable to determine market status)");
    assert_eq!(lines[2], "Next open: unavailable");
    assert_eq!(lines[3], STATUS_UNKNOWN);
    assert!(
        !lines[3].chars().any(|c| c.is_ascii_digit()),
        "countdown line must not contain digits: {:?}",
        lines[3]
    );
}

#[tokio::test(start_paused = true)]
async fn hung_calendar_times_out_to_status_unknown() {
    let f = fixtures::closed_weekday();
    let calendar = Arc::new(HangingCalendar::new());
    let timer = SessionTimer::new(
        calendar.clone(),
        Arc::new(f.clock()),
        TimerSettings::default(),
    );

    let started = tokio::time::Instant::now();
    let session = timer.get_current_session().await;
    assert_eq!(started.elapsed(), DEFAULT_QUERY_TIMEOUT);
    assert_eq!(calendar.query_count(), 1);

    match session.status() {
        SessionStatus::Unknown(why) => {
            assert_eq!(why.source_name, "hanging");
            assert!(why.reason.contains("timed out"), "{}", why.reason);
        }
        other => panic!("expected Unknown, got {other:?}"),
    }
    assert_eq!(session.next_open(), Boundary::Unavailable);
    assert_eq!(session.next_close(), Boundary::Unavailable);
    assert_unknown_block(&render_status_block(&session));
}

#[tokio::test(start_paused = true)]
async fn custom_timeout_is_honored() {
    let f = fixtures::closed_weekday();
    let settings = TimerSettings {
        query_timeout: Duration::from_millis(250),
        ..TimerSettings::default()
    };
    let calendar = Arc::new(f.calendar().with_delay(Duration::from_secs(1)));
    let timer = SessionTimer::new(calendar, Arc::new(f.clock()), settings);

    let started = tokio::time::Instant::now();
    let session = timer.get_current_session().await;
    assert_eq!(started.elapsed(), Duration::from_millis(250));
    assert_eq!(session.is_open(), None);
}

#[tokio::test]
async fn transport_error_is_absorbed() {
    let f = fixtures::closed_weekday();
    let timer = SessionTimer::new(
        Arc::new(ScriptedCalendar::failing(CalendarError::Transport(
            "connection refused".to_string(),
        ))),
        Arc::new(f.clock()),
        TimerSettings::default(),
    );

    let session = timer.get_current_session().await;
    assert_eq!(session.is_open(), None);
    // Current time still reflects the caller's clock.
    let lines = render_status_block(&session);
    assert_eq!(lines[1], "Current time: 2025-08-13 20:12:45 -04:00");
    assert_unknown_block(&lines);
}

#[tokio::test]
async fn open_answer_without_next_close_is_unknown() {
    let f = fixtures::open();
    let snapshot = CalendarSnapshot {
        is_open: true,
        next_open: CalendarInstant::parse("2025-08-14T09:30:00-04:00").unwrap(),
        next_close: None,
    };
    let calendar = Arc::new(ScriptedCalendar::always(snapshot));
    let timer = SessionTimer::new(
        calendar.clone(),
        Arc::new(f.clock()),
        TimerSettings::default(),
    );

    let session = timer.get_current_session().await;
    assert_eq!(calendar.query_count(), 1);
    assert_unknown_block(&render_status_block(&session));
}
