//! Status block formatting.
//!
//! Pure: no IO, no clock reads. The same [`MarketSession`] always renders to
//! the same lines.
//!
//! Every block has exactly [`STATUS_BLOCK_LINES`] lines, in this order:
//!
//! 1. open/closed indicator
//! 2. current time on the caller's clock
//! 3. next boundary label with its timestamp
//! 4. countdown, or [`STATUS_UNKNOWN`] when the calendar was unavailable

use chrono::{DateTime, FixedOffset};

use crate::types::{MarketSession, SessionStatus, TargetKind};

/// Countdown-line sentinel for a session whose calendar lookup failed.
pub const STATUS_UNKNOWN: &str = "status unknown";

pub const STATUS_BLOCK_LINES: usize = 4;

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S %:z";

pub fn render_status_block(session: &MarketSession) -> Vec<String> {
    let indicator = match session.status() {
        SessionStatus::Unknown(_) => {
            "Market: UNKNOWN (unable to determine market status)".to_string()
        }
        status => format!("Market: {}", status.as_str()),
    };

    let current = format!("Current time: {}", stamp(&session.local_now()));

    let (boundary, countdown) = match session.countdown_target() {
        Some((kind, at)) => {
            let (label, verb) = match kind {
                TargetKind::Open => ("Next open", "Opens in"),
                TargetKind::Close => ("Next close", "Closes in"),
            };
            let boundary = format!("{label}: {} {}", stamp(&at), session.zone().label());
            let countdown = match session.countdown() {
                Some(c) if session.is_approximate() => format!("{verb}: {c} (approximate)"),
                Some(c) => format!("{verb}: {c}"),
                // Unreachable for sessions built by from_calendar.
                None => STATUS_UNKNOWN.to_string(),
            };
            (boundary, countdown)
        }
        None => (
            "Next open: unavailable".to_string(),
            STATUS_UNKNOWN.to_string(),
        ),
    };

    vec![indicator, current, boundary, countdown]
}

fn stamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format(TIMESTAMP_FMT).to_string()
}
