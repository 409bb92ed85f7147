//! Calendar source boundary.
//!
//! This module defines **only** the source trait and its error type.
//! Concrete sources live in `nyse` and `alpaca`; test fixtures live in
//! mst-testkit.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::snapshot::CalendarSnapshot;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`CalendarSource`] implementation may return.
///
/// `Clone` so fixtures can replay the same failure on every query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Network or transport failure.
    #[error("transport error: {0}")]
    Transport(String),
    /// The query did not complete within the allowed time.
    #[error("calendar query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// The upstream API returned an application-level error.
    #[error("provider api error{}: {message}", code_suffix(.code))]
    Api { code: Option<u16>, message: String },
    /// A response payload could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
    /// A required configuration value (e.g. credentials) is missing or invalid.
    #[error("config error: {0}")]
    Config(String),
}

fn code_suffix(code: &Option<u16>) -> String {
    match code {
        Some(c) => format!(" code={c}"),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Source trait
// ---------------------------------------------------------------------------

/// Upstream market-calendar contract.
///
/// Object safe so the engine can hold an `Arc<dyn CalendarSource>`, and
/// `Send + Sync` so one source can back several live loops at once.
#[async_trait::async_trait]
pub trait CalendarSource: Send + Sync {
    /// Short identifier used in logs and diagnostics (e.g. `"nyse-rules"`).
    fn name(&self) -> &'static str;

    /// Report open/closed status and the next session boundaries as seen at
    /// `as_of`. One read-only query; implementations must not cache across
    /// calls.
    async fn query_market_calendar(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
