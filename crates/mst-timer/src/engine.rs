//! Session timer engine.
//!
//! One calendar query per call, bounded by a timeout. Every collaborator
//! failure is absorbed here and downgraded to a degraded [`MarketSession`];
//! nothing escapes `get_current_session`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use mst_calendar::{CalendarError, CalendarSnapshot, CalendarSource, Clock, SystemClock, NYSE_TIMEZONE};
use tracing::{debug, warn};

use crate::normalize::normalize_snapshot;
use crate::types::{InvariantViolation, MarketSession, Unavailable};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(8);

/// Queries allowed per call when the calendar keeps reporting a boundary at
/// or before `as_of`.
pub const MAX_BOUNDARY_QUERIES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    /// IANA zone name of the exchange (e.g. `America/New_York`).
    pub exchange_timezone: String,
    /// Upper bound on one calendar query; exceeding it counts as unavailable.
    pub query_timeout: Duration,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            exchange_timezone: NYSE_TIMEZONE.to_string(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

/// Stateless between calls; cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct SessionTimer {
    source: Arc<dyn CalendarSource>,
    clock: Arc<dyn Clock>,
    settings: TimerSettings,
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("source", &self.source.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl SessionTimer {
    pub fn new(
        source: Arc<dyn CalendarSource>,
        clock: Arc<dyn Clock>,
        settings: TimerSettings,
    ) -> Self {
        Self {
            source,
            clock,
            settings,
        }
    }

    pub fn with_system_clock(source: Arc<dyn CalendarSource>, settings: TimerSettings) -> Self {
        Self::new(source, Arc::new(SystemClock), settings)
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Current session, normalized to the exchange zone.
    ///
    /// Failure modes, all absorbed:
    /// - query error or timeout → status unknown, boundaries unavailable
    /// - open answer without `next_close` → status unknown
    /// - exchange zone unusable → local-time boundaries flagged approximate
    /// - boundary at/before `as_of` → re-query (up to [`MAX_BOUNDARY_QUERIES`]),
    ///   then status unknown
    pub async fn get_current_session(&self) -> MarketSession {
        let mut last_violation: Option<InvariantViolation> = None;

        for attempt in 1..=MAX_BOUNDARY_QUERIES {
            let as_of = self.clock.now_utc();
            let local = self.clock.local_offset(as_of);

            let snapshot = match self.query(as_of).await {
                Ok(s) => s,
                Err(e) => return self.unavailable(as_of, local, e.to_string()),
            };

            let n = normalize_snapshot(&self.settings.exchange_timezone, &snapshot, as_of, local);
            match MarketSession::from_calendar(
                n.is_open,
                n.next_open,
                n.next_close,
                n.as_of,
                as_of.with_timezone(&local),
                n.zone,
            ) {
                Ok(session) => return session,
                Err(v @ InvariantViolation::BoundaryNotAfterAsOf { .. }) => {
                    debug!(attempt, violation = %v, "session boundary crossed; re-querying");
                    last_violation = Some(v);
                }
                Err(v) => return self.unavailable(as_of, local, v.to_string()),
            }
        }

        let as_of = self.clock.now_utc();
        let local = self.clock.local_offset(as_of);
        let detail = last_violation.map(|v| v.to_string()).unwrap_or_default();
        self.unavailable(
            as_of,
            local,
            format!("calendar boundary stale after {MAX_BOUNDARY_QUERIES} queries: {detail}"),
        )
    }

    async fn query(&self, as_of: DateTime<Utc>) -> Result<CalendarSnapshot, CalendarError> {
        debug!(
            source = self.source.name(),
            as_of = %as_of.to_rfc3339(),
            "calendar query"
        );
        let fut = self.source.query_market_calendar(as_of);
        match tokio::time::timeout(self.settings.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CalendarError::Timeout(self.settings.query_timeout)),
        }
    }

    fn unavailable(&self, as_of: DateTime<Utc>, local: FixedOffset, reason: String) -> MarketSession {
        warn!(
            source = self.source.name(),
            reason = %reason,
            "calendar unavailable; market status unknown"
        );
        MarketSession::unavailable(
            as_of.with_timezone(&local),
            Unavailable {
                source_name: self.source.name(),
                reason,
            },
        )
    }
}
