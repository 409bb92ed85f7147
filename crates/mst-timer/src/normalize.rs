//! Timezone normalization of raw calendar answers.
//!
//! Pure logic: callers pass the capture instant and the caller's local
//! offset. Two outcomes:
//!
//! - Exchange zone resolves and every instant maps → timestamps expressed in
//!   exchange-local time.
//! - Otherwise → timestamps expressed in the caller's local offset and the
//!   zone is flagged [`SessionZone::LocalApprox`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use mst_calendar::{CalendarInstant, CalendarSnapshot};
use thiserror::Error;
use tracing::warn;

use crate::types::SessionZone;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimezoneError {
    #[error("unknown exchange timezone '{0}'")]
    UnknownZone(String),
    /// A floating timestamp falls in a DST gap or overlap.
    #[error("local time {local} is not a single instant in {zone}")]
    Unmappable { local: NaiveDateTime, zone: String },
}

/// Calendar answer with every timestamp in one display zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSnapshot {
    pub zone: SessionZone,
    pub is_open: bool,
    pub next_open: DateTime<FixedOffset>,
    pub next_close: Option<DateTime<FixedOffset>>,
    /// Capture instant in the same zone as the boundaries.
    pub as_of: DateTime<FixedOffset>,
}

pub fn resolve_exchange_zone(name: &str) -> Result<Tz, TimezoneError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| TimezoneError::UnknownZone(name.to_string()))
}

/// Normalize `snapshot` to `zone_name`, falling back to `local` on any
/// timezone failure. Never fails.
pub fn normalize_snapshot(
    zone_name: &str,
    snapshot: &CalendarSnapshot,
    as_of: DateTime<Utc>,
    local: FixedOffset,
) -> NormalizedSnapshot {
    match in_exchange_zone(zone_name, snapshot, as_of) {
        Ok(n) => n,
        Err(e) => {
            warn!(zone = zone_name, error = %e, "exchange timezone unusable; showing local time");
            in_local_zone(zone_name, &e, snapshot, as_of, local)
        }
    }
}

fn in_exchange_zone(
    zone_name: &str,
    snapshot: &CalendarSnapshot,
    as_of: DateTime<Utc>,
) -> Result<NormalizedSnapshot, TimezoneError> {
    let tz = resolve_exchange_zone(zone_name)?;
    let next_open = to_exchange(tz, &snapshot.next_open)?;
    let next_close = snapshot
        .next_close
        .as_ref()
        .map(|i| to_exchange(tz, i))
        .transpose()?;

    Ok(NormalizedSnapshot {
        zone: SessionZone::Exchange(tz),
        is_open: snapshot.is_open,
        next_open,
        next_close,
        as_of: fix(as_of.with_timezone(&tz)),
    })
}

fn in_local_zone(
    zone_name: &str,
    cause: &TimezoneError,
    snapshot: &CalendarSnapshot,
    as_of: DateTime<Utc>,
    local: FixedOffset,
) -> NormalizedSnapshot {
    NormalizedSnapshot {
        zone: SessionZone::LocalApprox {
            requested: zone_name.to_string(),
            reason: cause.to_string(),
        },
        is_open: snapshot.is_open,
        next_open: to_local(local, &snapshot.next_open),
        next_close: snapshot.next_close.as_ref().map(|i| to_local(local, i)),
        as_of: as_of.with_timezone(&local),
    }
}

fn to_exchange(tz: Tz, instant: &CalendarInstant) -> Result<DateTime<FixedOffset>, TimezoneError> {
    match instant {
        CalendarInstant::Zoned(dt) => Ok(fix(dt.with_timezone(&tz))),
        CalendarInstant::Floating(naive) => tz
            .from_local_datetime(naive)
            .single()
            .map(fix)
            .ok_or_else(|| TimezoneError::Unmappable {
                local: *naive,
                zone: tz.name().to_string(),
            }),
    }
}

/// Floating values are read as the caller's own wall clock.
fn to_local(local: FixedOffset, instant: &CalendarInstant) -> DateTime<FixedOffset> {
    match instant {
        CalendarInstant::Zoned(dt) => dt.with_timezone(&local),
        CalendarInstant::Floating(naive) => {
            let utc = *naive - chrono::Duration::seconds(i64::from(local.local_minus_utc()));
            DateTime::from_naive_utc_and_offset(utc, local)
        }
    }
}

fn fix<Z: TimeZone>(dt: DateTime<Z>) -> DateTime<FixedOffset> {
    let offset = dt.offset().fix();
    dt.with_timezone(&offset)
}
