use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

// ---------------------------------------------------------------------------
// SessionStatus / Unavailable
// ---------------------------------------------------------------------------

/// Why a session could not be determined. Carried inside
/// [`SessionStatus::Unknown`] so the reason travels with the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unavailable {
    /// `CalendarSource::name()` of the source that failed.
    pub source_name: &'static str,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Open,
    Closed,
    /// Calendar lookup failed; boundaries are [`Boundary::Unavailable`].
    Unknown(Unavailable),
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "OPEN",
            SessionStatus::Closed => "CLOSED",
            SessionStatus::Unknown(_) => "UNKNOWN",
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// A session boundary, or an explicit marker that it is not known.
///
/// There is no "default timestamp" for a missing boundary; callers must match
/// on `Unavailable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    At(DateTime<FixedOffset>),
    Unavailable,
}

impl Boundary {
    pub fn at(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Boundary::At(dt) => Some(*dt),
            Boundary::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Boundary::At(_))
    }
}

// ---------------------------------------------------------------------------
// SessionZone
// ---------------------------------------------------------------------------

/// Zone the session's timestamps are expressed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionZone {
    /// Exchange-local time (the normal case).
    Exchange(Tz),
    /// Caller's local clock; used when no calendar answer exists at all.
    Local,
    /// The exchange zone could not be applied, so calendar timestamps were
    /// shown in the caller's local offset instead.
    LocalApprox { requested: String, reason: String },
}

impl SessionZone {
    pub fn label(&self) -> &str {
        match self {
            SessionZone::Exchange(tz) => tz.name(),
            SessionZone::Local => "local time",
            SessionZone::LocalApprox { .. } => "local time (approximate: exchange timezone unavailable)",
        }
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Remaining whole seconds until a session transition.
///
/// Never negative by construction: [`Countdown::between`] returns `None` for a
/// target in the past.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Countdown {
    total_secs: u64,
}

impl Countdown {
    pub fn from_secs(total_secs: u64) -> Self {
        Self { total_secs }
    }

    /// Whole seconds from `from` to `to`; `None` if `to` is earlier.
    pub fn between<A: TimeZone, B: TimeZone>(from: &DateTime<A>, to: &DateTime<B>) -> Option<Self> {
        let delta = to.timestamp() - from.timestamp();
        u64::try_from(delta).ok().map(Self::from_secs)
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    /// Unbounded; multi-day gaps exceed 24.
    pub fn hours(&self) -> u64 {
        self.total_secs / 3600
    }

    pub fn minutes(&self) -> u8 {
        ((self.total_secs % 3600) / 60) as u8
    }

    pub fn seconds(&self) -> u8 {
        (self.total_secs % 60) as u8
    }
}

/// `HH:MM:SS`; hours widen past two digits when needed.
impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

// ---------------------------------------------------------------------------
// MarketSession
// ---------------------------------------------------------------------------

/// Invariant breaches detected while building a [`MarketSession`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The boundary the countdown targets is not strictly after `as_of`.
    /// Usually a boundary crossed between the query and the check.
    #[error("{field} {at} is not after as_of {as_of}")]
    BoundaryNotAfterAsOf {
        field: &'static str,
        at: DateTime<FixedOffset>,
        as_of: DateTime<FixedOffset>,
    },
    #[error("calendar reports open market without next_close")]
    MissingNextClose,
}

/// Which transition the countdown is running toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Open,
    Close,
}

/// One immutable answer to "what is the market doing right now".
///
/// Built fresh per query; never mutated or persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSession {
    status: SessionStatus,
    next_open: Boundary,
    next_close: Boundary,
    as_of: DateTime<FixedOffset>,
    local_now: DateTime<FixedOffset>,
    zone: SessionZone,
}

impl MarketSession {
    /// Build a session from a normalized calendar answer.
    ///
    /// Enforces:
    /// - open ⇒ `next_close` present and strictly after `as_of`
    /// - closed ⇒ `next_open` strictly after `as_of`
    pub fn from_calendar(
        is_open: bool,
        next_open: DateTime<FixedOffset>,
        next_close: Option<DateTime<FixedOffset>>,
        as_of: DateTime<FixedOffset>,
        local_now: DateTime<FixedOffset>,
        zone: SessionZone,
    ) -> Result<Self, InvariantViolation> {
        if is_open {
            let close = next_close.ok_or(InvariantViolation::MissingNextClose)?;
            if close <= as_of {
                return Err(InvariantViolation::BoundaryNotAfterAsOf {
                    field: "next_close",
                    at: close,
                    as_of,
                });
            }
        } else if next_open <= as_of {
            return Err(InvariantViolation::BoundaryNotAfterAsOf {
                field: "next_open",
                at: next_open,
                as_of,
            });
        }

        Ok(Self {
            status: if is_open {
                SessionStatus::Open
            } else {
                SessionStatus::Closed
            },
            next_open: Boundary::At(next_open),
            next_close: next_close.map_or(Boundary::Unavailable, Boundary::At),
            as_of,
            local_now,
            zone,
        })
    }

    /// Degraded session: status unknown, both boundaries unavailable, `as_of`
    /// taken from the caller's local clock.
    pub fn unavailable(local_now: DateTime<FixedOffset>, why: Unavailable) -> Self {
        Self {
            status: SessionStatus::Unknown(why),
            next_open: Boundary::Unavailable,
            next_close: Boundary::Unavailable,
            as_of: local_now,
            local_now,
            zone: SessionZone::Local,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// `None` when the status is unknown.
    pub fn is_open(&self) -> Option<bool> {
        match self.status {
            SessionStatus::Open => Some(true),
            SessionStatus::Closed => Some(false),
            SessionStatus::Unknown(_) => None,
        }
    }

    pub fn next_open(&self) -> Boundary {
        self.next_open
    }

    pub fn next_close(&self) -> Boundary {
        self.next_close
    }

    pub fn as_of(&self) -> DateTime<FixedOffset> {
        self.as_of
    }

    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.local_now
    }

    pub fn zone(&self) -> &SessionZone {
        &self.zone
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self.zone, SessionZone::LocalApprox { .. })
    }

    /// Open sessions count down to `next_close`, closed ones to `next_open`.
    pub fn countdown_target(&self) -> Option<(TargetKind, DateTime<FixedOffset>)> {
        match self.status {
            SessionStatus::Open => self.next_close.at().map(|at| (TargetKind::Close, at)),
            SessionStatus::Closed => self.next_open.at().map(|at| (TargetKind::Open, at)),
            SessionStatus::Unknown(_) => None,
        }
    }

    pub fn countdown(&self) -> Option<Countdown> {
        self.countdown_target()
            .and_then(|(_, at)| Countdown::between(&self.as_of, &at))
    }
}
