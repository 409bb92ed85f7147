//! mst-calendar
//!
//! Market calendar boundary for the session timer.
//!
//! This crate owns the snapshot types a calendar source returns, the
//! [`CalendarSource`] trait the timer engine depends on, the [`Clock`] seam
//! for wall-clock reads, and two concrete sources:
//!
//! - [`NyseRulesCalendar`]: offline NYSE session rules (weekends, holidays,
//!   early closes, real DST). Needs no credentials.
//! - [`AlpacaClockSource`]: thin HTTP client for a brokerage `/v2/clock`
//!   endpoint.
//!
//! It does **not** compute countdowns or render anything; that is mst-timer.

pub mod alpaca;
pub mod clock;
pub mod nyse;
pub mod snapshot;
pub mod source;

pub use alpaca::{AlpacaClockSource, AlpacaCredentials};
pub use clock::{Clock, SystemClock};
pub use nyse::NyseRulesCalendar;
pub use snapshot::{CalendarInstant, CalendarSnapshot};
pub use source::{CalendarError, CalendarSource};

/// Canonical IANA zone of the NYSE; default exchange timezone everywhere.
pub const NYSE_TIMEZONE: &str = "America/New_York";
