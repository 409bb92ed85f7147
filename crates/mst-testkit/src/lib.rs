//! Test doubles for the session timer.
//!
//! - Calendar sources with scripted answers ([`ScriptedCalendar`]) or no
//!   answer at all ([`HangingCalendar`]).
//! - Clocks pinned by hand ([`ManualClock`]) or driven by tokio's paused
//!   time ([`TokioClock`]).
//! - Named NYSE scenarios ([`fixtures`]) with their expected countdowns.
//!
//! No network I/O and no wall-clock reads anywhere in this crate.

mod calendars;
mod clocks;
pub mod fixtures;

pub use calendars::{HangingCalendar, ScriptedCalendar};
pub use clocks::{ManualClock, TokioClock};
pub use fixtures::Fixture;
