//! mst-timer
//!
//! Market session timer engine.
//!
//! - [`SessionTimer::get_current_session`]: one calendar query, normalized to
//!   the exchange zone, never fails.
//! - [`render_status_block`]: pure formatting of a [`MarketSession`].
//! - [`run_live_timer`]: cancellable once-per-tick stream of rendered blocks.
//!
//! The calendar itself is a collaborator (`mst_calendar::CalendarSource`);
//! wall-clock reads go through `mst_calendar::Clock`.

mod engine;
mod live;
mod normalize;
mod render;
mod types;

pub use engine::{SessionTimer, TimerSettings, DEFAULT_QUERY_TIMEOUT, MAX_BOUNDARY_QUERIES};
pub use live::{run_live_timer, TimerRunState, DEFAULT_TICK_INTERVAL};
pub use normalize::{normalize_snapshot, resolve_exchange_zone, NormalizedSnapshot, TimezoneError};
pub use render::{render_status_block, STATUS_BLOCK_LINES, STATUS_UNKNOWN};
pub use types::*;
