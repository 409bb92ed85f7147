//! Live mode: a cancellable, tick-driven stream of status blocks.
//!
//! The loop is cooperative and single-task:
//!
//! tick → check [`TimerRunState`] → query → render → yield → repeat
//!
//! Ticks come from one `tokio::time::interval` started on first poll, so a
//! slow calendar answer does not push later ticks back. If a query overruns
//! a whole tick, the next tick is delayed rather than fired in a burst.
//!
//! Cancellation is observed once per tick, right after it fires. A cancel
//! that lands while a calendar query is in flight lets that one block through;
//! the next wake-up ends the stream without touching the calendar again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::debug;

use crate::engine::SessionTimer;
use crate::render::render_status_block;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Run flag for one live loop. Clones share the flag, so a signal handler
/// can hold one handle while the loop holds another. Independent loops get
/// independent states.
#[derive(Debug, Clone)]
pub struct TimerRunState {
    running: Arc<AtomicBool>,
}

impl Default for TimerRunState {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRunState {
    /// Starts in the running state.
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_running()
    }
}

/// Lazy, unbounded stream of rendered status blocks; ends only on cancel.
///
/// The returned stream is `!Unpin`; pin it (`futures_util::pin_mut!` or
/// `Box::pin`) before polling.
pub fn run_live_timer(
    timer: SessionTimer,
    tick_interval: Duration,
    run_state: TimerRunState,
) -> impl Stream<Item = Vec<String>> + Send {
    let init: Option<Interval> = None;
    stream::unfold(
        (timer, run_state, init),
        move |(timer, run_state, ticker)| async move {
            let mut ticker = ticker.unwrap_or_else(|| start_ticker(tick_interval));
            ticker.tick().await;
            if run_state.is_cancelled() {
                debug!(source = timer.source_name(), "live timer cancelled");
                return None;
            }
            let session = timer.get_current_session().await;
            let block = render_status_block(&session);
            Some((block, (timer, run_state, Some(ticker))))
        },
    )
}

/// First tick one interval from now; `interval` alone would fire immediately.
/// A zero interval is raised to 1ms.
fn start_ticker(tick_interval: Duration) -> Interval {
    let tick_interval = tick_interval.max(MIN_TICK_INTERVAL);
    let start = tokio::time::Instant::now() + tick_interval;
    let mut ticker = tokio::time::interval_at(start, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_clones_share_the_flag() {
        let a = TimerRunState::new();
        let b = a.clone();
        assert!(b.is_running());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn independent_states_do_not_interfere() {
        let a = TimerRunState::new();
        let b = TimerRunState::new();
        a.cancel();
        assert!(b.is_running());
    }
}
