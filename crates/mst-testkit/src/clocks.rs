use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Utc};
use mst_calendar::Clock;

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut g) = self.now.lock() {
            *g = now;
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        if let Ok(mut g) = self.now.lock() {
            *g += by;
        }
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(g) => *g,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn local_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}

/// Clock anchored at `base` that advances with tokio's clock.
///
/// Under `tokio::time::pause()` this gives deterministic wall-clock readings
/// that move exactly as far as the runtime's sleeps.
pub struct TokioClock {
    base: DateTime<Utc>,
    started: tokio::time::Instant,
    offset: FixedOffset,
}

impl TokioClock {
    /// Must be called inside a tokio runtime.
    pub fn new(base: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            base,
            started: tokio::time::Instant::now(),
            offset,
        }
    }
}

impl Clock for TokioClock {
    fn now_utc(&self) -> DateTime<Utc> {
        let elapsed = self.started.elapsed();
        let elapsed = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        self.base + elapsed
    }

    fn local_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }
}
