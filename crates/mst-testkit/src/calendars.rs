use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mst_calendar::{CalendarError, CalendarSnapshot, CalendarSource};

/// Calendar that replays a fixed list of answers, one per query.
///
/// Once the script is exhausted the last answer repeats. Every query is
/// counted and its `as_of` recorded, so tests can assert "no query happened".
pub struct ScriptedCalendar {
    responses: Vec<Result<CalendarSnapshot, CalendarError>>,
    delay: Option<Duration>,
    queries: AtomicUsize,
    seen: Mutex<Vec<DateTime<Utc>>>,
}

impl ScriptedCalendar {
    pub fn new(responses: Vec<Result<CalendarSnapshot, CalendarError>>) -> Self {
        Self {
            responses,
            delay: None,
            queries: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `snapshot`.
    pub fn always(snapshot: CalendarSnapshot) -> Self {
        Self::new(vec![Ok(snapshot)])
    }

    /// Always fails with `err`.
    pub fn failing(err: CalendarError) -> Self {
        Self::new(vec![Err(err)])
    }

    /// Sleep (tokio time) before answering each query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// `as_of` values received, in call order.
    pub fn seen_as_of(&self) -> Vec<DateTime<Utc>> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CalendarSource for ScriptedCalendar {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn query_market_calendar(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        let n = self.queries.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(as_of);
        }
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match self.responses.get(n).or_else(|| self.responses.last()) {
            Some(r) => r.clone(),
            None => Err(CalendarError::Transport(
                "scripted calendar has no responses".to_string(),
            )),
        }
    }
}

/// Calendar whose queries never complete. Only a caller-side timeout ends them.
#[derive(Default)]
pub struct HangingCalendar {
    queries: AtomicUsize,
}

impl HangingCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarSource for HangingCalendar {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn query_market_calendar(
        &self,
        _as_of: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
