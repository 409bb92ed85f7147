//! Alpaca market clock adapter.
//!
//! Thin client for `GET {base_url}/v2/clock`. The brokerage owns the
//! calendar; this adapter only transports and decodes its answer.
//!
//! Credentials are passed in by the caller (resolved once via mst-config);
//! they are never logged and `Debug` output redacts them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::snapshot::{CalendarInstant, CalendarSnapshot};
use crate::source::{CalendarError, CalendarSource};

pub const ALPACA_PAPER_BASE_URL: &str = "https://paper-api.alpaca.markets";

/// API key pair for the clock endpoint. **Redacted in `Debug` output.**
#[derive(Clone)]
pub struct AlpacaCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for AlpacaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaCredentials")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AlpacaClockSource {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<AlpacaCredentials>,
    timeout: Duration,
}

impl AlpacaClockSource {
    pub fn new(
        credentials: Option<AlpacaCredentials>,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        Self::new_with_base_url(credentials, ALPACA_PAPER_BASE_URL.to_string(), timeout)
    }

    pub fn new_with_base_url(
        credentials: Option<AlpacaCredentials>,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CalendarError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            base_url,
            credentials,
            timeout,
        })
    }

    fn build_clock_url(&self) -> String {
        format!("{}/v2/clock", self.base_url.trim_end_matches('/'))
    }

    fn map_send_error(&self, e: reqwest::Error) -> CalendarError {
        if e.is_timeout() {
            CalendarError::Timeout(self.timeout)
        } else {
            CalendarError::Transport(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl CalendarSource for AlpacaClockSource {
    fn name(&self) -> &'static str {
        "alpaca-clock"
    }

    async fn query_market_calendar(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<CalendarSnapshot, CalendarError> {
        // The clock endpoint always answers for "now"; as_of is only logged.
        let creds = self.credentials.as_ref().ok_or_else(|| {
            CalendarError::Config("alpaca credentials are not configured".to_string())
        })?;

        debug!(as_of = %as_of.to_rfc3339(), "alpaca clock query");

        let resp = self
            .http
            .get(self.build_clock_url())
            .header("APCA-API-KEY-ID", &creds.api_key)
            .header("APCA-API-SECRET-KEY", &creds.api_secret)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AlpacaErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(CalendarError::Api {
                code: Some(status.as_u16()),
                message,
            });
        }

        let clock: AlpacaClockBody = serde_json::from_str(&body)
            .map_err(|e| CalendarError::Decode(format!("alpaca clock json decode failed: {e}")))?;

        Ok(CalendarSnapshot {
            is_open: clock.is_open,
            next_open: CalendarInstant::parse(&clock.next_open)?,
            next_close: clock
                .next_close
                .as_deref()
                .map(CalendarInstant::parse)
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AlpacaClockBody {
    is_open: bool,
    next_open: String,
    next_close: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AlpacaErrorBody {
    message: Option<String>,
}
