//! Typed view over the merged config JSON.
//!
//! Absent keys take defaults. Present keys with the wrong type or an
//! out-of-range value fail with `CONFIG_INVALID`, naming the JSON pointer.
//!
//! The exchange timezone is NOT validated here: an unknown zone is a runtime
//! display fallback (local time, flagged approximate), not a load error.

use std::time::Duration;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_EXCHANGE_NAME: &str = "NYSE";
pub const DEFAULT_EXCHANGE_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_ALPACA_BASE_URL: &str = "https://paper-api.alpaca.markets";
pub const DEFAULT_ALPACA_API_KEY_ENV: &str = "ALPACA_API_KEY_PAPER";
pub const DEFAULT_ALPACA_API_SECRET_ENV: &str = "ALPACA_API_SECRET_PAPER";

const QUERY_TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarSourceKind {
    /// Offline NYSE session rules.
    Rules,
    /// Brokerage `/v2/clock` endpoint.
    Alpaca,
}

impl CalendarSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarSourceKind::Rules => "rules",
            CalendarSourceKind::Alpaca => "alpaca",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Some(CalendarSourceKind::Rules),
            "alpaca" => Some(CalendarSourceKind::Alpaca),
            _ => None,
        }
    }
}

/// Env var NAMES holding the Alpaca credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlpacaKeysEnv {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    pub exchange_name: String,
    pub exchange_timezone: String,
    pub calendar_source: CalendarSourceKind,
    pub query_timeout: Duration,
    pub alpaca_base_url: String,
    pub alpaca_keys_env: AlpacaKeysEnv,
    pub tick_interval: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            exchange_name: DEFAULT_EXCHANGE_NAME.to_string(),
            exchange_timezone: DEFAULT_EXCHANGE_TIMEZONE.to_string(),
            calendar_source: CalendarSourceKind::Rules,
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            alpaca_base_url: DEFAULT_ALPACA_BASE_URL.to_string(),
            alpaca_keys_env: AlpacaKeysEnv {
                api_key: DEFAULT_ALPACA_API_KEY_ENV.to_string(),
                api_secret: DEFAULT_ALPACA_API_SECRET_ENV.to_string(),
            },
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl TimerConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let d = Self::default();

        let calendar_source = match opt_str(config_json, "/calendar/source")? {
            None => d.calendar_source,
            Some(s) => match CalendarSourceKind::parse(&s) {
                Some(k) => k,
                None => bail!(
                    "CONFIG_INVALID leaf=/calendar/source: unknown source '{}'; \
                     expected one of: rules | alpaca",
                    s
                ),
            },
        };

        let query_timeout_secs = opt_u64(config_json, "/calendar/query_timeout_secs")?
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);
        if !QUERY_TIMEOUT_RANGE_SECS.contains(&query_timeout_secs) {
            bail!(
                "CONFIG_INVALID leaf=/calendar/query_timeout_secs: {} outside {}..={}",
                query_timeout_secs,
                QUERY_TIMEOUT_RANGE_SECS.start(),
                QUERY_TIMEOUT_RANGE_SECS.end()
            );
        }

        let tick_interval_ms =
            opt_u64(config_json, "/timer/tick_interval_ms")?.unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        if tick_interval_ms == 0 {
            bail!("CONFIG_INVALID leaf=/timer/tick_interval_ms: must be > 0");
        }

        Ok(Self {
            exchange_name: opt_str(config_json, "/exchange/name")?.unwrap_or(d.exchange_name),
            exchange_timezone: opt_str(config_json, "/exchange/timezone")?
                .unwrap_or(d.exchange_timezone),
            calendar_source,
            query_timeout: Duration::from_secs(query_timeout_secs),
            alpaca_base_url: opt_str(config_json, "/calendar/alpaca/base_url")?
                .unwrap_or(d.alpaca_base_url),
            alpaca_keys_env: AlpacaKeysEnv {
                api_key: opt_str(config_json, "/calendar/alpaca/keys_env/api_key")?
                    .unwrap_or(d.alpaca_keys_env.api_key),
                api_secret: opt_str(config_json, "/calendar/alpaca/keys_env/api_secret")?
                    .unwrap_or(d.alpaca_keys_env.api_secret),
            },
            tick_interval: Duration::from_millis(tick_interval_ms),
        })
    }
}

/// Absent or null → `None`; blank strings count as absent.
fn opt_str(v: &Value, pointer: &str) -> Result<Option<String>> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => bail!("CONFIG_INVALID leaf={}: expected string, got {}", pointer, other),
    }
}

fn opt_u64(v: &Value, pointer: &str) -> Result<Option<u64>> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(n) => match n.as_u64() {
            Some(x) => Ok(Some(x)),
            None => bail!(
                "CONFIG_INVALID leaf={}: expected non-negative integer, got {}",
                pointer,
                n
            ),
        },
    }
}
