//! Command handler modules for mst.
//!
//! Shared wiring (config → calendar source → timer) lives here.
//! Command-specific logic lives in the submodules.

pub mod live;
pub mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use mst_calendar::{
    AlpacaClockSource, AlpacaCredentials, CalendarSource, Clock, NyseRulesCalendar, SystemClock,
};
use mst_config::{
    report_unused_keys, resolve_calendar_secrets, CalendarSourceKind, TimerConfig,
    UnusedKeyPolicy,
};
use mst_timer::{SessionTimer, TimerSettings};
use serde_json::Value;
use tracing::{debug, warn};

/// Secrets that fail to resolve are either fatal or logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPolicy {
    Require,
    /// The source reports missing credentials per query instead.
    Degrade,
}

pub struct Wiring {
    pub config: TimerConfig,
    pub source: Arc<dyn CalendarSource>,
}

/// Load layered config (or defaults when no paths are given), lint unused
/// keys, and build the configured calendar source.
pub fn wire(config_paths: &[String], secrets: SecretPolicy) -> Result<Wiring> {
    let config_json = load_config_json(config_paths)?;
    let config = TimerConfig::from_json(&config_json)?;

    let report = report_unused_keys(config.calendar_source, &config_json, UnusedKeyPolicy::Warn)?;
    if !report.is_clean() {
        warn!(
            source = %report.source,
            count = report.unused_leaf_pointers.len(),
            unused = ?report.unused_leaf_pointers,
            "CONFIG_UNUSED_KEYS"
        );
    }

    debug!(
        exchange = %config.exchange_name,
        timezone = %config.exchange_timezone,
        source = config.calendar_source.as_str(),
        "config loaded"
    );

    let source: Arc<dyn CalendarSource> = match config.calendar_source {
        CalendarSourceKind::Rules => Arc::new(NyseRulesCalendar::new()),
        CalendarSourceKind::Alpaca => {
            let resolved =
                resolve_calendar_secrets(&config.alpaca_keys_env, config.calendar_source);
            let credentials = match resolved {
                Ok(s) => s
                    .alpaca_pair()
                    .map(|(api_key, api_secret)| AlpacaCredentials {
                        api_key,
                        api_secret,
                    }),
                Err(e) if secrets == SecretPolicy::Degrade => {
                    warn!(error = %e, "alpaca credentials unavailable");
                    None
                }
                Err(e) => return Err(e),
            };
            Arc::new(
                AlpacaClockSource::new_with_base_url(
                    credentials,
                    config.alpaca_base_url.clone(),
                    config.query_timeout,
                )
                .context("build alpaca clock source")?,
            )
        }
    };

    Ok(Wiring { config, source })
}

fn load_config_json(config_paths: &[String]) -> Result<Value> {
    if config_paths.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = mst_config::load_layered_yaml(&path_refs)?;
    Ok(loaded.config_json)
}

pub fn build_timer(wiring: &Wiring, clock: Arc<dyn Clock>) -> SessionTimer {
    let settings = TimerSettings {
        exchange_timezone: wiring.config.exchange_timezone.clone(),
        query_timeout: wiring.config.query_timeout,
    };
    SessionTimer::new(Arc::clone(&wiring.source), clock, settings)
}

/// `--at` pins the clock; its offset doubles as the local offset.
pub fn clock_for(at: Option<&str>) -> Result<Arc<dyn Clock>> {
    match at {
        None => Ok(Arc::new(SystemClock)),
        Some(s) => {
            let dt = DateTime::parse_from_rfc3339(s.trim())
                .with_context(|| format!("invalid --at '{s}': expected RFC 3339"))?;
            Ok(Arc::new(PinnedClock(dt)))
        }
    }
}

struct PinnedClock(DateTime<FixedOffset>);

impl Clock for PinnedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    fn local_offset(&self, _at: DateTime<Utc>) -> FixedOffset {
        *self.0.offset()
    }
}
