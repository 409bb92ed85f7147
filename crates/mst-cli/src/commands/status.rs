//! One-shot commands: `mst status` and `mst calendar`.

use anyhow::Result;
use mst_calendar::{CalendarError, CalendarSource, Clock};
use mst_timer::render_status_block;

use super::{build_timer, clock_for, wire, SecretPolicy};

pub async fn run_status(config_paths: Vec<String>, at: Option<String>) -> Result<()> {
    let wiring = wire(&config_paths, SecretPolicy::Degrade)?;
    let timer = build_timer(&wiring, clock_for(at.as_deref())?);

    let session = timer.get_current_session().await;
    for line in render_status_block(&session) {
        println!("{line}");
    }
    Ok(())
}

/// Diagnostics: the source's answer before any normalization. Errors here
/// are returned, not degraded.
pub async fn run_calendar(config_paths: Vec<String>, at: Option<String>) -> Result<()> {
    let wiring = wire(&config_paths, SecretPolicy::Require)?;
    let as_of = clock_for(at.as_deref())?.now_utc();

    let fut = wiring.source.query_market_calendar(as_of);
    let snapshot = match tokio::time::timeout(wiring.config.query_timeout, fut).await {
        Ok(r) => r?,
        Err(_) => return Err(CalendarError::Timeout(wiring.config.query_timeout).into()),
    };

    println!("exchange={}", wiring.config.exchange_name);
    println!("source={}", wiring.source.name());
    println!("as_of={}", as_of.to_rfc3339());
    println!("is_open={}", snapshot.is_open);
    println!("next_open={}", snapshot.next_open);
    match &snapshot.next_close {
        Some(close) => println!("next_close={close}"),
        None => println!("next_close=none"),
    }
    Ok(())
}
