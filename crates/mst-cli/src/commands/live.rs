//! `mst live`: one status block per tick until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use futures_util::{pin_mut, StreamExt};
use mst_calendar::SystemClock;
use mst_timer::{run_live_timer, TimerRunState};
use tracing::info;

use super::{build_timer, wire, SecretPolicy};

pub async fn run_live(
    config_paths: Vec<String>,
    tick_ms: Option<u64>,
    max_blocks: Option<usize>,
) -> Result<()> {
    let wiring = wire(&config_paths, SecretPolicy::Degrade)?;
    let tick = match tick_ms {
        Some(0) => bail!("invalid --tick-ms 0: must be > 0"),
        Some(ms) => Duration::from_millis(ms),
        None => wiring.config.tick_interval,
    };
    let timer = build_timer(&wiring, Arc::new(SystemClock));

    let run_state = TimerRunState::new();
    let on_signal = run_state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received; stopping live timer");
            on_signal.cancel();
        }
    });

    let blocks = run_live_timer(timer, tick, run_state).take(max_blocks.unwrap_or(usize::MAX));
    pin_mut!(blocks);

    let mut first = true;
    while let Some(block) = blocks.next().await {
        if !first {
            println!();
        }
        first = false;
        for line in block {
            println!("{line}");
        }
    }
    Ok(())
}
