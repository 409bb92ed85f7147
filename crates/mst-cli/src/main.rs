use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mst")]
#[command(about = "Market session timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one status block and exit
    Status {
        /// Layered config paths in merge order (later overrides earlier)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Evaluate at this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },

    /// Print a status block every tick until Ctrl-C
    Live {
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Tick interval in milliseconds (overrides timer.tick_interval_ms)
        #[arg(long = "tick-ms")]
        tick_ms: Option<u64>,

        /// Exit after this many blocks
        #[arg(long = "max-blocks")]
        max_blocks: Option<usize>,
    },

    /// Print the raw calendar answer from the configured source
    Calendar {
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Query as of this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> overlay...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience). Silent if absent.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Status { config_paths, at } => {
            commands::status::run_status(config_paths, at).await?;
        }
        Commands::Live {
            config_paths,
            tick_ms,
            max_blocks,
        } => {
            commands::live::run_live(config_paths, tick_ms, max_blocks).await?;
        }
        Commands::Calendar { config_paths, at } => {
            commands::status::run_calendar(config_paths, at).await?;
        }
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = mst_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only status output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}
