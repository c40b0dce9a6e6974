//! hkgi game server
//!
//! Loads the saved steads, ticks them on a fixed interval, snapshots them to
//! disk periodically and on shutdown, and answers JSON-lines requests on
//! stdin/stdout. Logs go to stderr.
//!
//! Usage:
//!   cargo run -p hkgi-server
//!   cargo run -p hkgi-server -- --config hkgi.toml --tick-ms 250
//!   RUST_LOG=hkgi_core=debug cargo run -p hkgi-server

mod config;
mod requests;
mod snapshots;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use hkgi_core::persistence::load_from_path;
use hkgi_core::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::snapshots::Snapshotter;

#[derive(Debug, Parser)]
#[command(name = "hkgi-server", version, about = "Idle farming game server")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Save file, overrides `save_path`
    #[arg(long)]
    save: Option<PathBuf>,
    /// Manifest JSON, overrides the bundled one
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Tick period in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(save) = args.save {
        config.save_path = save;
    }
    if let Some(manifest) = args.manifest {
        config.manifest_path = Some(manifest);
    }
    if let Some(tick_ms) = args.tick_ms {
        config.engine.tick_ms = tick_ms;
    }
    config.engine.validate().context("invalid engine config")?;

    let manifest = match &config.manifest_path {
        Some(path) => Manifest::from_path(path)
            .with_context(|| format!("loading manifest {}", path.display()))?,
        None => Manifest::bundled().context("bundled manifest")?,
    };

    let engine = match load_from_path(&config.save_path)
        .with_context(|| format!("loading save {}", config.save_path.display()))?
    {
        Some(data) => Engine::from_save(config.engine.clone(), manifest, data)?,
        None => {
            info!(path = %config.save_path.display(), "no save found, starting fresh");
            Engine::new(config.engine.clone(), manifest)?
        }
    };
    let engine = Arc::new(engine);
    info!(
        users = engine.user_count(),
        tick_ms = config.engine.tick_ms,
        snapshot_ms = config.snapshot_interval_ms,
        "hkgi server started"
    );

    let ticker = tokio::spawn(run_ticks(
        Arc::clone(&engine),
        Duration::from_millis(config.engine.tick_ms),
    ));
    let snapshotter = Snapshotter::new(Arc::clone(&engine), config.save_path.clone());
    let snapshots = tokio::spawn(
        snapshotter
            .clone()
            .run(Duration::from_millis(config.snapshot_interval_ms)),
    );
    let requests = tokio::spawn(serve_requests(Arc::clone(&engine)));

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    info!("shutting down");

    requests.abort();
    snapshots.abort();
    ticker.abort();
    // Waits for a periodic write the abort left running.
    snapshotter.write().await.context("final snapshot task")?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Fixed-period tick. A slow tick delays the next one; none are skipped.
async fn run_ticks(engine: Arc<Engine>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut rng = StdRng::from_entropy();
    loop {
        interval.tick().await;
        let report = engine.tick(&mut rng);
        if report.yields > 0 || report.bag_drops > 0 || report.effects_expired > 0 {
            debug!(
                steads = report.steads,
                yields = report.yields,
                bag_drops = report.bag_drops,
                effects_expired = report.effects_expired,
                "tick"
            );
        }
    }
}

async fn serve_requests(engine: Arc<Engine>) {
    if let Err(e) = request_loop(&engine).await {
        warn!(error = %e, "request channel closed");
    }
}

async fn request_loop(engine: &Engine) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut rng = StdRng::from_entropy();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = requests::handle_line(engine, &line, &mut rng);
        let mut out = serde_json::to_vec(&response)?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }
    info!("stdin closed, no more requests");
    Ok(())
}
