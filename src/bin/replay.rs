use std::io::{Write, stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use racelink::{LinkConfig, RaceLink, SessionEvent};

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// One human-readable line per record
    Text,
    /// One JSON object per event
    Json,
}

/// Decode a raw capture of the live-data notify stream.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Capture file of raw notification bytes
    input: PathBuf,

    /// YAML link configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Print only records with positive speed
    #[arg(long)]
    moving: bool,

    /// Include resync diagnostics in the output
    #[arg(long)]
    diagnostics: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("RACELINK_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => LinkConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => LinkConfig::default(),
    };

    let connection = RaceLink::replay_with(&cli.input, &config)
        .await
        .with_context(|| format!("opening {}", cli.input.display()))?;

    let mut events = connection.events();
    let mut out = stdout().lock();
    while let Some(event) = events.next().await {
        match &event {
            SessionEvent::Record(record) if cli.moving && !record.is_moving() => continue,
            SessionEvent::Diagnostic(_) if !cli.diagnostics => continue,
            _ => {}
        }
        match cli.format {
            Format::Json => serde_json::to_writer(&mut out, &event)?,
            Format::Text => match &event {
                SessionEvent::Record(r) => write!(
                    out,
                    "{} {:>7.1} mph {:>11.6} {:>11.6} alt {:>7.1} m hdg {:>5.1} {:<7} g {:+.2} {:+.2} {:+.2}",
                    r.utc_time,
                    r.speed_mph,
                    r.latitude,
                    r.longitude,
                    r.altitude_wgs,
                    r.heading,
                    r.fix_description(),
                    r.accel.x,
                    r.accel.y,
                    r.accel.z,
                )?,
                SessionEvent::Diagnostic(d) => write!(out, "# {d}")?,
            },
        }
        writeln!(out)?;
    }

    let stats = connection.stats();
    info!(
        records = stats.records,
        diagnostics = stats.diagnostics,
        bytes = stats.bytes_received,
        discarded = stats.bytes_discarded,
        "Replay finished"
    );
    Ok(())
}
