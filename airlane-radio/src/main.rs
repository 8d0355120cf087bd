//! Airlane Radio (airlane-radio) - Main entry point
//!
//! Reconciles station programs with the process supervisor and hands the
//! next annotated track to a station's broadcast engine.

use std::path::PathBuf;
use std::sync::Arc;

use airlane_common::config::{resolve_config_path, RadioConfig, CONFIG_ENV_VAR};
use airlane_common::models::Station;
use airlane_radio::adapters::{StagedConfigRenderer, StationServices};
use airlane_radio::autodj::Annotations;
use airlane_radio::db::SqliteQueueRepository;
use airlane_radio::supervisor::XmlRpcSupervisor;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for airlane-radio
#[derive(Parser, Debug)]
#[command(name = "airlane-radio")]
#[command(about = "Station program control and AutoDJ annotations")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write configuration and make sure every enabled station is running
    Reconcile,

    /// Show supervisor state and log paths per station
    Status,

    /// Print the annotated request for a station's next queued track
    Annotate {
        /// Station short name
        #[arg(short, long)]
        station: String,

        /// Do not mark the entry as sent (manual preview)
        #[arg(long)]
        preview: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = RadioConfig::load(&config_path).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("airlane_radio={0},airlane_common={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config_path.exists() {
        info!("Configuration: {}", config_path.display());
    } else {
        warn!("Config file {} not found, using defaults", config_path.display());
    }

    match args.command {
        Command::Reconcile => reconcile(&config).await,
        Command::Status => status(&config).await,
        Command::Annotate { station, preview } => {
            let station = config
                .station(&station)
                .ok_or_else(|| anyhow!("Unknown station '{}'", station))?;
            annotate(&config, station, !preview).await
        }
    }
}

fn station_services(config: &RadioConfig) -> Result<StationServices> {
    let supervisor = XmlRpcSupervisor::new(&config.supervisor)
        .map_err(|e| anyhow!("Failed to create supervisor client: {}", e))?;

    Ok(StationServices::new(
        config,
        Arc::new(supervisor),
        Arc::new(StagedConfigRenderer),
    ))
}

async fn reconcile(config: &RadioConfig) -> Result<()> {
    let services = station_services(config)?;
    let mut failures = 0;

    for station in config.stations.iter().filter(|s| s.is_enabled) {
        match services.ensure_running(station).await {
            Ok(actions) => {
                for (adapter, action) in actions {
                    info!(
                        station_id = station.id,
                        station_name = %station.name,
                        "{}: {:?}",
                        adapter,
                        action
                    );
                }
            }
            Err(e) => {
                failures += 1;
                error!(station_id = station.id, station_name = %station.name, "Reconcile failed: {}", e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} station(s) failed to reconcile", failures));
    }
    Ok(())
}

async fn status(config: &RadioConfig) -> Result<()> {
    let services = station_services(config)?;

    for station in &config.stations {
        let statuses = services
            .status(station)
            .await
            .with_context(|| format!("Status check failed for {}", station.short_name))?;

        for s in statuses {
            println!(
                "{}\t{}\t{}\t{}",
                station.short_name,
                s.program_name,
                if s.running { "running" } else { "stopped" },
                s.log_path.display()
            );
        }
    }
    Ok(())
}

async fn annotate(config: &RadioConfig, station: &Station, as_autodj: bool) -> Result<()> {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let annotations = Annotations::new(Arc::new(SqliteQueueRepository::new(db)));
    let rendered = annotations
        .annotate_next_song(station, as_autodj)
        .await?
        .ok_or_else(|| anyhow!("No track available for {}", station.short_name))?;
    println!("{}", rendered);
    Ok(())
}
