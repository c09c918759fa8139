//! Field-of-play runner for one competition platform.
//!
//! Reads officials' commands from stdin, one per line, and prints every UI
//! event as a JSON line on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Run with a roster and load a group at startup
//! fop-runner --roster roster.json --group M73-A
//!
//! # Start with a configuration file
//! fop-runner --config platform.toml
//! ```
//!
//! Commands: `start`, `stop`, `timeover`, `down`, `vote <1-3> good|bad`,
//! `decide good|bad`, `force <secs>`, `reset`, `break <type> [minutes]`,
//! `pause`, `lift`, `group <name>|none`, `weight <athlete> <kg>`.

use anyhow::{bail, Context, Result};
use barbell_core::Origin;
use barbell_production::{
    init_telemetry, parse_command, ConsoleCommand, FopRunner, JsonFileStore, LoggedSound,
    RunnerConfig, TelemetryConfig, UiBus,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

/// Barbell field-of-play runner
#[derive(Parser, Debug)]
#[command(name = "fop-runner")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON roster with groups and athletes (overrides config)
    #[arg(long, env = "BARBELL_ROSTER")]
    roster: Option<PathBuf>,

    /// Group to load at startup (overrides config)
    #[arg(long)]
    group: Option<String>,

    /// Name echoed as the origin of commands typed on stdin
    #[arg(long, default_value = "console")]
    console: String,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info,barbell=debug")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the UI events
    init_telemetry(&TelemetryConfig {
        ansi: false,
        ..TelemetryConfig::default().with_default_filter(&cli.log_level)
    })
    .context("Failed to initialize logging")?;

    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => RunnerConfig::default(),
    };
    if let Some(roster) = &cli.roster {
        config.platform.roster = Some(roster.clone());
    }
    if let Some(group) = &cli.group {
        config.platform.group = Some(group.clone());
    }

    let Some(roster) = config.platform.roster.clone() else {
        bail!("No roster given: use --roster or [platform] roster in the config file");
    };
    let store = Arc::new(
        JsonFileStore::open(&roster)
            .with_context(|| format!("Failed to open roster {}", roster.display()))?,
    );

    let platform = config.platform_index();
    let ui_bus = UiBus::new(config.platform.ui_bus_capacity);
    let mut builder = FopRunner::builder()
        .platform(platform)
        .config(config.fop_config())
        .store(store)
        .ui_bus(ui_bus.clone())
        .sound(Arc::new(LoggedSound::new(platform)))
        .channel_capacity(config.platform.channel_capacity);
    if let Some(group) = config.startup_group() {
        builder = builder.group(group);
    }
    let mut runner = builder.build().context("Failed to create runner")?;
    let handle = runner.handle();
    let shutdown_handle = runner.shutdown_handle();

    // UI events -> stdout
    let mut ui_rx = ui_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match ui_rx.recv().await {
                Ok(message) => match serde_json::to_string(&message) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!(error = %e, "Failed to encode UI event"),
                },
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "UI output lagging");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // stdin -> field of play
    let origin = Origin::named(&cli.console);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            let sent = match parse_command(&line, origin.clone()) {
                Ok(ConsoleCommand::Event(event)) => handle.submit(event).await,
                Ok(ConsoleCommand::ChangeWeight { athlete, weight }) => {
                    handle.change_weight(athlete, weight, origin.clone()).await
                }
                Err(e) => {
                    warn!(error = %e, "Ignoring command");
                    continue;
                }
            };
            if let Err(e) = sent {
                warn!(error = %e, "Runner no longer accepts commands");
                break;
            }
        }
        info!("Console input closed");
    });

    // Ctrl+C / SIGTERM -> graceful shutdown
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C"),
            _ = terminate => info!("Received SIGTERM"),
        }

        if let Some(handle) = shutdown_handle {
            info!("Initiating graceful shutdown...");
            handle.shutdown();
        }
    });

    info!(
        platform = %platform,
        group = config.platform.group.as_deref().unwrap_or("-"),
        "Field of play started, press Ctrl+C to stop"
    );

    if let Err(e) = runner.run().await {
        bail!("Runner error: {}", e);
    }

    info!("Field of play shutdown complete");
    Ok(())
}
