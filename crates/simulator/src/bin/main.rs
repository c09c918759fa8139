//! Barbell session simulator CLI.
//!
//! Simulates a whole group on one platform with random referee decisions
//! and weight changes, then prints the results sheet.
//!
//! # Example
//!
//! ```bash
//! # Simulate a group of 10 athletes
//! barbell-sim --athletes 10
//!
//! # Unreliable consoles, JSON report
//! barbell-sim -a 12 --loss-rate 0.05 --latency-ms 200 --json
//! ```

use barbell_simulation::ConsoleConfig;
use barbell_simulator::{OfficialsConfig, SessionSimulator, SimulatorConfig};
use barbell_types::CompetitionConfig;
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Barbell deterministic session simulator
///
/// Given the same seed, produces identical results every run.
#[derive(Parser, Debug)]
#[command(name = "barbell-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of athletes in the group
    #[arg(short = 'a', long, default_value = "8")]
    athletes: usize,

    /// Random seed for deterministic simulation
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Probability that a referee judges a lift good (0.0-1.0)
    #[arg(long, default_value = "0.7")]
    good_lift_rate: f64,

    /// Probability of a weight change before each attempt (0.0-1.0)
    #[arg(long, default_value = "0.2")]
    weight_change_rate: f64,

    /// Base latency of the officials' consoles in milliseconds
    #[arg(long, default_value = "50")]
    latency_ms: u64,

    /// Fraction of console inputs lost (0.0-1.0)
    #[arg(long, default_value = "0.0")]
    loss_rate: f64,

    /// Masters rules (age-adjusted Sinclair)
    #[arg(long)]
    masters: bool,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,barbell_simulator=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!(
        athletes = args.athletes,
        seed = args.seed,
        good_lift_rate = args.good_lift_rate,
        weight_change_rate = args.weight_change_rate,
        latency_ms = args.latency_ms,
        loss_rate = args.loss_rate,
        "Starting simulation"
    );

    let consoles = ConsoleConfig {
        latency: Duration::from_millis(args.latency_ms),
        loss_rate: args.loss_rate.clamp(0.0, 1.0),
        ..ConsoleConfig::default()
    };
    let officials = OfficialsConfig::default()
        .with_good_lift_rate(args.good_lift_rate)
        .with_weight_change_rate(args.weight_change_rate);
    let competition = if args.masters {
        CompetitionConfig::masters()
    } else {
        CompetitionConfig::default()
    };
    let config = SimulatorConfig::new(args.athletes)
        .with_seed(args.seed)
        .with_officials(officials)
        .with_consoles(consoles)
        .with_competition(competition);

    let report = match SessionSimulator::new(config).and_then(SessionSimulator::run) {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Simulation failed");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "Failed to encode report");
                return ExitCode::FAILURE;
            }
        }
    } else {
        report.print_summary();
    }
    ExitCode::SUCCESS
}
