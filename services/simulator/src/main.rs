//! Pair scenario simulator
//!
//! Usage:
//!   pairswap-sim --config config/pair.toml --scenario config/bootstrap.toml
//!   pairswap-sim --config config/pair.toml --scenario config/bootstrap.toml --fail-fast

use anyhow::Result;
use clap::Parser;
use pairswap_config::PairSettings;
use pairswap_sim::{Scenario, Simulation};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pairswap-sim")]
#[command(about = "Replay a scenario against an in-memory constant-product pair")]
#[command(version)]
struct Args {
    /// Pair settings file
    #[arg(short, long)]
    config: PathBuf,

    /// Scenario file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Log level, overriding the settings file (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Stop at the first failing step
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = PairSettings::load(&args.config)?;
    init_logging(&args, &settings);

    info!("Starting pairswap simulator");
    info!("Configuration: {:?}", args.config);

    let scenario = Scenario::from_file(&args.scenario).map_err(|e| {
        error!("Failed to load scenario: {:#}", e);
        e
    })?;
    info!(
        "Loaded scenario {} with {} steps",
        scenario.name.as_deref().unwrap_or("<unnamed>"),
        scenario.steps.len()
    );

    let simulation = Simulation::from_settings(&settings)?;
    let report = simulation.run(&scenario, args.fail_fast)?;

    let failed = report.steps.iter().filter(|step| !step.ok).count();
    info!(
        steps = report.steps.len(),
        failed,
        events = report.events.len(),
        "Scenario finished"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_logging(args: &Args, settings: &PairSettings) {
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("pairswap_ledger={level},pairswap_sim={level},warn").into());

    // Logs go to stderr so stdout carries only the report
    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs || settings.logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
