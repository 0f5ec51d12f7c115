use anyhow::Context;
use env_logger::Builder;
use log::{LevelFilter, error, info};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use crate::common::config::{CONFIG_FILE_NAME, HarnessConfig};
use crate::experiment::scenario::load_scenario;
use crate::experiment::{Scenario, reference_sweeps, run_sweep};
use crate::output::{gnuplot, json};
use crate::simulation::energy::LoggingEnergyObserver;
use crate::simulation::wifi::WifiConfig;

mod common;
mod experiment;
mod output;
mod simulation;

fn run() -> anyhow::Result<()> {
    let config = HarnessConfig::load_or_default(Path::new(CONFIG_FILE_NAME)).context("Failed to load configuration")?;

    let scenario = match &config.scenario_file {
        Some(path) => load_scenario(path).with_context(|| format!("Failed to load scenario {}", path.display()))?,
        None => Scenario::reference(),
    };
    let base = WifiConfig {
        channel: config.channel.clone(),
        ..WifiConfig::default()
    };

    let mut observer = LoggingEnergyObserver;
    let mut results = Vec::new();
    for sweep in reference_sweeps() {
        results.push(run_sweep(&sweep, &scenario, &base, config.seed, &mut observer)?);
    }

    if config.stdout {
        let mut out = io::stdout().lock();
        gnuplot::write_script(&results, &mut out).context("Failed to write gnuplot script")?;
        out.flush().context("Failed to flush stdout")?;
    }
    if let Some(dir) = &config.output_dir {
        for result in &results {
            json::export_sweep(result, config.seed, dir)?;
        }
    }

    info!("Finished {} sweeps", results.len());
    Ok(())
}

fn main() -> ExitCode {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("wifi_rate_harness"), LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Starting up");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
