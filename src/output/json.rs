//! JSON export of finished sweeps.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::error::HarnessError;
use crate::experiment::{Dataset, SweepResult};

#[derive(Debug, Serialize)]
struct SweepExport<'a> {
    generated_at: DateTime<Utc>,
    seed: u64,
    title: &'a str,
    output_name: &'a str,
    datasets: &'a [Dataset],
}

/// File name of a sweep's export: the plot name with a `.json` extension.
pub fn export_file_name(result: &SweepResult) -> String {
    let stem = Path::new(&result.output_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(result.title.as_str());
    format!("{}.json", stem)
}

/// Render one sweep as pretty-printed JSON.
pub fn to_json(result: &SweepResult, seed: u64, generated_at: DateTime<Utc>) -> Result<String, HarnessError> {
    let export = SweepExport {
        generated_at,
        seed,
        title: &result.title,
        output_name: &result.output_name,
        datasets: &result.datasets,
    };
    serde_json::to_string_pretty(&export).map_err(|e| HarnessError::OutputError(e.to_string()))
}

/// Write one sweep into `dir`, creating the directory if needed.
pub fn export_sweep(result: &SweepResult, seed: u64, dir: &Path) -> Result<PathBuf, HarnessError> {
    let json = to_json(result, seed, Utc::now())?;
    let path = dir.join(export_file_name(result));

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
        .and_then(|_| fs::write(&path, json).with_context(|| format!("Failed to write file: {}", path.display())))
        .map_err(|e| HarnessError::OutputError(format!("{:#}", e)))?;

    log::info!("Exported '{}' to {}", result.title, path.display());
    Ok(path)
}
