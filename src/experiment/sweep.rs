//! Sweep driver: one fresh experiment per configuration variant.

use serde::Serialize;
use std::collections::HashSet;

use super::controller::Experiment;
use super::dataset::Dataset;
use super::scenario::Scenario;
use super::variant::ConfigurationVariant;
use crate::common::error::HarnessError;
use crate::simulation::energy::EnergyObserver;
use crate::simulation::rate_control::RateControlAlgorithm;
use crate::simulation::wifi::WifiConfig;
use crate::simulation::{DataMode, PhyStandard};

/// An ordered list of variants rendered together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sweep {
    pub title: String,
    /// File name of the rendered plot.
    pub output_name: String,
    pub variants: Vec<ConfigurationVariant>,
}

/// Datasets of a finished sweep, in variant order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepResult {
    pub title: String,
    pub output_name: String,
    pub datasets: Vec<Dataset>,
}

impl Sweep {
    /// Reject empty sweeps, invalid variants and duplicate labels.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.variants.is_empty() {
            return Err(HarnessError::InvalidVariant(format!("sweep '{}' has no variants", self.title)));
        }
        let mut labels = HashSet::new();
        for variant in &self.variants {
            variant.validate()?;
            if !labels.insert(variant.label.as_str()) {
                return Err(HarnessError::InvalidVariant(format!(
                    "duplicate label '{}' in sweep '{}'",
                    variant.label, self.title
                )));
            }
        }
        Ok(())
    }
}

/// Run every variant of `sweep` in input order, one fresh `Experiment` each.
///
/// Every run reseeds from `seed`, so a variant's Dataset does not depend on
/// which variants ran before it. The first failing run aborts the sweep.
pub fn run_sweep(
    sweep: &Sweep,
    scenario: &Scenario,
    base: &WifiConfig,
    seed: u64,
    observer: &mut dyn EnergyObserver,
) -> Result<SweepResult, HarnessError> {
    sweep.validate()?;
    log::info!("Sweep '{}': {} variants -> {}", sweep.title, sweep.variants.len(), sweep.output_name);

    let mut datasets = Vec::with_capacity(sweep.variants.len());
    for variant in &sweep.variants {
        let wifi = variant.wifi_config(base);
        let dataset = Experiment::new(variant.label.clone()).run(scenario, &wifi, seed, observer)?;
        datasets.push(dataset);
    }

    Ok(SweepResult {
        title: sweep.title.clone(),
        output_name: sweep.output_name.clone(),
        datasets,
    })
}

/// The two reference sweeps: fixed data rates on 802.11a, then the adaptive
/// managers on the Holland standard.
pub fn reference_sweeps() -> Vec<Sweep> {
    let fixed = [
        ("54mb", DataMode::Ofdm54),
        ("48mb", DataMode::Ofdm48),
        ("36mb", DataMode::Ofdm36),
        ("24mb", DataMode::Ofdm24),
        ("18mb", DataMode::Ofdm18),
        ("12mb", DataMode::Ofdm12),
        ("9mb", DataMode::Ofdm9),
        ("6mb", DataMode::Ofdm6),
    ];
    let adaptive = [
        ("arf", RateControlAlgorithm::Arf),
        ("aarf", RateControlAlgorithm::Aarf),
        ("aarf-cd", RateControlAlgorithm::AarfCd),
        ("cara", RateControlAlgorithm::Cara),
        ("rraa", RateControlAlgorithm::Rraa),
        ("ideal", RateControlAlgorithm::Ideal),
    ];

    vec![
        Sweep {
            title: "Fixed data rate".to_string(),
            output_name: "reference-rates.png".to_string(),
            variants: fixed
                .iter()
                .map(|(label, mode)| ConfigurationVariant::constant_rate(*label, PhyStandard::Ieee80211a, *mode))
                .collect(),
        },
        Sweep {
            title: "Rate control".to_string(),
            output_name: "rate-control.png".to_string(),
            variants: adaptive
                .iter()
                .map(|(label, algorithm)| ConfigurationVariant::adaptive(*label, PhyStandard::Holland, *algorithm))
                .collect(),
        },
    ]
}
