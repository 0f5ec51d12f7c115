//! Per-node energy accounting and trace observers.
//!
//! Every node gets a basic energy source and, attached to its radio, a device
//! energy model that drains the source while the radio transmits or receives.
//! Trace output is routed through an injected `EnergyObserver` instead of
//! process-wide handlers, so each run reports only to whoever it was given.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::NodeId;
use crate::common::error::HarnessError;

/// Receives energy trace notifications for the traced node.
pub trait EnergyObserver {
    /// Remaining energy in the node's source changed (joules).
    fn remaining_energy_changed(&mut self, now: Duration, node: NodeId, old_value: f64, new_value: f64);
    /// Total energy consumed by the node's radio changed (joules).
    fn total_energy_changed(&mut self, now: Duration, node: NodeId, old_value: f64, new_value: f64);
}

/// Writes every notification to the log at trace level, and the remaining
/// energy at info level each time it drops below a whole joule.
#[derive(Debug, Default)]
pub struct LoggingEnergyObserver;

/// True when a change from `old_value` to `new_value` passes a whole joule.
fn crosses_whole_joule(old_value: f64, new_value: f64) -> bool {
    new_value.floor() < old_value.floor()
}

impl EnergyObserver for LoggingEnergyObserver {
    fn remaining_energy_changed(&mut self, now: Duration, node: NodeId, old_value: f64, new_value: f64) {
        if crosses_whole_joule(old_value, new_value) {
            log::info!("{}s [{}] Current remaining energy = {}J", now.as_secs_f64(), node, new_value);
        } else {
            log::trace!("{}s [{}] Current remaining energy = {}J", now.as_secs_f64(), node, new_value);
        }
    }

    fn total_energy_changed(&mut self, now: Duration, node: NodeId, _old_value: f64, new_value: f64) {
        log::trace!("{}s [{}] Total energy consumed by node = {}J", now.as_secs_f64(), node, new_value);
    }
}

/// Discards every notification.
#[derive(Debug, Default)]
pub struct NullEnergyObserver;

impl EnergyObserver for NullEnergyObserver {
    fn remaining_energy_changed(&mut self, _now: Duration, _node: NodeId, _old_value: f64, _new_value: f64) {}

    fn total_energy_changed(&mut self, _now: Duration, _node: NodeId, _old_value: f64, _new_value: f64) {}
}

/// Energy source and radio model settings, shared by every node of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyParameters {
    /// Install sources and device models at all. When false, requesting an
    /// energy trace is a fatal precondition violation.
    pub enabled: bool,
    pub initial_energy_j: f64,
    pub supply_voltage_v: f64,
    pub tx_current_a: f64,
    pub rx_current_a: f64,
}

impl Default for EnergyParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_energy_j: 100.0,
            supply_voltage_v: 3.0,
            tx_current_a: 0.000001,
            rx_current_a: 0.313,
        }
    }
}

/// Battery-like source with linear drain.
#[derive(Debug, Clone)]
pub struct BasicEnergySource {
    pub remaining_energy_j: f64,
    pub supply_voltage_v: f64,
}

/// Radio energy model charging TX and RX airtime to its source.
#[derive(Debug, Clone)]
pub struct WifiRadioEnergyModel {
    pub tx_current_a: f64,
    pub rx_current_a: f64,
    pub total_energy_consumption_j: f64,
}

#[derive(Debug, Clone, Copy)]
enum RadioActivity {
    Tx,
    Rx,
}

/// Sources and device models of every node in a run.
#[derive(Debug, Default)]
pub struct EnergyModel {
    sources: Vec<Option<BasicEnergySource>>,
    device_models: Vec<Option<WifiRadioEnergyModel>>,
    traced: Vec<NodeId>,
}

impl EnergyModel {
    /// Install a source and a radio model on `node_count` nodes.
    pub fn install(node_count: usize, params: &EnergyParameters) -> Self {
        let sources = (0..node_count)
            .map(|_| {
                Some(BasicEnergySource {
                    remaining_energy_j: params.initial_energy_j,
                    supply_voltage_v: params.supply_voltage_v,
                })
            })
            .collect();
        let device_models = (0..node_count)
            .map(|_| {
                Some(WifiRadioEnergyModel {
                    tx_current_a: params.tx_current_a,
                    rx_current_a: params.rx_current_a,
                    total_energy_consumption_j: 0.0,
                })
            })
            .collect();
        Self {
            sources,
            device_models,
            traced: Vec::new(),
        }
    }

    /// No sources or device models on any node.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn source(&self, node: NodeId) -> Option<&BasicEnergySource> {
        self.sources.get(node as usize).and_then(Option::as_ref)
    }

    pub fn find_device_energy_model(&self, node: NodeId) -> Option<&WifiRadioEnergyModel> {
        self.device_models.get(node as usize).and_then(Option::as_ref)
    }

    /// Route `node`'s energy changes to the run's observer.
    ///
    /// Fails when the node has no source or no radio energy model; a run must
    /// not start with a trace pointing at nothing.
    pub fn connect_trace(&mut self, node: NodeId) -> Result<(), HarnessError> {
        if self.source(node).is_none() {
            return Err(HarnessError::MissingCollaborator(format!("no energy source installed on node {}", node)));
        }
        if self.find_device_energy_model(node).is_none() {
            return Err(HarnessError::MissingCollaborator(format!("no WifiRadioEnergyModel attached to node {}", node)));
        }
        if !self.traced.contains(&node) {
            self.traced.push(node);
        }
        Ok(())
    }

    /// Charge a transmission of `airtime` to `node`.
    pub fn on_transmit(&mut self, now: Duration, node: NodeId, airtime: Duration, observer: &mut dyn EnergyObserver) {
        self.drain(now, node, RadioActivity::Tx, airtime, observer);
    }

    /// Charge a reception of `airtime` to `node`.
    pub fn on_receive(&mut self, now: Duration, node: NodeId, airtime: Duration, observer: &mut dyn EnergyObserver) {
        self.drain(now, node, RadioActivity::Rx, airtime, observer);
    }

    fn drain(&mut self, now: Duration, node: NodeId, activity: RadioActivity, airtime: Duration, observer: &mut dyn EnergyObserver) {
        let index = node as usize;
        let (Some(Some(model)), Some(Some(source))) = (self.device_models.get_mut(index), self.sources.get_mut(index)) else {
            return;
        };

        let current = match activity {
            RadioActivity::Tx => model.tx_current_a,
            RadioActivity::Rx => model.rx_current_a,
        };
        let energy = current * source.supply_voltage_v * airtime.as_secs_f64();

        let old_total = model.total_energy_consumption_j;
        model.total_energy_consumption_j += energy;

        let old_remaining = source.remaining_energy_j;
        source.remaining_energy_j = (old_remaining - energy).max(0.0);
        if old_remaining > 0.0 && source.remaining_energy_j == 0.0 {
            log::warn!("[{}] energy source depleted at {}s", node, now.as_secs_f64());
        }

        if self.traced.contains(&node) {
            observer.remaining_energy_changed(now, node, old_remaining, source.remaining_energy_j);
            observer.total_energy_changed(now, node, old_total, model.total_energy_consumption_j);
        }
    }
}

/// Observer that keeps every notification, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingEnergyObserver {
    pub remaining: Vec<(Duration, NodeId, f64)>,
    pub total: Vec<(Duration, NodeId, f64)>,
}

#[cfg(test)]
impl EnergyObserver for RecordingEnergyObserver {
    fn remaining_energy_changed(&mut self, now: Duration, node: NodeId, _old_value: f64, new_value: f64) {
        self.remaining.push((now, node, new_value));
    }

    fn total_energy_changed(&mut self, now: Duration, node: NodeId, _old_value: f64, new_value: f64) {
        self.total.push((now, node, new_value));
    }
}
