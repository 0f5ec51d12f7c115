//! Scenario definition: the node configuration table and run-wide parameters.
//!
//! One row per node replaces hand-unrolled per-node wiring: the row gives the
//! node's initial position, its traffic window (if it sends) and the start
//! offset of its position advancer (if it moves). The reference scenario is
//! built in code; a JSON file with the same shape may replace it.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use super::advancer::AdvancerParams;
use crate::common::error::HarnessError;
use crate::simulation::energy::EnergyParameters;
use crate::simulation::{NodeId, Position};

/// Largest topology accepted from a scenario file.
const MAX_NODES: usize = 1024;

/// Latest virtual time a scenario may name, about 31 years.
const MAX_TIME_SECS: f64 = 1.0e9;

/// Most ticks an advancer may need before it hits a bound.
const MAX_ADVANCER_TICKS: f64 = 1.0e7;

/// Active interval of one constant-bit-rate generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficWindow {
    pub start_secs: f64,
    pub stop_secs: f64,
}

impl TrafficWindow {
    pub fn start(&self) -> Duration {
        Duration::from_secs_f64(self.start_secs)
    }

    pub fn stop(&self) -> Duration {
        Duration::from_secs_f64(self.stop_secs)
    }
}

/// One row of the node configuration table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub node_id: NodeId,
    pub position: Position,
    /// Generator window when this node sends traffic.
    #[serde(default)]
    pub traffic: Option<TrafficWindow>,
    /// Start offset of this node's position advancer when it moves.
    #[serde(default)]
    pub advance_after_secs: Option<f64>,
}

/// Generator settings shared by every sending node of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficParameters {
    /// Node every generator addresses.
    pub destination: NodeId,
    pub payload_size: u32,
    pub data_rate_bps: u64,
}

impl Default for TrafficParameters {
    fn default() -> Self {
        Self {
            destination: 0,
            payload_size: 200,
            data_rate_bps: 6000,
        }
    }
}

/// Everything an experiment needs besides the Wi-Fi configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub traffic: TrafficParameters,
    /// Node carrying the single receive socket every advancer samples from.
    pub vantage_node: NodeId,
    #[serde(default)]
    pub advancer: AdvancerParams,
    #[serde(default)]
    pub energy: EnergyParameters,
    /// Node whose energy changes are reported to the run's observer.
    #[serde(default)]
    pub energy_trace_node: Option<NodeId>,
    /// Stop dispatching events after this virtual time.
    #[serde(default)]
    pub horizon_secs: Option<f64>,
}

fn node(node_id: NodeId, x: f64, y: f64, traffic_start: Option<f64>, advance_after: Option<f64>) -> NodeConfig {
    NodeConfig {
        node_id,
        position: Position::new(x, y, 0.0),
        traffic: traffic_start.map(|start_secs| TrafficWindow { start_secs, stop_secs: 250.0 }),
        advance_after_secs: advance_after,
    }
}

impl Scenario {
    /// The 16-node reference topology.
    ///
    /// Node 0 is the traffic destination, nodes 1 to 15 send with staggered
    /// starts, nodes 6 to 15 move, and all sampling goes through a socket on
    /// node 1, whose energy is also traced.
    pub fn reference() -> Self {
        let nodes = vec![
            node(0, 100.0, 0.0, None, None),
            node(1, 90.0, 10.0, Some(0.5), None),
            node(2, 110.0, 10.0, Some(0.10), None),
            node(3, 115.0, -10.0, Some(0.15), None),
            node(4, 100.0, -10.0, Some(0.10), None),
            node(5, 90.0, -10.0, Some(0.5), None),
            node(6, 75.0, -35.0, Some(0.10), Some(1.5)),
            node(7, 95.0, -30.0, Some(0.15), Some(0.6)),
            node(8, 105.0, -25.0, Some(0.5), Some(0.8)),
            node(9, 85.0, -10.0, Some(0.10), Some(0.9)),
            node(10, 70.0, 0.0, Some(0.15), Some(1.0)),
            node(11, 55.0, -10.0, Some(0.5), Some(2.0)),
            node(12, 60.0, -20.0, Some(0.10), Some(1.2)),
            node(13, 110.0, -30.0, Some(0.15), Some(1.4)),
            node(14, 95.0, -40.0, Some(0.5), Some(1.5)),
            node(15, 85.0, -30.0, Some(0.9), Some(1.0)),
        ];
        Self {
            nodes,
            traffic: TrafficParameters::default(),
            vantage_node: 1,
            advancer: AdvancerParams::default(),
            energy: EnergyParameters::default(),
            energy_trace_node: Some(1),
            horizon_secs: None,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn horizon(&self) -> Option<Duration> {
        self.horizon_secs.map(Duration::from_secs_f64)
    }
}

/// Load a scenario from a JSON file and validate it.
pub fn load_scenario(path: &Path) -> Result<Scenario, HarnessError> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
        .map_err(|e| HarnessError::FileReadError(e.to_string()))?;

    let scenario: Scenario = serde_json::from_str(&data)
        .context("Invalid JSON format")
        .map_err(|e| HarnessError::ParseError(e.to_string()))?;

    validate_scenario(&scenario).map_err(HarnessError::MalformedTopology)?;
    log::info!("Loaded scenario with {} nodes from {}", scenario.node_count(), path.display());
    Ok(scenario)
}

/// Convert a scenario time to virtual time, rejecting values a run cannot schedule.
fn check_time(what: &str, secs: f64) -> Result<Duration, String> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if secs <= MAX_TIME_SECS => Ok(duration),
        _ => Err(format!("{} {} must lie within 0..={}s", what, secs, MAX_TIME_SECS)),
    }
}

/// Ticks an advancer starting at `position` runs before it stops.
///
/// An axis only counts when its step is positive and large enough to move the
/// coordinate at every magnitude it passes through; otherwise it never
/// reaches its bound.
fn ticks_to_bound(position: &Position, params: &AdvancerParams) -> f64 {
    let axis = |from: f64, step: f64, max: f64| {
        let magnitude = from.abs().max(max.abs());
        if step > 0.0 && max.is_finite() && magnitude + step > magnitude {
            ((max - from) / step).max(0.0).ceil()
        } else {
            f64::INFINITY
        }
    };
    axis(position.x, params.step_x, params.max_x).min(axis(position.y, params.step_y, params.max_y))
}

fn check_node_reference(what: &str, node: NodeId, node_count: usize) -> Result<(), String> {
    if node as usize >= node_count {
        return Err(format!("{} {} does not exist in a topology of {} nodes", what, node, node_count));
    }
    Ok(())
}

/// Validate a scenario before any run is built from it.
///
/// Checks:
/// - Node count within 1..=1024
/// - Node ids unique and equal to their row index
/// - Finite positions
/// - Traffic windows with 0 <= start < stop
/// - Times (windows, advancer offsets and interval, horizon) representable as
///   virtual time
/// - Every advancer reaches a bound within a bounded number of ticks
/// - Destination, vantage and traced nodes present in the table
/// - Positive payload, bit rate, advancer interval and horizon
///
/// # Returns
///
/// `Ok(())` if validation passes, `Err(String)` with the first problem found.
pub fn validate_scenario(scenario: &Scenario) -> Result<(), String> {
    if scenario.nodes.is_empty() {
        return Err("Scenario must contain at least one node".to_string());
    }
    if scenario.nodes.len() > MAX_NODES {
        return Err(format!("Node count {} exceeds maximum of {}", scenario.nodes.len(), MAX_NODES));
    }

    let mut node_ids = HashSet::new();
    for (index, node) in scenario.nodes.iter().enumerate() {
        if !node_ids.insert(node.node_id) {
            return Err(format!("Duplicate node_id found: {}", node.node_id));
        }
        if node.node_id as usize != index {
            return Err(format!("Node ids must be contiguous from 0: row {} has node_id {}", index, node.node_id));
        }
        let p = &node.position;
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return Err(format!("Node {} has a non-finite position", node.node_id));
        }
        if let Some(window) = node.traffic {
            let start = check_time("Traffic start", window.start_secs);
            let stop = check_time("Traffic stop", window.stop_secs);
            match (start, stop) {
                (Ok(start), Ok(stop)) if start < stop => {}
                _ => {
                    return Err(format!(
                        "Node {} traffic window [{}, {}) is invalid",
                        node.node_id, window.start_secs, window.stop_secs
                    ));
                }
            }
        }
        if let Some(offset) = node.advance_after_secs {
            check_time("Advancer offset", offset).map_err(|e| format!("Node {}: {}", node.node_id, e))?;
            let ticks = ticks_to_bound(p, &scenario.advancer);
            if ticks > MAX_ADVANCER_TICKS {
                return Err(format!(
                    "Node {} advancer never reaches its bound within {} ticks",
                    node.node_id, MAX_ADVANCER_TICKS
                ));
            }
        }
    }

    let node_count = scenario.nodes.len();
    check_node_reference("Traffic destination", scenario.traffic.destination, node_count)?;
    check_node_reference("Vantage node", scenario.vantage_node, node_count)?;
    if let Some(traced) = scenario.energy_trace_node {
        check_node_reference("Energy trace node", traced, node_count)?;
    }
    if let Some(node) = scenario.nodes.get(scenario.traffic.destination as usize) {
        if node.traffic.is_some() {
            return Err(format!("Traffic destination {} cannot send to itself", node.node_id));
        }
    }

    if scenario.traffic.payload_size == 0 {
        return Err("Invalid payload_size, must be positive".to_string());
    }
    if scenario.traffic.data_rate_bps == 0 {
        return Err("Invalid data_rate_bps, must be positive".to_string());
    }
    let advancer = &scenario.advancer;
    if check_time("Advancer interval", advancer.interval_secs)?.is_zero() {
        return Err(format!("Invalid advancer interval {}, must be positive", advancer.interval_secs));
    }
    if !(advancer.step_x.is_finite() && advancer.step_y.is_finite() && advancer.max_x.is_finite() && advancer.max_y.is_finite()) {
        return Err("Advancer steps and bounds must be finite".to_string());
    }
    if let Some(horizon) = scenario.horizon_secs {
        if check_time("Horizon", horizon)?.is_zero() {
            return Err(format!("Invalid horizon {}, must be positive", horizon));
        }
    }

    Ok(())
}
