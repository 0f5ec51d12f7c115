//! Experiment controller: one topology, one configuration, one Dataset.

use std::time::Duration;

use super::advancer::{PositionAdvancer, TickOutcome};
use super::dataset::Dataset;
use super::sampler::ThroughputSampler;
use super::scenario::{Scenario, validate_scenario};
use crate::common::error::HarnessError;
use crate::simulation::energy::{EnergyModel, EnergyObserver};
use crate::simulation::mobility::ConstantPositionMobility;
use crate::simulation::scheduler::Scheduler;
use crate::simulation::transport::{PacketTransport, TransportEvent};
use crate::simulation::wifi::WifiConfig;

/// Events of one experiment run.
#[derive(Debug, Clone, PartialEq)]
enum ExperimentEvent {
    /// Tick of the advancer at this index.
    Advance { advancer: usize },
    Transport(TransportEvent),
}

impl From<TransportEvent> for ExperimentEvent {
    fn from(event: TransportEvent) -> Self {
        ExperimentEvent::Transport(event)
    }
}

/// A single measurement run identified by its configuration label.
///
/// The experiment owns the byte counter fed by the vantage socket. `run`
/// consumes it, so a counter never outlives the run it measured.
#[derive(Debug)]
pub struct Experiment {
    label: String,
    sampler: ThroughputSampler,
}

impl Experiment {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sampler: ThroughputSampler::new(),
        }
    }

    /// Build the topology described by `scenario`, drive it to quiescence (or
    /// the scenario's horizon) and return the samples taken on the way.
    ///
    /// Precondition failures are reported before any event executes.
    pub fn run(
        mut self,
        scenario: &Scenario,
        wifi: &WifiConfig,
        seed: u64,
        observer: &mut dyn EnergyObserver,
    ) -> Result<Dataset, HarnessError> {
        validate_scenario(scenario).map_err(HarnessError::MalformedTopology)?;
        let node_count = scenario.node_count();
        log::info!(
            "[{}] starting run: {} nodes, {} on {:?}, seed {}",
            self.label,
            node_count,
            wifi.rate_control.manager_name(),
            wifi.standard,
            seed
        );

        let mut scheduler: Scheduler<ExperimentEvent> = Scheduler::with_horizon(scenario.horizon());
        let mut mobility = ConstantPositionMobility::install(scenario.nodes.iter().map(|node| node.position));
        let mut transport = PacketTransport::install(wifi, seed);

        let mut energy = if scenario.energy.enabled {
            EnergyModel::install(node_count, &scenario.energy)
        } else {
            EnergyModel::none()
        };
        if let Some(node) = scenario.energy_trace_node {
            energy.connect_trace(node)?;
        }

        let vantage = transport.bind(scenario.vantage_node);

        let traffic = &scenario.traffic;
        let mut advancers = Vec::new();
        for node in &scenario.nodes {
            if let Some(window) = node.traffic {
                transport.send_constant_rate(
                    &mut scheduler,
                    node.node_id,
                    traffic.destination,
                    traffic.data_rate_bps,
                    traffic.payload_size,
                    window.start(),
                    window.stop(),
                );
            }
            if let Some(offset) = node.advance_after_secs {
                let advancer = advancers.len();
                advancers.push(PositionAdvancer::new(node.node_id, scenario.advancer.clone()));
                scheduler.schedule(Duration::from_secs_f64(offset), node.node_id, ExperimentEvent::Advance { advancer });
            }
        }
        log::debug!("[{}] {} events queued, {} advancers", self.label, scheduler.pending(), advancers.len());

        let mut dataset = Dataset::new(self.label.clone());
        let sampler = &mut self.sampler;
        let summary = scheduler.run_until_idle(|scheduler, target, event| match event {
            ExperimentEvent::Advance { advancer } => {
                if let TickOutcome::Reschedule(delay) = advancers[advancer].tick(&mut mobility, sampler, &mut dataset) {
                    scheduler.schedule(delay, target, ExperimentEvent::Advance { advancer });
                }
            }
            ExperimentEvent::Transport(event) => {
                for delivery in transport.handle_event(event, scheduler, &mobility, &mut energy, observer) {
                    if delivery.socket == vantage {
                        sampler.on_receive(delivery.bytes);
                    }
                }
            }
        });

        if summary.pending > 0 {
            log::warn!(
                "[{}] horizon reached at {:.3}s with {} events pending",
                self.label,
                summary.finished_at.as_secs_f64(),
                summary.pending
            );
        }
        scheduler.reset();

        let stats = transport.stats();
        log::info!(
            "[{}] finished at {:.3}s: {} events, {} frames sent, {} lost at destination, {} samples",
            self.label,
            summary.finished_at.as_secs_f64(),
            summary.executed,
            stats.frames_sent,
            stats.frames_lost_at_destination,
            dataset.len() / 2
        );
        Ok(dataset)
    }
}
