//! Position advancer: a self-rescheduling state machine moving one node.
//!
//! Each tick reads the node's position, emits one throughput sample taken at
//! that position, then steps the node. When the stepped position crosses
//! either bound the advancer stops without writing it, and no further tick is
//! scheduled. The continuation (state and tick count) lives in the advancer
//! itself; the owner only re-queues it when `tick` asks to.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::dataset::Dataset;
use super::sampler::ThroughputSampler;
use crate::simulation::mobility::MobilityModel;
use crate::simulation::{NodeId, Position};

/// Step sizes, bounds and cadence shared by every advancer of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancerParams {
    pub step_x: f64,
    pub step_y: f64,
    /// The advancer stops once x reaches this value.
    pub max_x: f64,
    /// The advancer stops once y reaches this value.
    pub max_y: f64,
    pub interval_secs: f64,
}

impl AdvancerParams {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

impl Default for AdvancerParams {
    fn default() -> Self {
        Self {
            step_x: 1.0,
            step_y: 2.0,
            max_x: 600.0,
            max_y: 900.0,
            interval_secs: 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancerState {
    Active,
    Stopped,
}

/// What the owner must do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Run the next tick after this delay.
    Reschedule(Duration),
    Stopped,
}

#[derive(Debug, Clone)]
pub struct PositionAdvancer {
    node: NodeId,
    params: AdvancerParams,
    state: AdvancerState,
    ticks: u32,
}

impl PositionAdvancer {
    pub fn new(node: NodeId, params: AdvancerParams) -> Self {
        Self {
            node,
            params,
            state: AdvancerState::Active,
            ticks: 0,
        }
    }

    pub fn state(&self) -> AdvancerState {
        self.state
    }

    /// Ticks executed so far, including the one that stopped the advancer.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Run one transition. A stopped advancer ignores further ticks.
    pub fn tick(&mut self, mobility: &mut dyn MobilityModel, sampler: &mut ThroughputSampler, dataset: &mut Dataset) -> TickOutcome {
        if self.state == AdvancerState::Stopped {
            return TickOutcome::Stopped;
        }
        self.ticks += 1;

        let position = mobility.position(self.node);
        sampler.sample(&position, dataset);

        let next = Position {
            x: position.x + self.params.step_x,
            y: position.y + self.params.step_y,
            z: position.z,
        };
        if next.x >= self.params.max_x || next.y >= self.params.max_y {
            log::debug!("[{}] advancer stopped after {} ticks at ({}, {})", self.node, self.ticks, position.x, position.y);
            self.state = AdvancerState::Stopped;
            return TickOutcome::Stopped;
        }

        mobility.set_position(self.node, next);
        TickOutcome::Reschedule(self.params.interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::mobility::ConstantPositionMobility;

    fn run_to_stop(advancer: &mut PositionAdvancer, mobility: &mut ConstantPositionMobility, sampler: &mut ThroughputSampler, dataset: &mut Dataset) {
        while let TickOutcome::Reschedule(_) = advancer.tick(mobility, sampler, dataset) {}
    }

    #[test]
    fn stops_when_y_reaches_bound() {
        let mut mobility = ConstantPositionMobility::install([Position::new(100.0, -10.0, 0.0)]);
        let mut sampler = ThroughputSampler::new();
        let mut dataset = Dataset::new("advance");
        let mut advancer = PositionAdvancer::new(0, AdvancerParams::default());

        run_to_stop(&mut advancer, &mut mobility, &mut sampler, &mut dataset);

        // y = -10 + 2k reaches 900 at k = 455; x is 555 by then.
        assert_eq!(advancer.ticks(), 455);
        assert_eq!(advancer.state(), AdvancerState::Stopped);
        assert_eq!(dataset.len(), 2 * 455);
        // The final, out-of-bounds position is never written.
        assert_eq!(mobility.position(0), Position::new(554.0, 898.0, 0.0));
    }

    #[test]
    fn stops_when_x_reaches_bound() {
        let mut mobility = ConstantPositionMobility::install([Position::new(597.0, 0.0, 0.0)]);
        let mut sampler = ThroughputSampler::new();
        let mut dataset = Dataset::new("advance");
        let mut advancer = PositionAdvancer::new(0, AdvancerParams::default());

        run_to_stop(&mut advancer, &mut mobility, &mut sampler, &mut dataset);
        assert_eq!(advancer.ticks(), 3);
        assert_eq!(mobility.position(0).x, 599.0);
    }

    #[test]
    fn samples_use_pre_increment_position() {
        let mut mobility = ConstantPositionMobility::install([Position::new(100.0, -10.0, 0.0)]);
        let mut sampler = ThroughputSampler::new();
        let mut dataset = Dataset::new("advance");
        let mut advancer = PositionAdvancer::new(0, AdvancerParams::default());

        sampler.on_receive(250);
        assert_eq!(advancer.tick(&mut mobility, &mut sampler, &mut dataset), TickOutcome::Reschedule(Duration::from_millis(1500)));
        assert_eq!(advancer.tick(&mut mobility, &mut sampler, &mut dataset), TickOutcome::Reschedule(Duration::from_millis(1500)));
        assert_eq!(dataset.points(), &[(100.0, 0.002), (-10.0, 0.002), (101.0, 0.0), (-8.0, 0.0)]);
    }

    #[test]
    fn tick_count_does_not_depend_on_throughput() {
        let mut quiet = ConstantPositionMobility::install([Position::new(100.0, -10.0, 0.0)]);
        let mut busy = ConstantPositionMobility::install([Position::new(100.0, -10.0, 0.0)]);
        let mut a = PositionAdvancer::new(0, AdvancerParams::default());
        let mut b = PositionAdvancer::new(0, AdvancerParams::default());
        let mut sampler_a = ThroughputSampler::new();
        let mut sampler_b = ThroughputSampler::new();
        let mut dataset_a = Dataset::new("a");
        let mut dataset_b = Dataset::new("b");

        run_to_stop(&mut a, &mut quiet, &mut sampler_a, &mut dataset_a);
        loop {
            sampler_b.on_receive(1_000);
            if b.tick(&mut busy, &mut sampler_b, &mut dataset_b) == TickOutcome::Stopped {
                break;
            }
        }
        assert_eq!(a.ticks(), b.ticks());
    }

    #[test]
    fn stopped_advancer_ignores_ticks() {
        let mut mobility = ConstantPositionMobility::install([Position::new(599.5, 0.0, 0.0)]);
        let mut sampler = ThroughputSampler::new();
        let mut dataset = Dataset::new("advance");
        let mut advancer = PositionAdvancer::new(0, AdvancerParams::default());
        assert_eq!(advancer.tick(&mut mobility, &mut sampler, &mut dataset), TickOutcome::Stopped);
        assert_eq!(advancer.tick(&mut mobility, &mut sampler, &mut dataset), TickOutcome::Stopped);
        assert_eq!(advancer.ticks(), 1);
        assert_eq!(dataset.len(), 2);
    }
}
