//! Byte counter turned into throughput samples.

use super::dataset::Dataset;
use crate::simulation::Position;

/// Accumulates delivered bytes between samples.
#[derive(Debug, Default)]
pub struct ThroughputSampler {
    bytes_since_sample: u64,
}

impl ThroughputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive path of the vantage socket.
    pub fn on_receive(&mut self, bytes: u32) {
        self.bytes_since_sample += bytes as u64;
    }

    pub fn bytes_since_sample(&self) -> u64 {
        self.bytes_since_sample
    }

    /// Convert the bytes seen since the last sample to Mbit, reset the counter
    /// and append `(x, rate)` then `(y, rate)` to `dataset`.
    ///
    /// The window length is not divided out: with a fixed tick interval the
    /// value is proportional to the rate over that tick.
    pub fn sample(&mut self, position: &Position, dataset: &mut Dataset) -> f64 {
        let mbs = (self.bytes_since_sample as f64 * 8.0) / 1_000_000.0;
        self.bytes_since_sample = 0;
        dataset.add(position.x, mbs);
        dataset.add(position.y, mbs);
        mbs
    }
}
