//! Measurement harness built on the simulation substrate.
//!
//! ## Module Organization
//!
//! - `scenario`: Node configuration table, reference topology and JSON loading
//! - `variant`: Labeled PHY and rate-control settings
//! - `dataset`: Titled (x, y) series
//! - `sampler`: Byte counter behind the vantage socket
//! - `advancer`: Position advancer state machine
//! - `controller`: One experiment run
//! - `sweep`: Ordered runs over configuration variants

pub mod advancer;
pub mod controller;
pub mod dataset;
pub mod sampler;
pub mod scenario;
pub mod sweep;
pub mod variant;

pub use dataset::Dataset;
pub use scenario::Scenario;
pub use sweep::{SweepResult, reference_sweeps, run_sweep};
