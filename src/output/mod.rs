//! Renderers for finished sweeps.
//!
//! - `gnuplot`: Plot script with inline data, written to stdout by default
//! - `json`: Per-sweep export with a generation timestamp

pub mod gnuplot;
pub mod json;
