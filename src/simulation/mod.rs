//! Reference simulation substrate.
//!
//! This module provides the collaborators an experiment runs on:
//! - A discrete-event scheduler with FIFO tie-breaking
//! - Constant-position mobility with explicit position writes
//! - Packet sockets and constant-bit-rate generators over a simple link model
//! - Per-link rate-control managers
//! - Per-node energy sources and radio energy models
//!
//! ## Module Organization
//!
//! - `types`: Node ids, positions, data modes and PHY standards
//! - `scheduler`: Virtual-time event queue
//! - `mobility`: Position accessor trait and constant-position model
//! - `signal_calculations`: Path loss, SNR, airtime and range calculations
//! - `rate_control`: Data-mode selection per link
//! - `wifi`: Configuration bundle passed through to the transport
//! - `transport`: Sockets, generators and frame delivery
//! - `energy`: Energy sources, radio energy models and trace observers

pub mod energy;
pub mod mobility;
pub mod rate_control;
pub mod scheduler;
pub mod signal_calculations;
pub mod transport;
pub mod types;
pub mod wifi;

pub use types::{DataMode, NodeId, PhyStandard, Position};
