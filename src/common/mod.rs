//! Configuration and error types shared across the harness.

pub mod config;
pub mod error;
