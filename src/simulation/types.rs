//! Type definitions shared by the simulation substrate.
//!
//! Contains the data structures used across the substrate:
//! - Node identity and 3D positions
//! - Wi-Fi data modes and PHY standards

use serde::{Deserialize, Serialize};

/// Index of a node inside a topology. Node ids are contiguous from zero.
pub type NodeId = u32;

/// Position in world coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// OFDM data modes available to the rate controllers, ordered from the most
/// robust to the fastest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataMode {
    #[serde(rename = "OfdmRate6Mbps")]
    Ofdm6,
    #[serde(rename = "OfdmRate9Mbps")]
    Ofdm9,
    #[serde(rename = "OfdmRate12Mbps")]
    Ofdm12,
    #[serde(rename = "OfdmRate18Mbps")]
    Ofdm18,
    #[serde(rename = "OfdmRate24Mbps")]
    Ofdm24,
    #[serde(rename = "OfdmRate36Mbps")]
    Ofdm36,
    #[serde(rename = "OfdmRate48Mbps")]
    Ofdm48,
    #[serde(rename = "OfdmRate54Mbps")]
    Ofdm54,
}

impl DataMode {
    /// Nominal PHY bit rate in bits per second.
    pub fn bit_rate(&self) -> u64 {
        match self {
            DataMode::Ofdm6 => 6_000_000,
            DataMode::Ofdm9 => 9_000_000,
            DataMode::Ofdm12 => 12_000_000,
            DataMode::Ofdm18 => 18_000_000,
            DataMode::Ofdm24 => 24_000_000,
            DataMode::Ofdm36 => 36_000_000,
            DataMode::Ofdm48 => 48_000_000,
            DataMode::Ofdm54 => 54_000_000,
        }
    }

    /// Minimum SNR (dB) at which a frame sent with this mode is decoded.
    pub fn snr_threshold(&self) -> f64 {
        match self {
            DataMode::Ofdm6 => 5.0,
            DataMode::Ofdm9 => 6.0,
            DataMode::Ofdm12 => 8.0,
            DataMode::Ofdm18 => 11.0,
            DataMode::Ofdm24 => 14.0,
            DataMode::Ofdm36 => 18.0,
            DataMode::Ofdm48 => 22.0,
            DataMode::Ofdm54 => 24.0,
        }
    }

    /// Name used by the substrate configuration, e.g. `OfdmRate54Mbps`.
    pub fn name(&self) -> &'static str {
        match self {
            DataMode::Ofdm6 => "OfdmRate6Mbps",
            DataMode::Ofdm9 => "OfdmRate9Mbps",
            DataMode::Ofdm12 => "OfdmRate12Mbps",
            DataMode::Ofdm18 => "OfdmRate18Mbps",
            DataMode::Ofdm24 => "OfdmRate24Mbps",
            DataMode::Ofdm36 => "OfdmRate36Mbps",
            DataMode::Ofdm48 => "OfdmRate48Mbps",
            DataMode::Ofdm54 => "OfdmRate54Mbps",
        }
    }
}

/// PHY standard installed on every device of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhyStandard {
    /// IEEE 802.11a, all eight OFDM modes.
    Ieee80211a,
    /// The reduced "holland" mode set used for rate-control comparisons.
    Holland,
}

impl PhyStandard {
    /// Data modes supported by the standard, slowest first.
    pub fn modes(&self) -> &'static [DataMode] {
        const IEEE_80211A: [DataMode; 8] = [
            DataMode::Ofdm6,
            DataMode::Ofdm9,
            DataMode::Ofdm12,
            DataMode::Ofdm18,
            DataMode::Ofdm24,
            DataMode::Ofdm36,
            DataMode::Ofdm48,
            DataMode::Ofdm54,
        ];
        const HOLLAND: [DataMode; 5] = [DataMode::Ofdm6, DataMode::Ofdm12, DataMode::Ofdm18, DataMode::Ofdm36, DataMode::Ofdm54];
        match self {
            PhyStandard::Ieee80211a => &IEEE_80211A,
            PhyStandard::Holland => &HOLLAND,
        }
    }

    pub fn supports(&self, mode: DataMode) -> bool {
        self.modes().contains(&mode)
    }
}
