//! Wi-Fi configuration bundle handed to the substrate.

use serde::{Deserialize, Serialize};

use super::rate_control::RateControlAlgorithm;
use super::signal_calculations::PathLossParameters;
use super::types::{DataMode, PhyStandard};

/// MAC flavour installed on every device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacType {
    /// Independent BSS: no access point, every station talks directly.
    #[default]
    Adhoc,
}

/// PHY standard, MAC, channel and rate control of one run.
///
/// The experiment controller does not interpret this; it is passed as-is to
/// the transport substrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub standard: PhyStandard,
    pub mac: MacType,
    pub channel: PathLossParameters,
    pub rate_control: RateControlAlgorithm,
    /// Data mode for `ConstantRate`.
    pub data_mode: Option<DataMode>,
    /// Frames above this size would be fragmented (bytes).
    pub fragmentation_threshold: u32,
    /// Frames above this size would use RTS/CTS (bytes).
    pub rts_cts_threshold: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            standard: PhyStandard::Ieee80211a,
            mac: MacType::Adhoc,
            channel: PathLossParameters::default(),
            rate_control: RateControlAlgorithm::ConstantRate,
            data_mode: Some(DataMode::Ofdm6),
            // Both set above the largest frame so neither mechanism triggers.
            fragmentation_threshold: 2200,
            rts_cts_threshold: 2200,
        }
    }
}
