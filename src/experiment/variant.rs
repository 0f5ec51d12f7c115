//! Configuration variants: the knob a sweep turns between runs.

use serde::{Deserialize, Serialize};

use crate::common::error::HarnessError;
use crate::simulation::rate_control::RateControlAlgorithm;
use crate::simulation::wifi::WifiConfig;
use crate::simulation::{DataMode, PhyStandard};

/// One point of a sweep: a labeled PHY standard and rate-control setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationVariant {
    /// Dataset title; unique within a sweep.
    pub label: String,
    pub standard: PhyStandard,
    pub rate_control: RateControlAlgorithm,
    /// Fixed data mode, required by `ConstantRate` and ignored otherwise.
    #[serde(default)]
    pub data_mode: Option<DataMode>,
}

impl ConfigurationVariant {
    pub fn constant_rate(label: impl Into<String>, standard: PhyStandard, mode: DataMode) -> Self {
        Self {
            label: label.into(),
            standard,
            rate_control: RateControlAlgorithm::ConstantRate,
            data_mode: Some(mode),
        }
    }

    pub fn adaptive(label: impl Into<String>, standard: PhyStandard, rate_control: RateControlAlgorithm) -> Self {
        Self {
            label: label.into(),
            standard,
            rate_control,
            data_mode: None,
        }
    }

    /// Check that the variant can run as described.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.label.trim().is_empty() {
            return Err(HarnessError::InvalidVariant("variant label must not be empty".to_string()));
        }
        if self.rate_control == RateControlAlgorithm::ConstantRate {
            let Some(mode) = self.data_mode else {
                return Err(HarnessError::InvalidVariant(format!("{}: constant rate needs a data mode", self.label)));
            };
            if !self.standard.supports(mode) {
                return Err(HarnessError::InvalidVariant(format!(
                    "{}: {} is not available on {:?}",
                    self.label,
                    mode.name(),
                    self.standard
                )));
            }
        }
        Ok(())
    }

    /// `base` with this variant's standard, manager and data mode applied.
    pub fn wifi_config(&self, base: &WifiConfig) -> WifiConfig {
        let data_mode = match self.rate_control {
            RateControlAlgorithm::ConstantRate => self.data_mode,
            _ => None,
        };
        WifiConfig {
            standard: self.standard,
            rate_control: self.rate_control,
            data_mode,
            ..base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_rate_requires_supported_mode() {
        let ok = ConfigurationVariant::constant_rate("54mb", PhyStandard::Ieee80211a, DataMode::Ofdm54);
        assert!(ok.validate().is_ok());

        let unsupported = ConfigurationVariant::constant_rate("9mb", PhyStandard::Holland, DataMode::Ofdm9);
        assert!(matches!(unsupported.validate(), Err(HarnessError::InvalidVariant(_))));

        let mut missing = ok.clone();
        missing.data_mode = None;
        assert!(missing.validate().is_err());
    }

    #[test]
    fn empty_label_is_rejected() {
        let variant = ConfigurationVariant::adaptive("  ", PhyStandard::Holland, RateControlAlgorithm::Arf);
        assert!(variant.validate().is_err());
    }

    #[test]
    fn wifi_config_keeps_channel_and_mac_settings() {
        let mut base = WifiConfig::default();
        base.channel.shadowing_sigma = 2.0;
        let variant = ConfigurationVariant::adaptive("rraa", PhyStandard::Holland, RateControlAlgorithm::Rraa);

        let config = variant.wifi_config(&base);
        assert_eq!(config.standard, PhyStandard::Holland);
        assert_eq!(config.rate_control, RateControlAlgorithm::Rraa);
        assert_eq!(config.data_mode, None);
        assert_eq!(config.channel.shadowing_sigma, 2.0);
        assert_eq!(config.fragmentation_threshold, 2200);
    }
}
