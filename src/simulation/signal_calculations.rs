//! Link budget and timing calculations for the reference substrate.
//!
//! Contains helpers for:
//! - Log-distance path loss with optional log-normal shadowing
//! - SNR at a receiver and the decode decision for a data mode
//! - Frame airtime for a payload at a data mode
//! - Effective range of a data mode given the link budget
//!
//! Units:
//! - Power: dBm / dB
//! - Time: `std::time::Duration` (virtual time)
//! - Distance: meters

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::DataMode;

/// Fixed PLCP preamble and header time added to every frame.
pub const PREAMBLE_DURATION: Duration = Duration::from_micros(20);

/// Parameters of the log-distance propagation model and the radio front end.
///
/// Defaults match a 5 GHz OFDM channel: reference loss at 1 m of 46.6777 dB,
/// exponent 3, a 20 MHz noise floor with a 7 dB noise figure and a 16 dBm
/// transmitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLossParameters {
    /// Path loss exponent (n). 2.0 for free space, 3.0 and above when obstructed.
    pub path_loss_exponent: f64,
    /// Path loss at the reference distance d₀ = 1 m, in dB.
    pub path_loss_at_reference_distance: f64,
    /// Standard deviation of log-normal shadowing (σ) in dB. 0 disables it.
    pub shadowing_sigma: f64,
    /// Receiver noise floor in dBm.
    pub noise_floor: f64,
    /// Transmit power at the antenna in dBm.
    pub tx_power: f64,
}

impl Default for PathLossParameters {
    fn default() -> Self {
        Self {
            path_loss_exponent: 3.0,
            path_loss_at_reference_distance: 46.6777,
            shadowing_sigma: 0.0,
            noise_floor: -93.97,
            tx_power: 16.0206,
        }
    }
}

/// Deterministic path loss (dB) at `distance`, without shadowing.
///
/// ```text
/// PL(d) = PL(d₀) + 10 × n × log₁₀(d/d₀),  d₀ = 1 m
/// ```
///
/// Distances below the reference distance return the reference loss.
pub fn calculate_mean_path_loss(distance: f64, params: &PathLossParameters) -> f64 {
    if distance < 1.0 {
        return params.path_loss_at_reference_distance;
    }
    params.path_loss_at_reference_distance + 10.0 * params.path_loss_exponent * distance.log10()
}

/// Path loss (dB) at `distance` including a shadowing sample drawn from `rng`.
///
/// Each call samples a new shadowing value, so repeated calls with the same
/// distance differ when `shadowing_sigma > 0`. The caller owns the RNG, which
/// keeps a run reproducible for a given seed.
pub fn calculate_path_loss(distance: f64, params: &PathLossParameters, rng: &mut StdRng) -> f64 {
    let shadowing = if params.shadowing_sigma > 0.0 {
        match Normal::new(0.0_f64, params.shadowing_sigma) {
            Ok(normal) => normal.sample(rng),
            Err(_) => 0.0,
        }
    } else {
        0.0
    };
    calculate_mean_path_loss(distance, params) + shadowing
}

/// Expected SNR (dB) at `distance`, ignoring shadowing.
pub fn calculate_mean_snr(distance: f64, params: &PathLossParameters) -> f64 {
    params.tx_power - calculate_mean_path_loss(distance, params) - params.noise_floor
}

/// Sampled SNR (dB) of one frame at `distance`.
pub fn calculate_snr(distance: f64, params: &PathLossParameters, rng: &mut StdRng) -> f64 {
    params.tx_power - calculate_path_loss(distance, params, rng) - params.noise_floor
}

/// Whether a frame received with `snr` can be decoded at `mode`.
pub fn is_decodable(snr: f64, mode: DataMode) -> bool {
    snr >= mode.snr_threshold()
}

/// On-air duration of a frame carrying `payload_size` bytes at `mode`.
pub fn calculate_air_time(mode: DataMode, payload_size: u32) -> Duration {
    let payload_secs = (payload_size as f64 * 8.0) / mode.bit_rate() as f64;
    PREAMBLE_DURATION + Duration::from_secs_f64(payload_secs)
}

// Solve tx_power - PL(d) - noise_floor = threshold for d with d₀ = 1 m:
//   PL0 + 10n log10 d = tx_power - noise_floor - threshold
//   d = 10^((tx_power - noise_floor - threshold - PL0) / (10n))
/// Largest distance (m) at which `mode` still decodes on average.
pub fn calculate_effective_distance(mode: DataMode, params: &PathLossParameters) -> f64 {
    let budget = params.tx_power - params.noise_floor - mode.snr_threshold() - params.path_loss_at_reference_distance;
    if budget <= 0.0 {
        return 0.0;
    }
    10.0_f64.powf(budget / (10.0 * params.path_loss_exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn path_loss_grows_with_distance() {
        let params = PathLossParameters::default();
        let near = calculate_mean_path_loss(10.0, &params);
        let far = calculate_mean_path_loss(100.0, &params);
        // One decade at n = 3 costs 30 dB.
        assert!((far - near - 30.0).abs() < 1e-9);
        assert_eq!(calculate_mean_path_loss(0.5, &params), params.path_loss_at_reference_distance);
    }

    #[test]
    fn no_shadowing_means_sampled_equals_mean() {
        let params = PathLossParameters::default();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(calculate_snr(42.0, &params, &mut rng), calculate_mean_snr(42.0, &params));
    }

    #[test]
    fn shadowing_is_reproducible_for_a_seed() {
        let params = PathLossParameters {
            shadowing_sigma: 4.0,
            ..Default::default()
        };
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        for _ in 0..16 {
            assert_eq!(calculate_snr(30.0, &params, &mut a), calculate_snr(30.0, &params, &mut b));
        }
    }

    #[test]
    fn effective_distance_is_the_decode_boundary() {
        let params = PathLossParameters::default();
        for mode in [DataMode::Ofdm6, DataMode::Ofdm24, DataMode::Ofdm54] {
            let range = calculate_effective_distance(mode, &params);
            assert!(is_decodable(calculate_mean_snr(range * 0.99, &params), mode));
            assert!(!is_decodable(calculate_mean_snr(range * 1.01, &params), mode));
        }
        assert!(calculate_effective_distance(DataMode::Ofdm6, &params) > calculate_effective_distance(DataMode::Ofdm54, &params));
    }

    #[test]
    fn airtime_shrinks_with_faster_modes() {
        let slow = calculate_air_time(DataMode::Ofdm6, 200);
        let fast = calculate_air_time(DataMode::Ofdm54, 200);
        assert!(fast < slow);
        // 1600 bits at 6 Mbps plus the preamble.
        let expected = PREAMBLE_DURATION + Duration::from_secs_f64(1600.0 / 6_000_000.0);
        assert_eq!(slow, expected);
    }
}
