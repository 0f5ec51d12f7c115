//! Per-link rate-control managers for the reference substrate.
//!
//! One `RateController` exists per (sender, destination) pair. It picks the
//! data mode of each outgoing frame and learns from the destination's
//! delivery outcome. The managers are compact approximations of the classic
//! algorithms; they only have to respond to link quality in the same direction
//! as the real ones.

use serde::{Deserialize, Serialize};

use super::types::{DataMode, PhyStandard};

/// Rate-control algorithm selected by a configuration variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateControlAlgorithm {
    /// Always transmit at the variant's fixed data mode.
    ConstantRate,
    Arf,
    Aarf,
    AarfCd,
    Cara,
    Rraa,
    /// Pick the fastest mode the last observed SNR supports.
    Ideal,
}

impl RateControlAlgorithm {
    /// Remote station manager name, as used in run logs.
    pub fn manager_name(&self) -> &'static str {
        match self {
            RateControlAlgorithm::ConstantRate => "ConstantRateWifiManager",
            RateControlAlgorithm::Arf => "ArfWifiManager",
            RateControlAlgorithm::Aarf => "AarfWifiManager",
            RateControlAlgorithm::AarfCd => "AarfcdWifiManager",
            RateControlAlgorithm::Cara => "CaraWifiManager",
            RateControlAlgorithm::Rraa => "RraaWifiManager",
            RateControlAlgorithm::Ideal => "IdealWifiManager",
        }
    }
}

/// Result of one transmission as seen by the sender.
#[derive(Debug, Clone, Copy)]
pub struct TxOutcome {
    pub delivered: bool,
    /// SNR (dB) the destination observed for the frame.
    pub snr: f64,
}

/// Thresholds of the ARF family.
#[derive(Debug, Clone, Copy)]
struct SteppingParams {
    min_success_threshold: u32,
    max_success_threshold: u32,
    /// Double the success threshold after a failed step up (AARF behaviour).
    adaptive: bool,
    failure_threshold: u32,
    /// Probe a faster mode after this many frames without a change (CARA timer).
    raise_timeout: Option<u32>,
}

#[derive(Debug, Clone)]
struct SteppingState {
    params: SteppingParams,
    success_threshold: u32,
    successes: u32,
    failures: u32,
    frames_since_change: u32,
    probing: bool,
}

const RRAA_WINDOW: u32 = 20;
const RRAA_MAX_TOLERABLE_LOSS: f64 = 0.4;
const RRAA_OPPORTUNISTIC_LOSS: f64 = 0.1;

#[derive(Debug, Clone, Default)]
struct RraaState {
    sent: u32,
    lost: u32,
}

#[derive(Debug, Clone)]
enum ControllerState {
    Constant,
    Stepping(SteppingState),
    Rraa(RraaState),
    Ideal,
}

/// Data-mode selection state for one link.
#[derive(Debug, Clone)]
pub struct RateController {
    modes: &'static [DataMode],
    index: usize,
    state: ControllerState,
}

impl RateController {
    /// Create the controller for `algorithm` on `standard`.
    ///
    /// `fixed_mode` is only consulted by `ConstantRate`; callers validate that
    /// it is present and supported before the run starts. Adaptive managers
    /// start at the most robust mode.
    pub fn new(algorithm: RateControlAlgorithm, standard: PhyStandard, fixed_mode: Option<DataMode>) -> Self {
        let modes = standard.modes();
        let stepping = |params: SteppingParams| {
            ControllerState::Stepping(SteppingState {
                params,
                success_threshold: params.min_success_threshold,
                successes: 0,
                failures: 0,
                frames_since_change: 0,
                probing: false,
            })
        };

        let (index, state) = match algorithm {
            RateControlAlgorithm::ConstantRate => {
                let index = fixed_mode.and_then(|mode| modes.iter().position(|m| *m == mode)).unwrap_or(0);
                (index, ControllerState::Constant)
            }
            RateControlAlgorithm::Arf => (
                0,
                stepping(SteppingParams {
                    min_success_threshold: 10,
                    max_success_threshold: 10,
                    adaptive: false,
                    failure_threshold: 2,
                    raise_timeout: None,
                }),
            ),
            RateControlAlgorithm::Aarf => (
                0,
                stepping(SteppingParams {
                    min_success_threshold: 10,
                    max_success_threshold: 60,
                    adaptive: true,
                    failure_threshold: 2,
                    raise_timeout: None,
                }),
            ),
            RateControlAlgorithm::AarfCd => (
                0,
                stepping(SteppingParams {
                    min_success_threshold: 10,
                    max_success_threshold: 40,
                    adaptive: true,
                    failure_threshold: 1,
                    raise_timeout: None,
                }),
            ),
            RateControlAlgorithm::Cara => (
                0,
                stepping(SteppingParams {
                    min_success_threshold: 10,
                    max_success_threshold: 10,
                    adaptive: false,
                    failure_threshold: 2,
                    raise_timeout: Some(15),
                }),
            ),
            RateControlAlgorithm::Rraa => (0, ControllerState::Rraa(RraaState::default())),
            RateControlAlgorithm::Ideal => (0, ControllerState::Ideal),
        };

        Self { modes, index, state }
    }

    /// Mode to use for the next frame.
    pub fn current_mode(&self) -> DataMode {
        self.modes[self.index]
    }

    /// Feed back the outcome of the last frame.
    pub fn report(&mut self, outcome: TxOutcome) {
        let top = self.modes.len() - 1;
        match &mut self.state {
            ControllerState::Constant => {}
            ControllerState::Stepping(state) => {
                state.frames_since_change += 1;
                if outcome.delivered {
                    state.successes += 1;
                    state.failures = 0;
                    state.probing = false;
                    let timer_expired = state.params.raise_timeout.is_some_and(|timeout| state.frames_since_change >= timeout);
                    if (state.successes >= state.success_threshold || timer_expired) && self.index < top {
                        self.index += 1;
                        state.successes = 0;
                        state.frames_since_change = 0;
                        state.probing = true;
                    }
                } else {
                    state.failures += 1;
                    state.successes = 0;
                    if state.probing {
                        // The first frame after stepping up failed: fall back at once.
                        self.index = self.index.saturating_sub(1);
                        state.probing = false;
                        state.failures = 0;
                        state.frames_since_change = 0;
                        if state.params.adaptive {
                            state.success_threshold = (state.success_threshold * 2).min(state.params.max_success_threshold);
                        }
                    } else if state.failures >= state.params.failure_threshold {
                        self.index = self.index.saturating_sub(1);
                        state.failures = 0;
                        state.frames_since_change = 0;
                        if state.params.adaptive {
                            state.success_threshold = state.params.min_success_threshold;
                        }
                    }
                }
            }
            ControllerState::Rraa(state) => {
                state.sent += 1;
                if !outcome.delivered {
                    state.lost += 1;
                }
                let window = RRAA_WINDOW as f64;
                if state.lost as f64 > window * RRAA_MAX_TOLERABLE_LOSS {
                    // Loss already exceeds what the full window tolerates.
                    self.index = self.index.saturating_sub(1);
                    *state = RraaState::default();
                } else if state.sent >= RRAA_WINDOW {
                    let loss_ratio = state.lost as f64 / state.sent as f64;
                    if loss_ratio > RRAA_MAX_TOLERABLE_LOSS {
                        self.index = self.index.saturating_sub(1);
                    } else if loss_ratio < RRAA_OPPORTUNISTIC_LOSS && self.index < top {
                        self.index += 1;
                    }
                    *state = RraaState::default();
                }
            }
            ControllerState::Ideal => {
                self.index = self.modes.iter().rposition(|mode| mode.snr_threshold() <= outcome.snr).unwrap_or(0);
            }
        }
    }
}
