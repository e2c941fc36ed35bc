use crate::activation::{Sigmoid, DEFAULT_STEEPNESS};

/// Step-size adaptation driven by the output layer error.
///
/// After each update the rate is multiplied by `shrink` when the error grew by
/// more than `tolerance` relative to the previous step and the shrunk rate is
/// still at least `floor`. Otherwise it is multiplied by `growth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRate {
    pub growth: f64,
    pub shrink: f64,
    pub tolerance: f64,
    pub floor: f64,
}

impl Default for AdaptiveRate {
    fn default() -> Self {
        Self {
            growth: 1.05,
            shrink: 0.7,
            tolerance: 1.04,
            floor: 0.15,
        }
    }
}

impl AdaptiveRate {
    /// Next learning rate given the current one and two consecutive errors.
    // Growth is never capped, only shrinking is guarded by `floor`.
    pub fn adapt(&self, learning_rate: f64, error: f64, previous_error: f64) -> f64 {
        if error > self.tolerance * previous_error && self.shrink * learning_rate >= self.floor {
            self.shrink * learning_rate
        } else {
            self.growth * learning_rate
        }
    }
}

/// Hyperparameters of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub steepness: f64,
    pub learning_rate: f64,
    pub momentum: f64,
    pub adaptive: Option<AdaptiveRate>,
    /// No early stop before this many steps.
    pub min_steps: usize,
    /// Two layers only: how many previous output errors are inspected for spikes.
    pub lookback: usize,
    /// Two layers only: `error / target` at or above this ratio counts as a spike.
    pub spike_ratio: f64,
}

impl TrainConfig {
    /// Fixed rate, no momentum, at least 10 steps before an early stop.
    pub fn single_layer() -> Self {
        Self {
            steepness: DEFAULT_STEEPNESS,
            learning_rate: 0.1,
            momentum: 0.0,
            adaptive: None,
            min_steps: 10,
            lookback: 0,
            spike_ratio: f64::INFINITY,
        }
    }

    /// Momentum 0.7, adaptive rate, 40-step spike window.
    pub fn two_layer() -> Self {
        Self {
            steepness: DEFAULT_STEEPNESS,
            learning_rate: 0.1,
            momentum: 0.7,
            adaptive: Some(AdaptiveRate::default()),
            min_steps: 0,
            lookback: 40,
            spike_ratio: 10.0,
        }
    }

    pub fn with_steepness(self, steepness: f64) -> Self {
        Self { steepness, ..self }
    }

    pub fn with_learning_rate(self, learning_rate: f64) -> Self {
        Self {
            learning_rate,
            ..self
        }
    }

    pub fn with_momentum(self, momentum: f64) -> Self {
        Self { momentum, ..self }
    }

    pub fn with_adaptive(self, adaptive: Option<AdaptiveRate>) -> Self {
        Self { adaptive, ..self }
    }

    pub fn with_min_steps(self, min_steps: usize) -> Self {
        Self { min_steps, ..self }
    }

    pub fn with_lookback(self, lookback: usize) -> Self {
        Self { lookback, ..self }
    }

    pub fn activation(&self) -> Sigmoid {
        Sigmoid::new(self.steepness)
    }
}
