use ndarray::{Array2, ArrayView2};

/// Steepness used by every network in this crate unless configured otherwise.
pub const DEFAULT_STEEPNESS: f64 = 5.0;

/// Logistic function `1 / (1 + exp(-beta * x))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigmoid {
    steepness: f64,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self::new(DEFAULT_STEEPNESS)
    }
}

impl Sigmoid {
    pub fn new(steepness: f64) -> Self {
        Self { steepness }
    }

    pub fn steepness(&self) -> f64 {
        self.steepness
    }

    fn compute_one(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-self.steepness * x).exp())
    }

    pub fn compute(&self, x: &Array2<f64>) -> Array2<f64> {
        x.map(|&v| self.compute_one(v))
    }

    /// Derivative expressed through the already computed outputs `y`:
    /// `beta * y * (1 - y)`.
    pub fn derivative_from_output(&self, y: ArrayView2<f64>) -> Array2<f64> {
        y.map(|&w| self.steepness * w * (1.0 - w))
    }
}
