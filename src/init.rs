use ndarray::{Array, Array2};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

/// Bound of the uniform distribution initial weights are drawn from.
pub const INIT_RANGE: f64 = 0.1;

fn uniform_weights<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64> {
    Array::random_using(
        (rows, cols),
        Uniform::new_inclusive(-INIT_RANGE, INIT_RANGE),
        rng,
    )
}

/// Weights of a single-layer network with `inputs` inputs and `neurons` neurons.
/// The matrix has no bias row; see `SingleLayer`.
pub fn init_single<R: Rng + ?Sized>(inputs: usize, neurons: usize, rng: &mut R) -> Array2<f64> {
    uniform_weights(inputs, neurons, rng)
}

/// Weights of a two-layer network: `(inputs + 1, hidden)` and `(hidden + 1, outputs)`.
/// Row 0 of each matrix is the bias row.
pub fn init_double<R: Rng + ?Sized>(
    inputs: usize,
    hidden: usize,
    outputs: usize,
    rng: &mut R,
) -> (Array2<f64>, Array2<f64>) {
    let w1 = uniform_weights(inputs + 1, hidden, rng);
    let w2 = uniform_weights(hidden + 1, outputs, rng);
    (w1, w2)
}
