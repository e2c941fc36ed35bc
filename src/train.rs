use ndarray::{s, Array2, ArrayView2, Ix2};
use ndarray_rand::rand::Rng;
use tracing::{debug, info, trace};

use crate::config::TrainConfig;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::network::{with_bias_row, SingleLayer, TwoLayer, TwoLayerOutputs};
use crate::trace::ErrorTrace;

/// When a training run ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Number of steps the loop is allowed to run.
    pub max_epochs: usize,
    /// Hard ceiling; reaching it ends training even if the error is low.
    pub step_ceiling: usize,
    /// Error the network has to reach for an early stop.
    pub target_error: f64,
}

impl Limits {
    pub fn new(max_epochs: usize, step_ceiling: usize, target_error: f64) -> Self {
        Self {
            max_epochs,
            step_ceiling,
            target_error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The step ceiling was reached.
    StepLimit,
    /// The early-stop condition held.
    Converged,
    /// All `max_epochs` steps ran without reaching either of the above.
    EpochsExhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleLayerOutcome {
    pub weights: Array2<f64>,
    pub trace: ErrorTrace,
    pub stop: StopReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayerOutcome {
    pub hidden: Array2<f64>,
    pub output: Array2<f64>,
    /// Backpropagated error of the hidden layer.
    pub hidden_trace: ErrorTrace,
    pub output_trace: ErrorTrace,
    pub stop: StopReason,
}

/// Weight update with momentum: `rate * x * delta^T + coefficient * previous`.
struct Momentum {
    coefficient: f64,
    previous: Array2<f64>,
}

impl Momentum {
    fn new(coefficient: f64, shape: Ix2) -> Self {
        Self {
            coefficient,
            previous: Array2::zeros(shape),
        }
    }

    fn step(
        &mut self,
        learning_rate: f64,
        inputs: ArrayView2<f64>,
        deltas: &Array2<f64>,
    ) -> &Array2<f64> {
        let update = inputs.dot(&deltas.t()) * learning_rate + &self.previous * self.coefficient;
        self.previous = update;
        &self.previous
    }
}

fn squared_error(differences: &Array2<f64>) -> f64 {
    differences.fold(0.0, |sum, d| sum + d * d / 2.0)
}

/// The ceiling wins over convergence when both hold at the same step.
fn stop_reason(step: usize, limits: &Limits, converged: bool) -> Option<StopReason> {
    if step >= limits.step_ceiling {
        Some(StopReason::StepLimit)
    } else if converged {
        Some(StopReason::Converged)
    } else {
        None
    }
}

/// Single layer early stop: the latest error is at most `target_error` and at
/// least `min_steps` steps have been recorded.
pub fn single_layer_converged(trace: &ErrorTrace, target_error: f64, min_steps: usize) -> bool {
    match trace.last() {
        Some(error) => error <= target_error && trace.len() >= min_steps,
        None => false,
    }
}

/// Two layer early stop: the latest output error is at most `target_error` and
/// none of the `lookback` errors before it reached `spike_ratio * target_error`.
/// While fewer than `lookback` earlier errors exist the spike check is skipped.
pub fn two_layer_converged(
    trace: &ErrorTrace,
    target_error: f64,
    lookback: usize,
    spike_ratio: f64,
) -> bool {
    match trace.last() {
        Some(error) if error <= target_error => {}
        _ => return false,
    }
    match trace.preceding(lookback) {
        Some(mut window) => !window.any(|error| error / target_error >= spike_ratio),
        None => true,
    }
}

/// Train a single-layer network by online gradient descent.
///
/// `weights` has shape `(dataset.input_dim(), dataset.target_dim())`.
pub fn train_single<R: Rng + ?Sized>(
    weights: Array2<f64>,
    dataset: &Dataset,
    limits: &Limits,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<SingleLayerOutcome> {
    let expected = (dataset.input_dim(), dataset.target_dim());
    if weights.dim() != expected {
        return Err(Error::mismatch("single layer weights", expected, weights.dim()));
    }

    let activation = config.activation();
    let mut layer = SingleLayer::new(weights, activation);
    let mut momentum = Momentum::new(config.momentum, layer.weights().raw_dim());
    let mut learning_rate = config.learning_rate;
    let mut previous_error = 0.0;
    let mut errors = ErrorTrace::with_capacity(limits.max_epochs.min(limits.step_ceiling));
    let mut stop = StopReason::EpochsExhausted;

    debug!(
        inputs = layer.inputs(),
        neurons = layer.neurons(),
        ?limits,
        "training single layer network"
    );

    for step in 1..=limits.max_epochs {
        let (x, t) = dataset.example(dataset.sample(rng));
        let y = layer.forward(x)?;

        let d = &t - &y;
        let e = &d * &activation.derivative_from_output(y.view());

        let error = squared_error(&d);
        errors.push(error);
        trace!(step, error, learning_rate, "single layer step");

        let converged = single_layer_converged(&errors, limits.target_error, config.min_steps);
        if let Some(reason) = stop_reason(step, limits, converged) {
            stop = reason;
            break;
        }

        *layer.weights_mut() += momentum.step(learning_rate, x, &e);

        if let Some(rule) = &config.adaptive {
            learning_rate = rule.adapt(learning_rate, error, previous_error);
        }
        previous_error = error;
    }

    info!(steps = errors.len(), ?stop, "single layer training finished");

    Ok(SingleLayerOutcome {
        weights: layer.into_weights(),
        trace: errors,
        stop,
    })
}

/// Train a two-layer network by online backpropagation with momentum.
///
/// `hidden` has shape `(dataset.input_dim() + 1, k)` and `output` has shape
/// `(k + 1, dataset.target_dim())`.
pub fn train_double<R: Rng + ?Sized>(
    hidden: Array2<f64>,
    output: Array2<f64>,
    dataset: &Dataset,
    limits: &Limits,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<TwoLayerOutcome> {
    let activation = config.activation();
    let mut network = TwoLayer::new(hidden, output, activation)?;
    if network.inputs() != dataset.input_dim() {
        return Err(Error::mismatch(
            "hidden layer weights",
            (dataset.input_dim() + 1, network.hidden_neurons()),
            network.hidden_weights().dim(),
        ));
    }
    if network.outputs() != dataset.target_dim() {
        return Err(Error::mismatch(
            "output layer weights",
            (network.hidden_neurons() + 1, dataset.target_dim()),
            network.output_weights().dim(),
        ));
    }

    let mut hidden_momentum = Momentum::new(config.momentum, network.hidden_weights().raw_dim());
    let mut output_momentum = Momentum::new(config.momentum, network.output_weights().raw_dim());
    let mut learning_rate = config.learning_rate;
    let mut previous_error = 0.0;
    let capacity = limits.max_epochs.min(limits.step_ceiling);
    let mut hidden_errors = ErrorTrace::with_capacity(capacity);
    let mut output_errors = ErrorTrace::with_capacity(capacity);
    let mut stop = StopReason::EpochsExhausted;

    debug!(
        inputs = network.inputs(),
        hidden = network.hidden_neurons(),
        outputs = network.outputs(),
        ?limits,
        "training two layer network"
    );

    for step in 1..=limits.max_epochs {
        let (x, t) = dataset.example(dataset.sample(rng));
        let TwoLayerOutputs {
            hidden: y1,
            output: y2,
        } = network.forward(x)?;
        let x1 = with_bias_row(x);
        let x2 = with_bias_row(y1.view());

        let d2 = &t - &y2;
        let e2 = &d2 * &activation.derivative_from_output(y2.view());

        // bias row carries no error back
        let d1 = network.output_weights().slice(s![1.., ..]).dot(&e2);
        let e1 = &d1 * &activation.derivative_from_output(y1.view());

        let hidden_error = squared_error(&d1);
        let output_error = squared_error(&d2);
        hidden_errors.push(hidden_error);
        output_errors.push(output_error);
        trace!(
            step,
            hidden_error,
            output_error,
            learning_rate,
            "two layer step"
        );

        let converged = output_errors.len() >= config.min_steps
            && two_layer_converged(
                &output_errors,
                limits.target_error,
                config.lookback,
                config.spike_ratio,
            );
        if let Some(reason) = stop_reason(step, limits, converged) {
            stop = reason;
            break;
        }

        let (w1, w2) = network.weights_mut();
        *w1 += hidden_momentum.step(learning_rate, x1.view(), &e1);
        *w2 += output_momentum.step(learning_rate, x2.view(), &e2);

        if let Some(rule) = &config.adaptive {
            learning_rate = rule.adapt(learning_rate, output_error, previous_error);
        }
        previous_error = output_error;
    }

    info!(
        steps = output_errors.len(),
        ?stop,
        learning_rate,
        "two layer training finished"
    );

    let (hidden, output) = network.into_weights();
    Ok(TwoLayerOutcome {
        hidden,
        output,
        hidden_trace: hidden_errors,
        output_trace: output_errors,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr2;

    use super::*;
    use crate::data::{animals, xor};
    use crate::init::{init_double, init_single};
    use approx::assert_relative_eq;
    use ndarray::arr2;
    use ndarray_rand::rand::{rngs::StdRng, SeedableRng};

    fn single_example() -> Dataset {
        Dataset::new(arr2(&[[1.0]]), arr2(&[[1.0]])).unwrap()
    }

    #[test]
    fn momentum_keeps_fraction_of_previous_update() {
        let mut momentum = Momentum::new(0.7, Ix2(2, 1));
        let x = arr2(&[[1.0], [2.0]]);
        let delta = arr2(&[[0.5]]);

        let first = momentum.step(0.1, x.view(), &delta).clone();
        assert_rel_eq_arr2!(first, arr2(&[[0.05], [0.1]]));

        let second = momentum.step(0.2, x.view(), &delta).clone();
        assert_rel_eq_arr2!(second, arr2(&[[0.135], [0.27]]));
    }

    #[test]
    fn ceiling_takes_precedence_over_convergence() {
        let limits = Limits::new(100, 5, 0.1);
        assert_eq!(Some(StopReason::StepLimit), stop_reason(5, &limits, true));
        assert_eq!(Some(StopReason::Converged), stop_reason(4, &limits, true));
        assert_eq!(None, stop_reason(4, &limits, false));
    }

    #[test]
    fn single_layer_needs_min_steps() {
        let trace: ErrorTrace = vec![0.5, 0.3, 0.0001].into_iter().collect();
        assert!(!single_layer_converged(&trace, 0.0002, 10));

        let trace: ErrorTrace = (0..10).map(|_| 0.0001).collect();
        assert!(single_layer_converged(&trace, 0.0002, 10));
    }

    #[test]
    fn two_layer_spike_in_window_blocks_stop() {
        let target = 0.0003;
        let mut errors = vec![target * 2.0; 49];
        // step 45 is a 10x spike
        errors[44] = target * 10.0;
        let mut trace: ErrorTrace = errors.into_iter().collect();
        trace.push(target / 2.0);
        assert_eq!(50, trace.len());
        assert!(!two_layer_converged(&trace, target, 40, 10.0));
    }

    #[test]
    fn two_layer_stops_without_spike() {
        let target = 0.0003;
        let mut trace: ErrorTrace = (1..=49).map(|_| target * 9.0).collect();
        trace.push(target);
        assert!(two_layer_converged(&trace, target, 40, 10.0));
    }

    #[test]
    fn two_layer_ignores_spike_outside_window() {
        let target = 0.0003;
        let mut errors = vec![target; 49];
        // step 9 is older than steps 10..=49
        errors[8] = target * 100.0;
        let mut trace: ErrorTrace = errors.into_iter().collect();
        trace.push(target);
        assert!(two_layer_converged(&trace, target, 40, 10.0));
    }

    #[test]
    fn two_layer_short_history_does_not_block_stop() {
        let target = 0.0003;
        // only 4 earlier errors, all of them far above the target
        let trace: ErrorTrace = vec![0.125, 0.1, 0.05, 0.01, 0.0001].into_iter().collect();
        assert!(two_layer_converged(&trace, target, 40, 10.0));
        let trace: ErrorTrace = vec![target].into_iter().collect();
        assert!(two_layer_converged(&trace, target, 40, 10.0));
        // the latest error still has to reach the target
        let trace: ErrorTrace = vec![0.125, 0.1, 0.05, 0.01].into_iter().collect();
        assert!(!two_layer_converged(&trace, target, 40, 10.0));
    }

    #[test]
    fn two_layer_spike_checked_once_window_is_full() {
        let target = 0.0003;
        let mut errors = vec![target; 40];
        errors[0] = 1.0;
        let mut trace: ErrorTrace = errors.into_iter().collect();
        trace.push(target);
        assert!(!two_layer_converged(&trace, target, 40, 10.0));
    }

    #[test]
    fn single_layer_one_step_update() {
        let limits = Limits::new(1, 10, -1.0);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = train_single(
            Array2::zeros((1, 1)),
            &single_example(),
            &limits,
            &TrainConfig::single_layer(),
            &mut rng,
        )
        .unwrap();

        // y = 0.5, d = 0.5, e = 5 * 0.5 * 0.25
        assert_rel_eq_arr2!(outcome.weights, arr2(&[[0.0625]]));
        assert_eq!(vec![(1, 0.125)], outcome.trace.iter().collect::<Vec<_>>());
        assert_eq!(StopReason::EpochsExhausted, outcome.stop);
    }

    #[test]
    fn single_layer_stops_at_ceiling() {
        let data = animals();
        let mut rng = StdRng::seed_from_u64(1);
        let weights = init_single(5, 3, &mut rng);
        let limits = Limits::new(70, 40, -1.0);
        let outcome =
            train_single(weights, &data, &limits, &TrainConfig::single_layer(), &mut rng)
                .unwrap();
        assert_eq!(40, outcome.trace.len());
        assert_eq!(StopReason::StepLimit, outcome.stop);
    }

    #[test]
    fn single_layer_never_converges_before_min_steps() {
        let data = animals();
        let mut rng = StdRng::seed_from_u64(2);
        let weights = init_single(5, 3, &mut rng);
        // every error is below this target
        let limits = Limits::new(70, 40, 10.0);
        let outcome =
            train_single(weights, &data, &limits, &TrainConfig::single_layer(), &mut rng)
                .unwrap();
        assert_eq!(10, outcome.trace.len());
        assert_eq!(StopReason::Converged, outcome.stop);
    }

    #[test]
    fn single_layer_rejects_mismatched_weights() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = train_single(
            Array2::zeros((4, 3)),
            &animals(),
            &Limits::new(10, 10, 0.1),
            &TrainConfig::single_layer(),
            &mut rng,
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn two_layer_one_step_update() {
        let limits = Limits::new(1, 10, -1.0);
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = train_double(
            Array2::zeros((2, 1)),
            Array2::zeros((2, 1)),
            &single_example(),
            &limits,
            &TrainConfig::two_layer(),
            &mut rng,
        )
        .unwrap();

        // zero output weights propagate no error to the hidden layer
        assert_rel_eq_arr2!(outcome.hidden, arr2(&[[0.0], [0.0]]));
        assert_rel_eq_arr2!(outcome.output, arr2(&[[-0.0625], [0.03125]]));
        assert_relative_eq!(0.0, outcome.hidden_trace.get(1).unwrap());
        assert_relative_eq!(0.125, outcome.output_trace.get(1).unwrap());
    }

    #[test]
    fn two_layer_traces_grow_together_up_to_ceiling() {
        let data = xor();
        let mut rng = StdRng::seed_from_u64(5);
        let (w1, w2) = init_double(2, 2, 1, &mut rng);
        let limits = Limits::new(500, 120, -1.0);
        let outcome =
            train_double(w1, w2, &data, &limits, &TrainConfig::two_layer(), &mut rng).unwrap();
        assert_eq!(120, outcome.output_trace.len());
        assert_eq!(120, outcome.hidden_trace.len());
        assert_eq!(StopReason::StepLimit, outcome.stop);
    }

    #[test]
    fn two_layer_stops_early_on_reachable_target() {
        let data = xor();
        let mut rng = StdRng::seed_from_u64(5);
        let (w1, w2) = init_double(2, 2, 1, &mut rng);
        // every output error is at most 0.5
        let limits = Limits::new(500, 120, 1.0);
        let outcome =
            train_double(w1, w2, &data, &limits, &TrainConfig::two_layer(), &mut rng).unwrap();
        assert_eq!(1, outcome.output_trace.len());
        assert_eq!(StopReason::Converged, outcome.stop);
    }

    #[test]
    fn two_layer_min_steps_delays_stop() {
        let data = xor();
        let mut rng = StdRng::seed_from_u64(5);
        let (w1, w2) = init_double(2, 2, 1, &mut rng);
        let limits = Limits::new(500, 120, 1.0);
        let config = TrainConfig::two_layer().with_min_steps(41);
        let outcome = train_double(w1, w2, &data, &limits, &config, &mut rng).unwrap();
        assert_eq!(41, outcome.output_trace.len());
        assert_eq!(StopReason::Converged, outcome.stop);
    }

    #[test]
    fn two_layer_rejects_mismatched_weights() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = train_double(
            Array2::zeros((4, 2)),
            Array2::zeros((3, 1)),
            &xor(),
            &Limits::new(10, 10, 0.1),
            &TrainConfig::two_layer(),
            &mut rng,
        );
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn same_seed_same_outcome() {
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let (w1, w2) = init_double(2, 2, 1, &mut rng);
            train_double(
                w1,
                w2,
                &xor(),
                &Limits::new(300, 300, 0.0003),
                &TrainConfig::two_layer(),
                &mut rng,
            )
            .unwrap()
        };
        assert_eq!(run(9), run(9));
    }
}
