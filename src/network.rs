use ndarray::{s, Array2, ArrayView2};

use crate::activation::Sigmoid;
use crate::error::{Error, Result};

/// Constant input paired with the bias row of a weight matrix.
pub const BIAS_INPUT: f64 = -1.0;

/// Prepend a row of `BIAS_INPUT` to column vectors `x`.
pub fn with_bias_row(x: ArrayView2<f64>) -> Array2<f64> {
    let mut biased = Array2::from_elem((x.nrows() + 1, x.ncols()), BIAS_INPUT);
    biased.slice_mut(s![1.., ..]).assign(&x);
    biased
}

fn dims(x: &ArrayView2<f64>) -> (usize, usize) {
    (x.nrows(), x.ncols())
}

/// One fully connected sigmoid layer.
///
/// The weight matrix has shape `(inputs, neurons)`. No bias row is added to
/// the inputs, so a bias has to be part of the data itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleLayer {
    weights: Array2<f64>,
    activation: Sigmoid,
}

impl SingleLayer {
    pub fn new(weights: Array2<f64>, activation: Sigmoid) -> Self {
        Self {
            weights,
            activation,
        }
    }

    pub fn inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn neurons(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f64> {
        &mut self.weights
    }

    pub fn into_weights(self) -> Array2<f64> {
        self.weights
    }

    /// `inputs` holds one example per column. Returns `(neurons, examples)`.
    pub fn forward(&self, inputs: ArrayView2<f64>) -> Result<Array2<f64>> {
        if inputs.nrows() != self.inputs() {
            return Err(Error::mismatch(
                "single layer inputs",
                (self.inputs(), inputs.ncols()),
                dims(&inputs),
            ));
        }
        let dot_products = self.weights.t().dot(&inputs);
        Ok(self.activation.compute(&dot_products))
    }
}

/// Hidden and output layer outputs of a `TwoLayer` forward pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayerOutputs {
    pub hidden: Array2<f64>,
    pub output: Array2<f64>,
}

/// Two chained sigmoid layers. Both weight matrices carry a bias row at index 0.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoLayer {
    hidden: Array2<f64>,
    output: Array2<f64>,
    activation: Sigmoid,
}

impl TwoLayer {
    /// Fails when the output layer does not take `hidden neurons + 1` inputs.
    pub fn new(hidden: Array2<f64>, output: Array2<f64>, activation: Sigmoid) -> Result<Self> {
        if hidden.nrows() == 0 {
            return Err(Error::mismatch(
                "hidden layer weights",
                (1, hidden.ncols()),
                (0, hidden.ncols()),
            ));
        }
        if output.nrows() != hidden.ncols() + 1 {
            return Err(Error::mismatch(
                "output layer weights",
                (hidden.ncols() + 1, output.ncols()),
                (output.nrows(), output.ncols()),
            ));
        }
        Ok(Self {
            hidden,
            output,
            activation,
        })
    }

    pub fn inputs(&self) -> usize {
        self.hidden.nrows() - 1
    }

    pub fn hidden_neurons(&self) -> usize {
        self.hidden.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.output.ncols()
    }

    pub fn hidden_weights(&self) -> &Array2<f64> {
        &self.hidden
    }

    pub fn output_weights(&self) -> &Array2<f64> {
        &self.output
    }

    pub(crate) fn weights_mut(&mut self) -> (&mut Array2<f64>, &mut Array2<f64>) {
        (&mut self.hidden, &mut self.output)
    }

    pub fn into_weights(self) -> (Array2<f64>, Array2<f64>) {
        (self.hidden, self.output)
    }

    /// `inputs` holds raw examples, one per column, without the bias row.
    pub fn forward(&self, inputs: ArrayView2<f64>) -> Result<TwoLayerOutputs> {
        if inputs.nrows() != self.inputs() {
            return Err(Error::mismatch(
                "two layer inputs",
                (self.inputs(), inputs.ncols()),
                dims(&inputs),
            ));
        }
        let x1 = with_bias_row(inputs);
        let hidden = self.activation.compute(&self.hidden.t().dot(&x1));

        let x2 = with_bias_row(hidden.view());
        let output = self.activation.compute(&self.output.t().dot(&x2));

        Ok(TwoLayerOutputs { hidden, output })
    }
}
