use ndarray::{arr2, Array2, ArrayView2, Axis};
use ndarray_rand::rand::Rng;

use crate::error::{Error, Result};

/// Training examples stored column-wise: column `j` of `inputs` is paired
/// with column `j` of `targets`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Array2<f64>,
    targets: Array2<f64>,
}

impl Dataset {
    pub fn new(inputs: Array2<f64>, targets: Array2<f64>) -> Result<Self> {
        if inputs.ncols() != targets.ncols() {
            return Err(Error::mismatch(
                "dataset targets",
                (targets.nrows(), inputs.ncols()),
                (targets.nrows(), targets.ncols()),
            ));
        }
        if inputs.ncols() == 0 {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { inputs, targets })
    }

    pub fn size(&self) -> usize {
        self.inputs.ncols()
    }

    pub fn input_dim(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn target_dim(&self) -> usize {
        self.targets.nrows()
    }

    pub fn inputs(&self) -> ArrayView2<'_, f64> {
        self.inputs.view()
    }

    pub fn targets(&self) -> ArrayView2<'_, f64> {
        self.targets.view()
    }

    /// Example `index` as a pair of single-column matrices.
    pub fn example(&self, index: usize) -> (ArrayView2<'_, f64>, ArrayView2<'_, f64>) {
        (
            self.inputs.slice_axis(Axis(1), (index..index + 1).into()),
            self.targets.slice_axis(Axis(1), (index..index + 1).into()),
        )
    }

    /// Uniformly drawn example index, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.size())
    }
}

/// XOR truth table: two binary inputs, one output.
pub fn xor() -> Dataset {
    Dataset {
        inputs: arr2(&[[0.0, 0.0, 1.0, 1.0], [0.0, 1.0, 0.0, 1.0]]),
        targets: arr2(&[[0.0, 1.0, 1.0, 0.0]]),
    }
}

/// Row labels of `animals()` targets.
pub const ANIMAL_CLASSES: [&str; 3] = ["mammal", "bird", "fish"];

/// Three animals described by five features each, one class per animal.
pub fn animals() -> Dataset {
    Dataset {
        inputs: arr2(&[
            [4.0, 2.0, -1.0],
            [0.01, -1.0, 3.5],
            [0.01, 2.0, 0.01],
            [-1.0, 2.5, -2.0],
            [-1.5, 2.0, 1.5],
        ]),
        targets: Array2::eye(3),
    }
}
