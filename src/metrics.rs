use ndarray::{ArrayView2, Axis};

/// Compute accuracy of the predicted labels `y_pred` to the correct labels `y_true`.
pub fn accuracy<Label>(y_true: &[Label], y_pred: &[Label]) -> f32
where
    Label: Eq,
{
    let n_corrects = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    n_corrects as f32 / y_true.len() as f32
}

/// Row index of the largest entry of each column, i.e. the predicted class of
/// every example when examples are stored column-wise.
pub fn argmax_columns(matrix: ArrayView2<f64>) -> Vec<usize> {
    matrix
        .lanes(Axis(0))
        .into_iter()
        .map(|column| {
            column
                .iter()
                .enumerate()
                .fold(
                    (0, f64::NEG_INFINITY),
                    |(max_index, max_elem), (index, &elem)| {
                        if elem > max_elem {
                            (index, elem)
                        } else {
                            (max_index, max_elem)
                        }
                    },
                )
                .0
        })
        .collect()
}

/// Fraction of columns whose largest output sits in the same row as the
/// largest target.
pub fn classification_accuracy(outputs: ArrayView2<f64>, targets: ArrayView2<f64>) -> f32 {
    accuracy(&argmax_columns(targets), &argmax_columns(outputs))
}
