use crate::ModelError;
use ndarray::{Array1, ArrayBase, Axis, Data, Ix2};

/// Returns the index of the largest entry in every column
///
/// Columns are samples and rows are classes. When several entries share the maximum the
/// first (lowest) index wins. NaN entries are never selected over a number.
///
/// # Parameters
///
/// * `predictions` - Score or probability matrix with shape (num_classes, samples)
///
/// # Returns
///
/// * `Array1<usize>` - The predicted class index of each sample
///
/// # Example
/// ```rust
/// use flexnn::metric::argmax_columns;
/// use ndarray::array;
///
/// let probabilities = array![[0.1, 0.5], [0.7, 0.5], [0.2, 0.0]];
/// assert_eq!(argmax_columns(&probabilities), array![1, 0]);
/// ```
pub fn argmax_columns<S>(predictions: &ArrayBase<S, Ix2>) -> Array1<usize>
where
    S: Data<Elem = f64>,
{
    predictions
        .axis_iter(Axis(1))
        .map(|column| {
            let mut best_index = 0;
            let mut best_value = f64::NEG_INFINITY;
            for (i, &value) in column.iter().enumerate() {
                if value > best_value {
                    best_value = value;
                    best_index = i;
                }
            }
            best_index
        })
        .collect()
}

/// Fraction of samples whose arg-max prediction equals the true class index
///
/// # Parameters
///
/// - `predictions` - Score or probability matrix with shape (num_classes, samples)
/// - `labels` - True class index of each sample
///
/// # Returns
///
/// - `Ok(f64)` - Accuracy in the range \[0.0, 1.0\]
/// - `Err(ModelError::EmptyInput)` - If there are no samples
/// - `Err(ModelError::ShapeMismatch)` - If the label count differs from the sample count
///
/// # Example
/// ```rust
/// use flexnn::metric::categorical_accuracy;
/// use ndarray::array;
///
/// let probabilities = array![[0.9, 0.2, 0.4], [0.1, 0.8, 0.6]];
/// let labels = array![0, 1, 0];
/// let acc = categorical_accuracy(&probabilities, &labels).unwrap();
/// assert!((acc - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn categorical_accuracy<S>(
    predictions: &ArrayBase<S, Ix2>,
    labels: &Array1<usize>,
) -> Result<f64, ModelError>
where
    S: Data<Elem = f64>,
{
    let n_samples = predictions.ncols();

    if n_samples == 0 {
        return Err(ModelError::EmptyInput(
            "Cannot compute accuracy over zero samples".to_string(),
        ));
    }

    if labels.len() != n_samples {
        return Err(ModelError::ShapeMismatch(format!(
            "Predictions have {} samples but {} labels were given",
            n_samples,
            labels.len()
        )));
    }

    let correct_predictions = argmax_columns(predictions)
        .iter()
        .zip(labels.iter())
        .filter(|&(predicted, actual)| predicted == actual)
        .count();

    Ok(correct_predictions as f64 / n_samples as f64)
}
