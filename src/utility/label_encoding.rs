use crate::ModelError;
use ndarray::{Array1, Array2};

/// Converts integer class labels to a one-hot matrix with one column per sample
///
/// The result has shape (num_classes, n_samples). Column `j` holds 1.0 in row `labels[j]`
/// and 0.0 elsewhere. The class count is given explicitly rather than inferred from the
/// largest label, so a batch that lacks the highest class still matches the output layer.
///
/// # Parameters
///
/// - `labels` - A 1D array of class indices (e.g., \[0, 2, 1\])
/// - `num_classes` - Number of rows of the encoded matrix
///
/// # Returns
///
/// - `Ok(Array2<f64>)` - One-hot matrix of shape (num_classes, n_samples)
/// - `Err(ModelError::InvalidDimension)` - If `num_classes` is zero
/// - `Err(ModelError::InputValidationError)` - If a label is not below `num_classes`
///
/// # Examples
///
/// ```rust
/// use ndarray::array;
/// use flexnn::utility::one_hot_encode;
///
/// let encoded = one_hot_encode(&array![0, 2, 1], 3).unwrap();
/// // Columns: [1, 0, 0], [0, 0, 1], [0, 1, 0]
/// assert_eq!(encoded, array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]]);
/// ```
pub fn one_hot_encode(
    labels: &Array1<usize>,
    num_classes: usize,
) -> Result<Array2<f64>, ModelError> {
    if num_classes == 0 {
        return Err(ModelError::InvalidDimension(
            "num_classes must be greater than 0".to_string(),
        ));
    }

    if let Some((index, &label)) = labels
        .iter()
        .enumerate()
        .find(|&(_, &label)| label >= num_classes)
    {
        return Err(ModelError::InputValidationError(format!(
            "Label {} at sample {} is out of range for {} classes",
            label, index, num_classes
        )));
    }

    let mut encoded = Array2::<f64>::zeros((num_classes, labels.len()));
    for (sample, &label) in labels.iter().enumerate() {
        encoded[[label, sample]] = 1.0;
    }

    Ok(encoded)
}

/// Number of classes implied by the largest label, `max(labels) + 1`
///
/// Useful to pick a class count once for a whole dataset before it is split.
///
/// # Returns
///
/// - `Ok(usize)` - The class count, 0 for an empty label array
/// - `Err(ModelError::InputValidationError)` - If the largest label is `usize::MAX`
pub fn infer_num_classes(labels: &Array1<usize>) -> Result<usize, ModelError> {
    match labels.iter().max() {
        None => Ok(0),
        Some(&max_label) => max_label.checked_add(1).ok_or_else(|| {
            ModelError::InputValidationError(format!(
                "Label {} is too large to derive a class count",
                max_label
            ))
        }),
    }
}
