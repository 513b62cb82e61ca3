use crate::ModelError;
use ndarray::{Array1, Array2, Axis};
use rand::Rng;
use rand::seq::SliceRandom;

/// Tolerance on the sum of split proportions
const PROPORTION_TOLERANCE: f64 = 1e-9;

/// Splits a dataset into several shuffled parts according to proportions
///
/// Row indices are shuffled with `rng`, then cut into consecutive chunks of
/// `floor(proportion * n_samples)` rows. The last chunk absorbs the rounding remainder, so
/// the sizes always add up to `n_samples` and every row lands in exactly one part.
///
/// # Parameters
///
/// - `x` - Feature matrix with shape (n_samples, n_features)
/// - `y` - Class labels with length n_samples
/// - `proportions` - Share of rows for each part, e.g. `[0.7, 0.2, 0.1]` for train/validation/test
/// - `rng` - Random number generator used for shuffling; pass a seeded `StdRng` for reproducible splits
///
/// # Returns
///
/// - `Ok(Vec<(Array2<f64>, Array1<usize>)>)` - One `(x, y)` pair per proportion, in the same order
/// - `Err(ModelError::InputValidationError)` - If the dataset is empty, `x` and `y` have different
///   lengths, no proportions are given, a proportion is negative or not finite, or the
///   proportions add up to more than 1
///
/// # Example
/// ```rust
/// use flexnn::utility::split_xy;
/// use ndarray::{Array1, Array2};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f64);
/// let y = Array1::from_shape_fn(10, |i| i % 2);
/// let mut rng = StdRng::seed_from_u64(42);
///
/// let splits = split_xy(&x, &y, &[0.9, 0.1], &mut rng).unwrap();
/// assert_eq!(splits[0].0.nrows(), 9);
/// assert_eq!(splits[1].0.nrows(), 1);
/// ```
pub fn split_xy<R: Rng + ?Sized>(
    x: &Array2<f64>,
    y: &Array1<usize>,
    proportions: &[f64],
    rng: &mut R,
) -> Result<Vec<(Array2<f64>, Array1<usize>)>, ModelError> {
    let n_samples = x.nrows();

    if n_samples == 0 {
        return Err(ModelError::InputValidationError(
            "Cannot split empty dataset".to_string(),
        ));
    }

    if n_samples != y.len() {
        return Err(ModelError::InputValidationError(format!(
            "x and y must have the same number of samples, x rows: {}, y length: {}",
            n_samples,
            y.len()
        )));
    }

    if proportions.is_empty() {
        return Err(ModelError::InputValidationError(
            "At least one split proportion is required".to_string(),
        ));
    }

    if let Some(&bad) = proportions.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(ModelError::InputValidationError(format!(
            "Split proportions must be finite and non-negative, got {}",
            bad
        )));
    }

    let proportion_sum: f64 = proportions.iter().sum();
    if proportion_sum > 1.0 + PROPORTION_TOLERANCE {
        return Err(ModelError::InputValidationError(format!(
            "Split proportions must not add up to more than 1, got {}",
            proportion_sum
        )));
    }

    let mut sizes: Vec<usize> = proportions
        .iter()
        .map(|&p| (p * n_samples as f64).floor() as usize)
        .collect();

    let assigned: usize = sizes.iter().sum();
    if assigned > n_samples {
        return Err(ModelError::InputValidationError(format!(
            "Split sizes add up to {} rows but the dataset only has {}",
            assigned, n_samples
        )));
    }

    // Last split takes whatever rounding left over
    if let Some(last) = sizes.last_mut() {
        *last += n_samples - assigned;
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    indices.shuffle(rng);

    let mut splits = Vec::with_capacity(sizes.len());
    let mut start = 0;
    for size in sizes {
        let part = &indices[start..start + size];
        splits.push((x.select(Axis(0), part), y.select(Axis(0), part)));
        start += size;
    }

    Ok(splits)
}
