use ndarray::{Array2, ArrayBase, Data, Ix2};

/// Lower clipping bound applied to predictions before taking the logarithm
const EPSILON: f64 = 1e-7;

/// Categorical Cross Entropy loss function for multi-class classification
///
/// Targets are one-hot matrices with shape (num_classes, samples) and predictions are the
/// softmax output of the final layer with the same shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoricalCrossEntropy;

impl CategoricalCrossEntropy {
    /// Creates a new instance of CategoricalCrossEntropy
    pub fn new() -> Self {
        Self {}
    }

    /// Computes the mean loss over samples: `-Σ y_true·ln(y_pred) / samples`
    ///
    /// Returns 0.0 when there are no samples.
    pub fn compute_loss<S>(&self, y_true: &Array2<f64>, y_pred: &ArrayBase<S, Ix2>) -> f64
    where
        S: Data<Elem = f64>,
    {
        let n = y_true.ncols();
        if n == 0 {
            return 0.0;
        }

        // Keep log() finite
        let y_pred_clipped = y_pred.mapv(|x| x.max(EPSILON).min(1.0 - EPSILON));
        let losses = y_true * &y_pred_clipped.mapv(f64::ln);

        -losses.sum() / n as f64
    }

    /// Gradient of the loss with respect to the pre-activation of a softmax output layer
    ///
    /// Softmax followed by categorical cross entropy collapses to `y_pred - y_true`. This
    /// only holds for that pairing and is not a general rule for other losses.
    pub fn output_delta<S>(
        &self,
        y_true: &Array2<f64>,
        y_pred: &ArrayBase<S, Ix2>,
    ) -> Array2<f64>
    where
        S: Data<Elem = f64>,
    {
        y_pred - y_true
    }
}
