use crate::ModelError;
use ndarray::{Array2, Axis, Zip};
use rayon::prelude::*;
use std::str::FromStr;

/// Number of columns above which softmax normalizes samples in parallel
const PARALLEL_COLUMN_THRESHOLD: usize = 8;

/// Activation function enum, supporting Identity, ReLU, and Softmax
///
/// `Identity` is the default and passes the pre-activation through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    #[default]
    Identity,
    ReLU,
    Softmax,
}

impl Activation {
    /// Forward application of activation functions
    ///
    /// Each column of `z` is one sample. Softmax is normalized per column after
    /// subtracting the column maximum, so every output column sums to 1.
    ///
    /// # Parameters
    ///
    /// - `z` - Pre-activation matrix with shape (units, samples)
    /// - `activation` - The activation function to apply
    ///
    /// # Returns
    ///
    /// * `Array2<f64>` - A new matrix with the activation function applied
    pub fn apply_activation(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
        match activation {
            Activation::Identity => z.clone(),
            Activation::ReLU => {
                let mut result = z.clone();
                result.par_mapv_inplace(|x| if x > 0.0 { x } else { 0.0 });
                result
            }
            Activation::Softmax => {
                let mut out = z.clone();

                if out.ncols() > PARALLEL_COLUMN_THRESHOLD {
                    out.axis_iter_mut(Axis(1))
                        .into_par_iter()
                        .for_each(|mut column| {
                            let max_val = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                            column.mapv_inplace(|x| (x - max_val).exp());
                            let sum = column.sum();
                            column.mapv_inplace(|x| x / sum);
                        });
                } else {
                    for mut column in out.axis_iter_mut(Axis(1)) {
                        let max_val = column.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                        column.mapv_inplace(|x| (x - max_val).exp());
                        let sum = column.sum();
                        column.mapv_inplace(|x| x / sum);
                    }
                }
                out
            }
        }
    }

    /// ReLU derivative evaluated at the pre-activation: 1 where `z > 0`, otherwise 0
    ///
    /// The sub-gradient at exactly 0 is taken as 0.
    pub fn relu_derivative(z: &Array2<f64>) -> Array2<f64> {
        z.mapv(|x| if x > 0.0 { 1.0 } else { 0.0 })
    }

    /// Backward rule for a softmax layer that is not the output layer
    ///
    /// Scales the upstream gradient element-wise by `softmax(z)`. This keeps only the
    /// diagonal of the softmax Jacobian and drops the `-s_i * s_j` cross terms, so it is
    /// an approximation of the true gradient. An output softmax layer never goes through
    /// this path because its error is taken from the loss directly.
    ///
    /// # Parameters
    ///
    /// - `z` - Pre-activation of the softmax layer with shape (units, samples)
    /// - `upstream` - `W_nextᵀ · δ_next`, same shape as `z`
    ///
    /// # Returns
    ///
    /// * `Array2<f64>` - The approximate gradient with respect to `z`
    pub fn softmax_backward(z: &Array2<f64>, upstream: &Array2<f64>) -> Array2<f64> {
        let probabilities = Self::apply_activation(z, Activation::Softmax);
        let mut result = Array2::<f64>::zeros(z.raw_dim());

        Zip::from(&mut result)
            .and(upstream)
            .and(&probabilities)
            .par_for_each(|r, &g, &s| *r = g * s);

        result
    }

    /// Applies this activation's derivative to the gradient coming from the next layer
    ///
    /// # Parameters
    ///
    /// - `upstream` - `W_nextᵀ · δ_next` with shape (units, samples)
    /// - `z` - This layer's cached pre-activation, same shape as `upstream`
    ///
    /// # Returns
    ///
    /// * `Array2<f64>` - The gradient with respect to this layer's pre-activation
    pub fn backward(self, upstream: Array2<f64>, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Identity => upstream,
            Activation::ReLU => upstream * &Self::relu_derivative(z),
            Activation::Softmax => Self::softmax_backward(z, &upstream),
        }
    }

    /// Returns the lowercase name accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            Activation::Identity => "identity",
            Activation::ReLU => "relu",
            Activation::Softmax => "softmax",
        }
    }
}

impl FromStr for Activation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" | "none" => Ok(Activation::Identity),
            "relu" => Ok(Activation::ReLU),
            "softmax" => Ok(Activation::Softmax),
            _ => Err(ModelError::UnrecognizedActivation(s.to_string())),
        }
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activation::Identity => write!(f, "Identity"),
            Activation::ReLU => write!(f, "ReLU"),
            Activation::Softmax => write!(f, "Softmax"),
        }
    }
}
