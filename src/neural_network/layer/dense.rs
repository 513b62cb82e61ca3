use super::validate_layer_dimensions;
use crate::ModelError;
use crate::neural_network::Activation;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2, Zip};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Half-width of the uniform distribution used to initialize weights and biases
const INIT_RANGE: f64 = 0.5;

/// Dense (Fully Connected) layer implementation for neural networks.
///
/// This layer performs a linear transformation of its input followed by an activation
/// function: `Z = W·X + b`, `A = activation(Z)`. Samples are stored as columns, so an input
/// batch has shape (input_dim, batch_size) and the bias is broadcast across columns.
///
/// Weights and biases are drawn independently from `Uniform(-0.5, 0.5)`.
///
/// The layer keeps no forward-pass state. The caller holds on to `Z` and `A` (see
/// `ForwardCache`) and hands them back for the backward pass, which keeps `forward` and
/// `backward` pure and lets `predict` run through `&self`.
///
/// # Dimensions
///
/// - Input shape: (input_dim, batch_size)
/// - Output shape: (output_dim, batch_size)
///
/// # Fields
///
/// - `input_dim` - Input dimension size
/// - `output_dim` - Output dimension size
/// - `weights` - Weight matrix with shape (output_dim, input_dim)
/// - `bias` - Bias vector with length output_dim
/// - `activation` - Activation function for the layer
///
/// # Example
/// ```rust
/// use flexnn::neural_network::*;
/// use ndarray::Array2;
///
/// let dense = Dense::new(4, 3, Activation::ReLU).unwrap();
/// let input = Array2::<f64>::ones((4, 2)); // 4 features, 2 samples
///
/// let (z, a) = dense.forward(&input).unwrap();
/// assert_eq!(z.shape(), &[3, 2]);
/// assert!(a.iter().all(|&v| v >= 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct Dense {
    input_dim: usize,
    output_dim: usize,
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl Dense {
    /// Creates a new dense layer with weights drawn from the thread-local generator.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features
    /// - `output_dim` - Number of units
    /// - `activation` - Activation function applied after the linear transformation
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Dense layer instance with specified dimensions
    /// - `Err(ModelError::InvalidDimension)` - If either size is zero
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        Self::new_with_rng(input_dim, output_dim, activation, &mut rand::rng())
    }

    /// Creates a new dense layer drawing its initial parameters from `rng`.
    ///
    /// Passing a seeded generator makes initialization reproducible.
    ///
    /// # Parameters
    ///
    /// - `input_dim` - Number of input features
    /// - `output_dim` - Number of units
    /// - `activation` - Activation function applied after the linear transformation
    /// - `rng` - Random number generator used for initialization
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A new Dense layer instance with specified dimensions
    /// - `Err(ModelError::InvalidDimension)` - If either size is zero
    pub fn new_with_rng<R: Rng + ?Sized>(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        validate_layer_dimensions(input_dim, output_dim)?;

        let distribution = Uniform::new(-INIT_RANGE, INIT_RANGE).map_err(|e| {
            ModelError::InputValidationError(format!(
                "Failed to build initialization distribution: {}",
                e
            ))
        })?;

        let weights =
            Array2::from_shape_simple_fn((output_dim, input_dim), || distribution.sample(rng));
        let bias = Array1::from_shape_simple_fn(output_dim, || distribution.sample(rng));

        Ok(Self {
            input_dim,
            output_dim,
            weights,
            bias,
            activation,
        })
    }

    /// Creates a dense layer from explicit parameters.
    ///
    /// # Parameters
    ///
    /// - `weights` - Weight matrix with shape (output_dim, input_dim)
    /// - `bias` - Bias vector with length output_dim
    /// - `activation` - Activation function applied after the linear transformation
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - A Dense layer holding the given parameters
    /// - `Err(ModelError::InvalidDimension)` - If the weight matrix has a zero dimension
    ///   or the bias length does not match the number of weight rows
    pub fn from_parts(
        weights: Array2<f64>,
        bias: Array1<f64>,
        activation: Activation,
    ) -> Result<Self, ModelError> {
        let (output_dim, input_dim) = weights.dim();
        validate_layer_dimensions(input_dim, output_dim)?;

        if bias.len() != output_dim {
            return Err(ModelError::InvalidDimension(format!(
                "Bias length ({}) must match the number of weight rows ({})",
                bias.len(),
                output_dim
            )));
        }

        Ok(Self {
            input_dim,
            output_dim,
            weights,
            bias,
            activation,
        })
    }

    get_field!(get_input_dim, input_dim, usize);
    get_field!(get_output_dim, output_dim, usize);
    get_field!(get_activation, activation, Activation);

    /// Returns a reference to the weight matrix with shape (output_dim, input_dim)
    pub fn get_weights(&self) -> &Array2<f64> {
        &self.weights
    }

    /// Returns a reference to the bias vector with length output_dim
    pub fn get_bias(&self) -> &Array1<f64> {
        &self.bias
    }

    /// Performs forward propagation through the layer.
    ///
    /// # Parameters
    ///
    /// * `input` - Input matrix with shape (input_dim, batch_size)
    ///
    /// # Returns
    ///
    /// - `Ok((Z, A))` - The pre-activation and post-activation matrices, both with shape (output_dim, batch_size)
    /// - `Err(ModelError::ShapeMismatch)` - If the input does not have `input_dim` rows
    pub fn forward<S>(
        &self,
        input: &ArrayBase<S, Ix2>,
    ) -> Result<(Array2<f64>, Array2<f64>), ModelError>
    where
        S: Data<Elem = f64>,
    {
        if input.nrows() != self.input_dim {
            return Err(ModelError::ShapeMismatch(format!(
                "Dense layer expects {} input rows, got input with shape {:?}",
                self.input_dim,
                input.shape()
            )));
        }

        let mut z = self.weights.dot(input);
        z += &self.bias.view().insert_axis(Axis(1));

        let a = Activation::apply_activation(&z, self.activation);
        Ok((z, a))
    }

    /// Computes this layer's pre-activation gradient from the layer above it.
    ///
    /// The gradient arriving from the next layer is pulled back through its weights and then
    /// through this layer's activation derivative: `δ = act'(Z) ∘ (W_nextᵀ · δ_next)`. For
    /// softmax the derivative is the diagonal-only approximation described on
    /// `Activation::softmax_backward`. Parameters are not modified.
    ///
    /// # Parameters
    ///
    /// - `next_weights` - Weight matrix of the next layer with shape (next_output_dim, output_dim)
    /// - `next_delta_z` - Pre-activation gradient of the next layer with shape (next_output_dim, batch_size)
    /// - `z` - This layer's pre-activation from the paired forward pass with shape (output_dim, batch_size)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - Gradient with respect to this layer's pre-activation, shape (output_dim, batch_size)
    /// - `Err(ModelError::ShapeMismatch)` - If the three inputs do not chain with this layer's sizes
    pub fn backward(
        &self,
        next_weights: &Array2<f64>,
        next_delta_z: &Array2<f64>,
        z: &Array2<f64>,
    ) -> Result<Array2<f64>, ModelError> {
        if next_weights.ncols() != self.output_dim {
            return Err(ModelError::ShapeMismatch(format!(
                "Next layer weights have {} columns, expected {}",
                next_weights.ncols(),
                self.output_dim
            )));
        }

        if next_weights.nrows() != next_delta_z.nrows() {
            return Err(ModelError::ShapeMismatch(format!(
                "Next layer weights have {} rows but its gradient has {} rows",
                next_weights.nrows(),
                next_delta_z.nrows()
            )));
        }

        if z.dim() != (self.output_dim, next_delta_z.ncols()) {
            return Err(ModelError::ShapeMismatch(format!(
                "Pre-activation shape {:?} does not match expected ({}, {})",
                z.shape(),
                self.output_dim,
                next_delta_z.ncols()
            )));
        }

        let upstream = next_weights.t().dot(next_delta_z);
        Ok(self.activation.backward(upstream, z))
    }

    /// Applies one gradient descent step to the weights and bias.
    ///
    /// `W ← W - learning_rate·dW`, `b ← b - learning_rate·db`. Both shapes are checked before
    /// anything is written.
    ///
    /// # Parameters
    ///
    /// - `grad_weights` - Weight gradient with shape (output_dim, input_dim)
    /// - `grad_bias` - Bias gradient with length output_dim
    /// - `learning_rate` - Step size
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If the parameters were updated
    /// - `Err(ModelError::ShapeMismatch)` - If a gradient shape does not match its parameter
    pub fn update_weights(
        &mut self,
        grad_weights: &Array2<f64>,
        grad_bias: &Array1<f64>,
        learning_rate: f64,
    ) -> Result<(), ModelError> {
        if grad_weights.dim() != self.weights.dim() {
            return Err(ModelError::ShapeMismatch(format!(
                "Weight gradient shape {:?} does not match weight shape {:?}",
                grad_weights.shape(),
                self.weights.shape()
            )));
        }

        if grad_bias.len() != self.bias.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "Bias gradient length {} does not match bias length {}",
                grad_bias.len(),
                self.bias.len()
            )));
        }

        let weights = &mut self.weights;
        let bias = &mut self.bias;
        rayon::join(
            || {
                Zip::from(weights)
                    .and(grad_weights)
                    .par_for_each(|w, &g| *w -= learning_rate * g)
            },
            || {
                Zip::from(bias)
                    .and(grad_bias)
                    .par_for_each(|b, &g| *b -= learning_rate * g)
            },
        );

        Ok(())
    }

    /// Returns the type name of the layer
    pub fn layer_type(&self) -> &str {
        "Dense"
    }

    /// Returns a description of the output shape, samples are the unknown second axis
    pub fn output_shape(&self) -> String {
        format!("({}, None)", self.output_dim)
    }

    /// Returns the number of trainable parameters: weights plus biases
    pub fn param_count(&self) -> usize {
        self.input_dim * self.output_dim + self.output_dim
    }
}
