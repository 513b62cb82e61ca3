use super::*;
use crate::metric::categorical_accuracy;
use crate::utility::one_hot_encode;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};

/// Training reports the accuracy on the training set every this many epochs
pub const ACCURACY_REPORT_INTERVAL: usize = 10;

/// Pre-activation and post-activation of one layer from a forward pass
///
/// # Fields
///
/// - `z` - Pre-activation `W·X + b` with shape (output_dim, samples)
/// - `a` - Post-activation with the same shape
#[derive(Debug, Clone)]
pub struct LayerCache {
    pub z: Array2<f64>,
    pub a: Array2<f64>,
}

/// Everything a backward pass needs from the forward pass that preceded it
///
/// Holds a view of the network input and one `LayerCache` per layer, addressed by the same
/// index as the layer itself. Built by `NeuralNetwork::forward` and consumed by
/// `NeuralNetwork::backward`.
#[derive(Debug, Clone)]
pub struct ForwardCache<'a> {
    input: ArrayView2<'a, f64>,
    layers: Vec<LayerCache>,
}

impl<'a> ForwardCache<'a> {
    /// Returns the network input of the forward pass
    pub fn input(&self) -> ArrayView2<'_, f64> {
        self.input.view()
    }

    /// Returns the cached values of every layer, in layer order
    pub fn layers(&self) -> &[LayerCache] {
        &self.layers
    }

    /// Returns the cached values of the layer at `index`
    pub fn layer(&self, index: usize) -> Option<&LayerCache> {
        self.layers.get(index)
    }

    /// Returns the matrix that was fed into the layer at `index`
    ///
    /// This is the raw input for the first layer and the previous layer's activation
    /// otherwise.
    pub fn layer_input(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        match index {
            0 => Some(self.input.view()),
            i => self.layers.get(i - 1).map(|cache| cache.a.view()),
        }
    }

    /// Returns the activation of the last layer
    pub fn output(&self) -> ArrayView2<'_, f64> {
        match self.layers.last() {
            Some(cache) => cache.a.view(),
            None => self.input.view(),
        }
    }

    /// Consumes the cache and returns the activation of the last layer
    pub fn into_output(mut self) -> Array2<f64> {
        match self.layers.pop() {
            Some(cache) => cache.a,
            None => self.input.to_owned(),
        }
    }
}

/// Weight and bias gradients of one layer
///
/// # Fields
///
/// - `weights` - Gradient with respect to the weights, shape (output_dim, input_dim)
/// - `bias` - Gradient with respect to the bias, length output_dim
#[derive(Debug, Clone)]
pub struct LayerGradient {
    pub weights: Array2<f64>,
    pub bias: Array1<f64>,
}

/// A feed-forward neural network trained with full-batch gradient descent.
///
/// The network is an ordered stack of `Dense` layers. Inputs are matrices with one column per
/// sample (shape (features, samples)), and the output of the final layer has shape
/// (num_classes, samples). The final layer is expected to use softmax: the backward pass
/// starts from `A_L - Y`, which is the gradient of categorical cross entropy through softmax.
///
/// The number of classes is part of the configuration instead of being read off the labels,
/// so the one-hot targets always match the output layer.
///
/// # Fields
///
/// - `layers` - The layers, in forward order
/// - `num_classes` - Width of the output layer and of the one-hot targets
/// - `loss` - Loss used for progress reporting and for the output-layer error
///
/// # Example
/// ```rust
/// use flexnn::prelude::*;
/// use ndarray::array;
///
/// // 2 features, 4 samples (one per column)
/// let x = array![[0.0, 0.0, 1.0, 1.0], [0.0, 1.0, 0.0, 1.0]];
/// let y = array![0, 0, 1, 1];
///
/// let mut network = NeuralNetwork::from_specs(
///     &[
///         LayerSpec::new(2, 8, Activation::ReLU),
///         LayerSpec::new(8, 2, Activation::Softmax),
///     ],
///     2,
/// )
/// .unwrap();
///
/// network.summary();
/// network.train(&x, &y, 0.5, 100).unwrap();
///
/// let probabilities = network.predict(&x).unwrap();
/// assert_eq!(probabilities.shape(), &[2, 4]);
/// let accuracy = network.accuracy(&x, &y).unwrap();
/// assert!((0.0..=1.0).contains(&accuracy));
/// ```
#[derive(Debug, Clone)]
pub struct NeuralNetwork {
    layers: Vec<Dense>,
    num_classes: usize,
    loss: CategoricalCrossEntropy,
}

impl NeuralNetwork {
    /// Creates a network from pre-built layers
    ///
    /// # Parameters
    ///
    /// - `layers` - The layers, in forward order
    /// - `num_classes` - Number of output classes, must equal the last layer's output size
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The assembled network
    /// - `Err(ModelError::InvalidDimension)` - If there are no layers, adjacent layer sizes do
    ///   not chain, or the last layer's output size differs from `num_classes`
    pub fn new(layers: Vec<Dense>, num_classes: usize) -> Result<Self, ModelError> {
        if layers.is_empty() {
            return Err(ModelError::InvalidDimension(
                "A network needs at least one layer".to_string(),
            ));
        }

        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].get_output_dim() != pair[1].get_input_dim() {
                return Err(ModelError::InvalidDimension(format!(
                    "Layer {} outputs {} values but layer {} expects {} inputs",
                    i,
                    pair[0].get_output_dim(),
                    i + 1,
                    pair[1].get_input_dim()
                )));
            }
        }

        let output_dim = layers[layers.len() - 1].get_output_dim();
        if output_dim != num_classes {
            return Err(ModelError::InvalidDimension(format!(
                "Last layer outputs {} values but the network is configured for {} classes",
                output_dim, num_classes
            )));
        }

        Ok(Self {
            layers,
            num_classes,
            loss: CategoricalCrossEntropy::new(),
        })
    }

    /// Creates a network from layer descriptions, initialized from the thread-local generator
    ///
    /// # Parameters
    ///
    /// - `specs` - One `(input_dim, output_dim, activation)` description per layer
    /// - `num_classes` - Number of output classes
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The assembled network
    /// - `Err(ModelError::InvalidDimension)` - If a layer size is zero or the sizes do not chain
    pub fn from_specs(specs: &[LayerSpec], num_classes: usize) -> Result<Self, ModelError> {
        Self::from_specs_with_rng(specs, num_classes, &mut rand::rng())
    }

    /// Creates a network from layer descriptions, drawing initial parameters from `rng`
    ///
    /// # Parameters
    ///
    /// - `specs` - One `(input_dim, output_dim, activation)` description per layer
    /// - `num_classes` - Number of output classes
    /// - `rng` - Random number generator used to initialize every layer
    ///
    /// # Returns
    ///
    /// - `Ok(Self)` - The assembled network
    /// - `Err(ModelError::InvalidDimension)` - If a layer size is zero or the sizes do not chain
    pub fn from_specs_with_rng<R: Rng + ?Sized>(
        specs: &[LayerSpec],
        num_classes: usize,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        let layers = specs
            .iter()
            .map(|spec| spec.build(rng))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(layers, num_classes)
    }

    /// Returns the layers, in forward order
    pub fn get_layers(&self) -> &[Dense] {
        &self.layers
    }

    get_field!(get_num_classes, num_classes, usize);

    /// Returns the number of layers
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the total number of trainable parameters
    pub fn param_count(&self) -> usize {
        self.layers.iter().map(Dense::param_count).sum()
    }

    /// Runs every layer on `input` and keeps all intermediate values
    ///
    /// # Parameters
    ///
    /// * `input` - Input matrix with shape (features, samples)
    ///
    /// # Returns
    ///
    /// - `Ok(ForwardCache)` - The input together with `(Z, A)` of every layer
    /// - `Err(ModelError::ShapeMismatch)` - If the input does not have as many rows as the first layer has inputs
    pub fn forward<'a, S>(
        &self,
        input: &'a ArrayBase<S, Ix2>,
    ) -> Result<ForwardCache<'a>, ModelError>
    where
        S: Data<Elem = f64>,
    {
        let mut layers: Vec<LayerCache> = Vec::with_capacity(self.layers.len());

        for layer in &self.layers {
            let (z, a) = match layers.last() {
                Some(previous) => layer.forward(&previous.a)?,
                None => layer.forward(input)?,
            };
            layers.push(LayerCache { z, a });
        }

        Ok(ForwardCache {
            input: input.view(),
            layers,
        })
    }

    /// Generates predictions for the input data
    ///
    /// # Parameters
    ///
    /// * `input` - Input matrix with shape (features, samples)
    ///
    /// # Returns
    ///
    /// - `Ok(Array2<f64>)` - The last layer's activation with shape (num_classes, samples)
    /// - `Err(ModelError::ShapeMismatch)` - If the input does not fit the first layer
    pub fn predict<S>(&self, input: &ArrayBase<S, Ix2>) -> Result<Array2<f64>, ModelError>
    where
        S: Data<Elem = f64>,
    {
        Ok(self.forward(input)?.into_output())
    }

    /// Computes the gradients of every layer for one forward pass
    ///
    /// The output error is `A_L - target`. It is threaded back through the layers with
    /// `Dense::backward`, and each layer's gradients are averaged over the samples:
    /// `db = mean(δ)` across columns and `dW = δ·A_prevᵀ / samples`.
    ///
    /// # Parameters
    ///
    /// - `cache` - Result of `forward` on the training input
    /// - `target` - One-hot targets with shape (num_classes, samples)
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<LayerGradient>)` - One gradient per layer, in layer order
    /// - `Err(ModelError::ShapeMismatch)` - If the cache does not come from this network or the target shape differs from the output shape
    /// - `Err(ModelError::EmptyInput)` - If the forward pass had no samples
    pub fn backward(
        &self,
        cache: &ForwardCache<'_>,
        target: &Array2<f64>,
    ) -> Result<Vec<LayerGradient>, ModelError> {
        if cache.layers.len() != self.layers.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "Forward cache has {} layers but the network has {}",
                cache.layers.len(),
                self.layers.len()
            )));
        }

        let output = cache.output();
        if target.dim() != output.dim() {
            return Err(ModelError::ShapeMismatch(format!(
                "Target shape {:?} does not match output shape {:?}",
                target.shape(),
                output.shape()
            )));
        }

        let n_samples = output.ncols();
        if n_samples == 0 {
            return Err(ModelError::EmptyInput(
                "Cannot backpropagate over zero samples".to_string(),
            ));
        }

        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut delta = self.loss.output_delta(target, &output);

        for index in (0..self.layers.len()).rev() {
            let layer_input = cache.layer_input(index).ok_or_else(|| {
                ModelError::ShapeMismatch(format!("Forward cache has no input for layer {}", index))
            })?;
            gradients.push(Self::layer_gradient(&delta, layer_input, n_samples)?);

            if index > 0 {
                delta = self.layers[index - 1].backward(
                    self.layers[index].get_weights(),
                    &delta,
                    &cache.layers[index - 1].z,
                )?;
            }
        }

        // Collected output-first
        gradients.reverse();
        Ok(gradients)
    }

    /// Averages one layer's gradients over the samples
    fn layer_gradient(
        delta: &Array2<f64>,
        layer_input: ArrayView2<'_, f64>,
        n_samples: usize,
    ) -> Result<LayerGradient, ModelError> {
        let bias = delta.mean_axis(Axis(1)).ok_or_else(|| {
            ModelError::EmptyInput("Cannot average gradients over zero samples".to_string())
        })?;
        let weights = delta.dot(&layer_input.t()) / n_samples as f64;

        Ok(LayerGradient { weights, bias })
    }

    /// Applies one gradient descent step to every layer
    ///
    /// All gradient shapes are checked before any layer is modified.
    ///
    /// # Parameters
    ///
    /// - `gradients` - One gradient per layer, in layer order, as returned by `backward`
    /// - `learning_rate` - Step size
    ///
    /// # Returns
    ///
    /// - `Ok(())` - If every layer was updated
    /// - `Err(ModelError::ShapeMismatch)` - If the gradient count or a gradient shape does not match
    pub fn update_weights(
        &mut self,
        gradients: &[LayerGradient],
        learning_rate: f64,
    ) -> Result<(), ModelError> {
        if gradients.len() != self.layers.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "Got {} gradients for {} layers",
                gradients.len(),
                self.layers.len()
            )));
        }

        for (i, (layer, gradient)) in self.layers.iter().zip(gradients).enumerate() {
            if gradient.weights.dim() != layer.get_weights().dim()
                || gradient.bias.len() != layer.get_bias().len()
            {
                return Err(ModelError::ShapeMismatch(format!(
                    "Gradient for layer {} has weight shape {:?} and bias length {}, expected {:?} and {}",
                    i,
                    gradient.weights.shape(),
                    gradient.bias.len(),
                    layer.get_weights().shape(),
                    layer.get_bias().len()
                )));
            }
        }

        for (layer, gradient) in self.layers.iter_mut().zip(gradients) {
            layer.update_weights(&gradient.weights, &gradient.bias, learning_rate)?;
        }

        Ok(())
    }

    /// Validates the training inputs against the network
    fn validate_training_inputs<S>(
        &self,
        x: &ArrayBase<S, Ix2>,
        labels: &Array1<usize>,
        learning_rate: f64,
    ) -> Result<(), ModelError>
    where
        S: Data<Elem = f64>,
    {
        if x.ncols() == 0 {
            return Err(ModelError::EmptyInput(
                "Training input has no samples".to_string(),
            ));
        }

        if labels.len() != x.ncols() {
            return Err(ModelError::ShapeMismatch(format!(
                "Input has {} samples but {} labels were given",
                x.ncols(),
                labels.len()
            )));
        }

        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(ModelError::InputValidationError(format!(
                "Learning rate must be a positive finite number, got {}",
                learning_rate
            )));
        }

        Ok(())
    }

    /// Trains the network with full-batch gradient descent
    ///
    /// Every epoch runs forward, backward and one weight update on the whole input. The
    /// accuracy on the training input is printed every `ACCURACY_REPORT_INTERVAL` epochs.
    ///
    /// # Parameters
    ///
    /// - `x` - Input matrix with shape (features, samples)
    /// - `labels` - Class index of each sample
    /// - `learning_rate` - Step size
    /// - `epochs` - Number of passes over the input
    ///
    /// # Returns
    ///
    /// - `Ok(&mut Self)` - The trained network
    /// - `Err(ModelError)` - If the inputs are invalid. Weights keep the last successful update.
    pub fn train<S>(
        &mut self,
        x: &ArrayBase<S, Ix2>,
        labels: &Array1<usize>,
        learning_rate: f64,
        epochs: usize,
    ) -> Result<&mut Self, ModelError>
    where
        S: Data<Elem = f64>,
    {
        let never_cancelled = AtomicBool::new(false);
        self.train_cancellable(x, labels, learning_rate, epochs, &never_cancelled)?;
        Ok(self)
    }

    /// Trains like `train`, stopping early once `cancel` is set
    ///
    /// The flag is checked before every epoch, so an epoch in progress always finishes.
    ///
    /// # Parameters
    ///
    /// - `x` - Input matrix with shape (features, samples)
    /// - `labels` - Class index of each sample
    /// - `learning_rate` - Step size
    /// - `epochs` - Maximum number of passes over the input
    /// - `cancel` - Flag another thread may set to stop training
    ///
    /// # Returns
    ///
    /// - `Ok(usize)` - The number of epochs that ran
    /// - `Err(ModelError)` - If the inputs are invalid. Weights keep the last successful update.
    pub fn train_cancellable<S>(
        &mut self,
        x: &ArrayBase<S, Ix2>,
        labels: &Array1<usize>,
        learning_rate: f64,
        epochs: usize,
        cancel: &AtomicBool,
    ) -> Result<usize, ModelError>
    where
        S: Data<Elem = f64>,
    {
        self.validate_training_inputs(x, labels, learning_rate)?;

        let target = one_hot_encode(labels, self.num_classes)?;
        let n_samples = x.ncols();

        let progress_bar = ProgressBar::new(epochs as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | Loss: {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );

        let mut completed = 0;
        for epoch in 0..epochs {
            if cancel.load(Ordering::Relaxed) {
                break;
            }

            let cache = self.forward(x)?;
            let loss_value = self.loss.compute_loss(&target, &cache.output());
            let gradients = self.backward(&cache, &target)?;
            self.update_weights(&gradients, learning_rate)?;
            completed += 1;

            progress_bar.set_message(format!("{:.6}", loss_value));
            progress_bar.inc(1);

            if (epoch + 1) % ACCURACY_REPORT_INTERVAL == 0 {
                let accuracy = self.accuracy(x, labels)?;
                // Goes to stdout even when the bar is hidden
                progress_bar.suspend(|| {
                    println!(
                        "Epoch {}/{}: Accuracy = {:.4}",
                        epoch + 1,
                        epochs,
                        accuracy
                    )
                });
            }
        }

        // Keeps the last loss on the bar
        let outcome = if completed < epochs {
            progress_bar.abandon();
            "cancelled"
        } else {
            progress_bar.finish();
            "completed"
        };

        println!(
            "\nNeural network training {}: {} samples, {}/{} epochs",
            outcome, n_samples, completed, epochs
        );

        Ok(completed)
    }

    /// Fraction of samples whose predicted class matches the label
    ///
    /// The predicted class is the arg-max of each output column, ties going to the lowest
    /// class index.
    ///
    /// # Parameters
    ///
    /// - `x` - Input matrix with shape (features, samples)
    /// - `labels` - Class index of each sample
    ///
    /// # Returns
    ///
    /// - `Ok(f64)` - Accuracy in the range \[0.0, 1.0\]
    /// - `Err(ModelError::EmptyInput)` - If `x` has no samples
    /// - `Err(ModelError::ShapeMismatch)` - If the label count differs from the sample count or `x` does not fit the first layer
    pub fn accuracy<S>(
        &self,
        x: &ArrayBase<S, Ix2>,
        labels: &Array1<usize>,
    ) -> Result<f64, ModelError>
    where
        S: Data<Elem = f64>,
    {
        if x.ncols() == 0 {
            return Err(ModelError::EmptyInput(
                "Cannot compute accuracy over zero samples".to_string(),
            ));
        }

        let predictions = self.predict(x)?;
        categorical_accuracy(&predictions, labels)
    }

    /// Prints a summary of the network structure
    pub fn summary(&self) {
        let col1_width = 33;
        let col2_width = 24;
        let col3_width = 15;
        println!("Model: \"neural_network\"");
        println!(
            "┏{}┳{}┳{}┓",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );
        println!(
            "┃ {:<31} ┃ {:<22} ┃ {:>13} ┃",
            "Layer (type)", "Output Shape", "Param #"
        );
        println!(
            "┡{}╇{}╇{}┩",
            "━".repeat(col1_width),
            "━".repeat(col2_width),
            "━".repeat(col3_width)
        );

        for (i, layer) in self.layers.iter().enumerate() {
            // First layer is "Layer", then "Layer_1", "Layer_2", ...
            let layer_name = if i == 0 {
                "Layer".to_string()
            } else {
                format!("Layer_{}", i)
            };

            println!(
                "│ {:<31} │ {:<22} │ {:>13} │",
                format!("{} ({}, {})", layer_name, layer.layer_type(), layer.get_activation()),
                layer.output_shape(),
                layer.param_count()
            );
        }
        println!(
            "└{}┴{}┴{}┘",
            "─".repeat(col1_width),
            "─".repeat(col2_width),
            "─".repeat(col3_width)
        );
        let total_params = self.param_count();
        // f64 parameters, 8 bytes each
        println!(" Total params: {} ({} B)", total_params, total_params * 8);
        println!(" Classes: {}", self.num_classes);
    }
}
