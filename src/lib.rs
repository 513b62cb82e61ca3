/// A macro that generates a getter method for any field.
///
/// This macro creates a public getter method that returns the value of the specified
/// field. The field type must be `Copy`.
///
/// # Parameters
///
/// - `$method_name` - The name of the getter method (e.g., get_input_dim)
/// - `$field_name` - The name of the field to access (e.g., input_dim)
/// - `$return_type` - The return type of the getter method
macro_rules! get_field {
    ($method_name:ident, $field_name:ident, $return_type:ty) => {
        #[doc = concat!("Gets the `", stringify!($field_name), "` field.\n\n")]
        #[doc = "# Returns\n\n"]
        #[doc = concat!("* `", stringify!($return_type), "` - The value of the `", stringify!($field_name), "` field")]
        pub fn $method_name(&self) -> $return_type {
            self.$field_name
        }
    };
}

/// Error types shared by every module of the crate.
///
/// - `ModelError` - Raised by layers, networks, metrics and dataset utilities
/// - `IoError` - Raised while reading datasets from disk
pub mod error;

pub use error::{IoError, ModelError};

/// Evaluation metrics for classifiers whose outputs are column-per-sample probability matrices.
///
/// # Classification Functions
/// - **argmax_columns**: Predicted class of every sample, lowest index wins ties
/// - **categorical_accuracy**: Fraction of samples whose predicted class equals the label
///
/// # Examples
/// ```rust
/// use flexnn::metric::*;
/// use ndarray::array;
///
/// let probabilities = array![[0.8, 0.3], [0.2, 0.7]];
/// let labels = array![0, 1];
/// assert_eq!(categorical_accuracy(&probabilities, &labels).unwrap(), 1.0);
/// ```
pub mod metric;

/// Components for building and training feed-forward neural networks.
///
/// Every matrix in this module stores one sample per column: inputs have shape
/// (features, samples) and network outputs have shape (num_classes, samples).
///
/// # Core Components
///
/// ## Layers
/// - **Dense**: Fully connected layer with an `Activation` (Identity, ReLU or Softmax)
/// - **LayerSpec**: `(input_dim, output_dim, activation)` description used to build networks
///
/// ## Network
/// - **NeuralNetwork**: Ordered stack of dense layers with forward, backward, weight update,
///   full-batch training, prediction and accuracy
/// - **ForwardCache** / **LayerCache**: Per-layer `(Z, A)` values kept for the backward pass
/// - **LayerGradient**: Weight and bias gradients of one layer
///
/// ## Loss
/// - **CategoricalCrossEntropy**: Loss reported during training; paired with a softmax output
///   its gradient is `A - Y`
///
/// # Examples
/// ```rust
/// use flexnn::neural_network::*;
/// use ndarray::array;
///
/// let x = array![[0.0, 1.0], [1.0, 0.0]]; // 2 features, 2 samples
/// let y = array![1, 0];
///
/// let mut network = NeuralNetwork::new(
///     vec![
///         Dense::new(2, 4, Activation::ReLU).unwrap(),
///         Dense::new(4, 2, Activation::Softmax).unwrap(),
///     ],
///     2,
/// )
/// .unwrap();
///
/// network.train(&x, &y, 0.1, 20).unwrap();
/// let predictions = network.predict(&x).unwrap();
/// assert_eq!(predictions.shape(), &[2, 2]);
/// ```
pub mod neural_network;

/// A convenience module that re-exports the most commonly used types and functions from this crate.
///
/// # Examples
/// ```rust
/// use flexnn::prelude::*;
///
/// let spec = LayerSpec::new(784, 10, Activation::ReLU);
/// ```
pub mod prelude;

/// Data loading and preparation helpers that feed the network.
///
/// # Data Preprocessing
/// - **one_hot_encode**: Integer labels to a (num_classes, samples) one-hot matrix
/// - **read_csv_xy** / **parse_csv_xy**: Labelled numeric CSV files with a header line
/// - **split_xy**: Shuffled proportional split into disjoint parts, driven by a caller supplied generator
///
/// # Examples
/// ```rust
/// use flexnn::utility::*;
/// use ndarray::array;
///
/// let targets = one_hot_encode(&array![0, 2, 1], 3).unwrap();
/// assert_eq!(targets.shape(), &[3, 3]);
/// ```
pub mod utility;
