use crate::ModelError;
use crate::neural_network::{Activation, Dense};
use rand::Rng;

/// Size and activation of one dense layer, as accepted by `NeuralNetwork::from_specs`
///
/// # Fields
///
/// - `input_dim` - Number of input features
/// - `output_dim` - Number of units
/// - `activation` - Activation function of the layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub input_dim: usize,
    pub output_dim: usize,
    pub activation: Activation,
}

impl LayerSpec {
    /// Creates a new layer description
    pub fn new(input_dim: usize, output_dim: usize, activation: Activation) -> Self {
        Self {
            input_dim,
            output_dim,
            activation,
        }
    }

    /// Builds the described layer with parameters drawn from `rng`
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Dense, ModelError> {
        Dense::new_with_rng(self.input_dim, self.output_dim, self.activation, rng)
    }
}

impl From<(usize, usize, Activation)> for LayerSpec {
    fn from((input_dim, output_dim, activation): (usize, usize, Activation)) -> Self {
        Self::new(input_dim, output_dim, activation)
    }
}
