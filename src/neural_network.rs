/// Module that contains activation function implementations
pub mod activation;
/// Module that contains neural network layer implementations
pub mod layer;
/// Module that contains loss function implementations
pub mod loss_function;
/// Module that contains the feed-forward network and its training loop
pub mod network;

pub use activation::*;
pub use layer::*;
pub use loss_function::*;
pub use network::*;

use crate::ModelError;
