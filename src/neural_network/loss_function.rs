/// Categorical Cross Entropy loss function for multi-class classification
pub mod categorical_cross_entropy;

pub use categorical_cross_entropy::*;
