/// Prelude module for neural network components.
pub mod neural_network_prelude;
/// Prelude module for utility functions.
pub mod utility_prelude;
/// Prelude module for evaluation metrics.
pub mod metric_prelude;

pub use crate::{IoError, ModelError};
pub use metric_prelude::*;
pub use neural_network_prelude::*;
pub use utility_prelude::*;
