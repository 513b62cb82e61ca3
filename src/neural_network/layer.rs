use crate::ModelError;

/// Fully connected layer operating on column-per-sample matrices
pub mod dense;
/// Plain description of a layer used to build a network without constructing layers by hand
pub mod layer_spec;

pub use dense::*;
pub use layer_spec::*;

/// Validates that both layer sizes are non-zero
///
/// # Parameters
///
/// - `input_dim` - Number of input features of the layer
/// - `output_dim` - Number of units of the layer
///
/// # Returns
///
/// - `Ok(())` - If both sizes are greater than zero
/// - `Err(ModelError::InvalidDimension)` - If either size is zero
fn validate_layer_dimensions(input_dim: usize, output_dim: usize) -> Result<(), ModelError> {
    if input_dim == 0 || output_dim == 0 {
        return Err(ModelError::InvalidDimension(format!(
            "Layer sizes must be greater than 0, got input_dim: {}, output_dim: {}",
            input_dim, output_dim
        )));
    }

    Ok(())
}
