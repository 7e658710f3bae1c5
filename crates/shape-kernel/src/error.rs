use thiserror::Error;

/// Failures raised while constructing, resizing or deserializing a shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("Invalid {shape} {dimension}: {value} must be >= {minimum}")]
    InvalidDimensions {
        shape: &'static str,
        dimension: &'static str,
        value: f64,
        minimum: f64,
    },

    #[error("Invalid rotation: |R^T R - I| = {orthonormality_error}, det = {determinant}")]
    InvalidRotation {
        orthonormality_error: f64,
        determinant: f64,
    },
}

impl ShapeError {
    /// Checks `value >= minimum`. NaN never passes.
    pub(crate) fn check_minimum(
        shape: &'static str,
        dimension: &'static str,
        value: f64,
        minimum: f64,
    ) -> Result<(), ShapeError> {
        if value >= minimum {
            Ok(())
        } else {
            tracing::debug!(shape, dimension, value, minimum, "rejected shape dimension");
            Err(ShapeError::InvalidDimensions {
                shape,
                dimension,
                value,
                minimum,
            })
        }
    }
}
