//! Error types for tensor-backend operations.

use thiserror::Error;

use crate::device::KernelName;
use crate::error::DgError;

/// Errors that can occur on a Burn device.
#[derive(Error, Debug)]
pub enum BurnError {
    /// Dimension mismatch between tensors.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Data transfer failed.
    #[error("Data transfer failed: {0}")]
    DataTransfer(String),

    /// Numerical error (NaN or Inf detected).
    #[error("Numerical error: {0}")]
    NumericalError(String),
}

impl BurnError {
    /// Create a dimension mismatch error.
    pub fn dimension_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Attribute this error to a kernel launch.
    pub fn in_kernel(self, kernel: KernelName) -> DgError {
        DgError::kernel(kernel.as_str(), self.to_string())
    }
}

impl From<BurnError> for DgError {
    fn from(err: BurnError) -> Self {
        DgError::kernel("transfer", err.to_string())
    }
}
