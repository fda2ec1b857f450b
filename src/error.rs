//! Error types for mesh setup, face matching and time stepping.
//!
//! Every variant is fatal for the current run: an explicit time march with
//! device-resident state has no safe point to resume from, so errors are
//! propagated to the caller with a distinct message and the run stops.

use thiserror::Error;

/// Errors raised by the solver pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DgError {
    /// A non-positive volume or face Jacobian (inverted or self-intersecting element).
    #[error("degenerate mesh: element {element}, node {node} has Jacobian {jacobian:e}")]
    MeshDegenerate {
        element: usize,
        node: usize,
        jacobian: f64,
    },

    /// A face node without a unique geometric partner.
    #[error("unmatched face node {node} at ({x:.6}, {y:.6}, {z:.6}): {reason}")]
    UnmatchedFaceNode {
        node: usize,
        x: f64,
        y: f64,
        z: f64,
        reason: String,
    },

    /// Kernel build or launch failure on the accelerator.
    #[error("kernel `{kernel}` failed: {reason}")]
    KernelLaunch { kernel: String, reason: String },

    /// Non-finite run diagnostic, i.e. the time march diverged.
    #[error("solution diverged at step {step}: kinetic energy = {value}")]
    Divergence { step: usize, value: f64 },

    /// Rejected run or kernel configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DgError {
    /// Create a kernel launch error.
    pub fn kernel(kernel: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::KernelLaunch {
            kernel: kernel.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let errors = [
            DgError::MeshDegenerate {
                element: 3,
                node: 7,
                jacobian: -0.5,
            },
            DgError::UnmatchedFaceNode {
                node: 11,
                x: 0.0,
                y: 1.0,
                z: 2.0,
                reason: "no candidate".into(),
            },
            DgError::kernel("volume", "not built"),
            DgError::Divergence {
                step: 4,
                value: f64::NAN,
            },
            DgError::config("order must be positive"),
        ];

        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages[0].starts_with("degenerate mesh"));
        assert!(messages[1].starts_with("unmatched face node 11"));
        assert_eq!(messages[2], "kernel `volume` failed: not built");
        assert!(messages[3].contains("step 4"));
        assert!(messages[4].contains("order must be positive"));
    }
}
