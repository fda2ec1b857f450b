//! Verification and diagnostics for the Euler runs.
//!
//! This module provides:
//! - Closed-form fields used as initial conditions and reference solutions
//! - An over-integrated L2 error against such a reference
//! - The per-step kinetic-energy record kept by the time driver
//!
//! # Example
//!
//! ```ignore
//! use dg_hex::analysis::{IsentropicVortex, L2ErrorEstimator};
//!
//! let estimator = L2ErrorEstimator::new(&ops);
//! let err = estimator.error(&mesh, &geo, &solution, &IsentropicVortex::default(), t)?;
//! println!("L2 error: {:.6e}", err);
//! ```

mod analytic;
mod error_norm;
mod history;

pub use analytic::{AnalyticSolution, IsentropicVortex, TaylorGreenVortex};
pub use error_norm::L2ErrorEstimator;
pub use history::KineticEnergyHistory;
