//! End-to-end runs.
//!
//! Ties together:
//! - Mesh construction, warping, geometric factors and the face-node map
//! - The initial state from the selected analytic field
//! - The time march on a chosen accelerator
//! - Verification against the analytic field
//!
//! # Example
//! ```no_run
//! use dg_hex::simulation::{run_simulation, RunConfig};
//!
//! let config = RunConfig::new().with_order(3).with_elements_per_axis(4);
//! let report = run_simulation(&config).unwrap();
//! println!("steps: {}, L2 error: {:?}", report.summary.n_steps, report.l2_error);
//! ```

mod config;
mod runner;

pub use config::{ProblemKind, RunConfig};
pub use runner::{run_simulation, run_with, RunReport, RunSetup};
