//! Solver state containers.
//!
//! - [`FieldArray`]: host-side conserved fields in the kernel layout
//! - [`SolverContext`]: accelerator-resident buffers, operators and geometry

mod context;
mod fields;

pub use context::SolverContext;
pub use fields::{Field, FieldArray};
