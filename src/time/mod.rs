//! Time integration.
//!
//! - [`LowStorageRK45`]: Carpenter-Kennedy 2N-storage coefficients
//! - [`TimeStepPlan`]: geometry-based fixed step size
//! - [`TimeStepDriver`]: kernel sequencing and per-step diagnostics

mod driver;
mod low_storage;
mod step_size;

pub use driver::{RunSummary, StepPhase, TimeStepDriver};
pub use low_storage::{IntegratorInfo, LowStorageRK45};
pub use step_size::TimeStepPlan;
