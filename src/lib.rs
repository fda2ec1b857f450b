//! # dg-hex
//!
//! Discontinuous Galerkin spectral-element solver for the 3D compressible
//! Euler equations on curvilinear, fully periodic hexahedral meshes.
//!
//! This crate provides:
//! - Polynomial bases and nodes (Legendre, Gauss-Lobatto-Legendre, Gauss)
//! - Tensor-product reference operators (differentiation, face extrapolation, lift)
//! - Structured hexahedral meshes with smooth volume warping
//! - Curl-form geometric factors that preserve free stream on curved elements
//! - Periodic face-node matching through a spatial hash
//! - Per-step kernels behind an `Accelerator` seam (host and `burn` backends)
//! - A low-storage RK45 driver with kinetic-energy diagnostics
//! - Analytic reference fields and an over-integrated L2 error
//!
//! # Example
//!
//! ```no_run
//! use dg_hex::simulation::{run_simulation, RunConfig};
//!
//! let report = run_simulation(&RunConfig::default().with_elements_per_axis(4)).unwrap();
//! if let Some(err) = report.l2_error {
//!     println!("L2 error = {:.6e}", err);
//! }
//! ```

pub mod analysis;
pub mod basis;
pub mod connectivity;
pub mod device;
pub mod equations;
pub mod error;
pub mod flux;
pub mod mesh;
pub mod operators;
pub mod polynomial;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use analysis::{
    AnalyticSolution, IsentropicVortex, KineticEnergyHistory, L2ErrorEstimator, TaylorGreenVortex,
};
pub use basis::Vandermonde;
pub use connectivity::{build_face_node_map, FaceNodeMap};
pub use device::{Accelerator, CpuAccelerator, KernelConfig, KernelName};
pub use equations::{Euler3D, EulerState, N_FIELDS};
pub use error::{DgError, Result};
pub use flux::{FluxContext3D, LaxFriedrichsFlux, NumericalFlux3D};
pub use mesh::{apply_curved_warp, build_hex_mesh, HexMesh, HexMeshBuilder, WarpConfig};
pub use operators::{GeometricFactors3D, HexOperators};
pub use simulation::{run_simulation, ProblemKind, RunConfig, RunReport};
pub use solver::{Field, FieldArray, SolverContext};
pub use time::{LowStorageRK45, StepPhase, TimeStepDriver, TimeStepPlan};
pub use types::{Axis, Bounds3D};

#[cfg(feature = "burn")]
pub use device::burn::BurnAccelerator;
