//! Conservation law definitions.
//!
//! The solver integrates the 3D compressible Euler equations
//!
//! ∂q/∂t + ∇·F(q) = 0
//!
//! with q = (ρ, ρu, ρv, ρw, E) and an ideal-gas closure.

mod euler;

pub use euler::{Euler3D, EulerState, N_FIELDS};
