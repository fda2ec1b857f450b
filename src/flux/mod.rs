//! Numerical flux functions.
//!
//! The surface kernels exchange own (minus) and partner (plus) traces through
//! a numerical flux F*(q⁻, q⁺; n). The [`NumericalFlux3D`] trait is the seam;
//! [`LaxFriedrichsFlux`] is the local Lax-Friedrichs (Rusanov) flux used by
//! every backend.

mod lax_friedrichs;

pub use lax_friedrichs::LaxFriedrichsFlux;

use crate::equations::{Euler3D, EulerState};

/// Context provided to numerical flux computations.
#[derive(Clone, Copy, Debug)]
pub struct FluxContext3D {
    pub euler: Euler3D,
    /// Outward unit normal of the minus element
    pub normal: [f64; 3],
}

impl FluxContext3D {
    #[inline]
    pub fn new(euler: Euler3D, normal: [f64; 3]) -> Self {
        Self { euler, normal }
    }
}

/// Numerical flux F* · n at an element interface.
///
/// Fluxes should be consistent, F*(q, q; n) = F(q) · n, and conservative,
/// F*(q⁻, q⁺; n) = -F*(q⁺, q⁻; -n).
pub trait NumericalFlux3D: Send + Sync {
    fn compute(&self, q_minus: &EulerState, q_plus: &EulerState, ctx: &FluxContext3D)
        -> EulerState;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}
