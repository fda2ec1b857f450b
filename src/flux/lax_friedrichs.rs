//! Local Lax-Friedrichs flux for the Euler equations.
//!
//! F* = ½ (F(q⁻) + F(q⁺)) · n - (τ/2) λ_max (q⁺ - q⁻)
//!
//! with λ_max = max(|u⁻·n| + c⁻, |u⁺·n| + c⁺). The penalty τ scales the
//! dissipation: τ = 1 is the classical Rusanov flux, τ = 0 the central flux.

use super::{FluxContext3D, NumericalFlux3D};
use crate::equations::EulerState;

/// Local Lax-Friedrichs flux with dissipation scaled by `tau`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaxFriedrichsFlux {
    pub tau: f64,
}

impl LaxFriedrichsFlux {
    pub fn new(tau: f64) -> Self {
        Self { tau }
    }
}

impl Default for LaxFriedrichsFlux {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl NumericalFlux3D for LaxFriedrichsFlux {
    #[inline]
    fn compute(&self, q_minus: &EulerState, q_plus: &EulerState, ctx: &FluxContext3D) -> EulerState {
        let euler = &ctx.euler;
        let n = ctx.normal;
        let central =
            (euler.normal_flux(q_minus, n) + euler.normal_flux(q_plus, n)) * 0.5;
        let lambda = euler
            .max_wave_speed(q_minus, n)
            .max(euler.max_wave_speed(q_plus, n));
        central - (*q_plus - *q_minus) * (0.5 * self.tau * lambda)
    }

    fn name(&self) -> &'static str {
        "local-lax-friedrichs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::Euler3D;

    fn ctx(normal: [f64; 3]) -> FluxContext3D {
        FluxContext3D::new(Euler3D::default(), normal)
    }

    #[test]
    fn test_consistency() {
        let flux = LaxFriedrichsFlux::default();
        let euler = Euler3D::default();
        let q = EulerState::from_primitives(1.1, 0.2, -0.3, 0.4, 0.9, euler.gamma);
        let n = [0.0, 0.6, 0.8];
        let f = flux.compute(&q, &q, &ctx(n));
        assert!(f.max_abs_diff(&euler.normal_flux(&q, n)) < 1e-14);
    }

    #[test]
    fn test_conservation() {
        let flux = LaxFriedrichsFlux::new(0.7);
        let euler = Euler3D::default();
        let a = EulerState::from_primitives(1.0, 0.5, 0.0, 0.1, 1.0, euler.gamma);
        let b = EulerState::from_primitives(0.8, -0.2, 0.3, 0.0, 0.7, euler.gamma);
        let n = [1.0, 0.0, 0.0];
        let f_ab = flux.compute(&a, &b, &ctx(n));
        let f_ba = flux.compute(&b, &a, &ctx([-1.0, 0.0, 0.0]));
        assert!((f_ab + f_ba).max_abs_diff(&EulerState::zero()) < 1e-14);
    }

    #[test]
    fn test_zero_penalty_is_central() {
        let euler = Euler3D::default();
        let a = EulerState::from_primitives(1.0, 0.5, 0.0, 0.0, 1.0, euler.gamma);
        let b = EulerState::from_primitives(2.0, 0.0, 0.0, 0.0, 3.0, euler.gamma);
        let n = [0.0, 0.0, 1.0];
        let f = LaxFriedrichsFlux::new(0.0).compute(&a, &b, &ctx(n));
        let central = (euler.normal_flux(&a, n) + euler.normal_flux(&b, n)) * 0.5;
        assert!(f.max_abs_diff(&central) < 1e-15);
    }
}
