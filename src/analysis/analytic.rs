//! Analytic fields for initialization and verification.

use crate::equations::EulerState;

/// A conserved state given in closed form.
pub trait AnalyticSolution: Send + Sync {
    /// State at `(x, y, z)` and time `t`.
    fn evaluate(&self, x: f64, y: f64, z: f64, t: f64) -> EulerState;

    /// Whether `evaluate` is an exact solution for all `t`, not only an
    /// initial condition.
    fn is_exact(&self) -> bool;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Isentropic vortex in the x-y plane, advected with unit velocity along y.
///
/// Centred at `(5, 5 + t)` with strength `Lmax = 0.4`:
///
/// ```text
/// L   = Lmax exp(½ (1 - r²))
/// ρ   = (1 - ½ (γ-1) L²)^(1/(γ-1))
/// u   = -(y - y_c) L,  v = 1 + (x - x_c) L,  w = 0
/// p   = p0 (1 + ρ^γ),  p0 = 1/γ
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsentropicVortex {
    pub gamma: f64,
    pub center: [f64; 2],
    pub strength: f64,
}

impl IsentropicVortex {
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma,
            center: [5.0, 5.0],
            strength: 0.4,
        }
    }
}

impl Default for IsentropicVortex {
    fn default() -> Self {
        Self::new(1.4)
    }
}

impl AnalyticSolution for IsentropicVortex {
    fn evaluate(&self, x: f64, y: f64, _z: f64, t: f64) -> EulerState {
        let gm1 = self.gamma - 1.0;
        let p0 = 1.0 / self.gamma;
        let xt = x - self.center[0];
        let yt = y - self.center[1] - t;

        // Rotation direction (0, 0, 1) × (xt, yt, 0)
        let (rx, ry) = (-yt, xt);
        let r2 = rx * rx + ry * ry;

        let l = self.strength * (0.5 * (1.0 - r2)).exp();
        let rho = (1.0 - 0.5 * gm1 * l * l).powf(1.0 / gm1);
        let rho_u = rho * rx * l;
        let rho_v = rho * (1.0 + ry * l);
        let rho_w = 0.0;
        let energy = p0 / gm1 * (1.0 + rho.powf(self.gamma))
            + 0.5 * (rho_u * rho_u + rho_v * rho_v + rho_w * rho_w) / rho;
        EulerState::new(rho, rho_u, rho_v, rho_w, energy)
    }

    fn is_exact(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "isentropic-vortex"
    }
}

/// Taylor-Green vortex on [-π, π]^3 at near-incompressible pressure.
///
/// Only an initial condition; `t` is ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TaylorGreenVortex {
    pub gamma: f64,
}

impl TaylorGreenVortex {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }
}

impl Default for TaylorGreenVortex {
    fn default() -> Self {
        Self::new(1.4)
    }
}

impl AnalyticSolution for TaylorGreenVortex {
    fn evaluate(&self, x: f64, y: f64, z: f64, _t: f64) -> EulerState {
        let u = x.sin() * y.cos() * z.cos();
        let v = -x.cos() * y.sin() * z.cos();
        let p = 100.0 / self.gamma
            + (1.0 / 16.0) * ((2.0 * x).cos() + (2.0 * y).cos()) * (2.0 + (2.0 * z).cos());
        EulerState::from_primitives(1.0, u, v, 0.0, p, self.gamma)
    }

    fn is_exact(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "taylor-green"
    }
}
