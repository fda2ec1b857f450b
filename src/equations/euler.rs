//! 3D compressible Euler equations.
//!
//! ∂ρ/∂t  + ∇·(ρu)            = 0
//! ∂ρu/∂t + ∇·(ρu⊗u + p I)    = 0
//! ∂E/∂t  + ∇·((E + p) u)     = 0
//!
//! closed by the ideal-gas law p = (γ - 1)(E - ½ρ|u|²).

use std::ops::{Add, Mul, Sub};

/// Number of conserved fields (ρ, ρu, ρv, ρw, E).
pub const N_FIELDS: usize = 5;

/// Conserved state (ρ, ρu, ρv, ρw, E).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerState {
    pub rho: f64,
    pub rho_u: f64,
    pub rho_v: f64,
    pub rho_w: f64,
    pub energy: f64,
}

impl EulerState {
    #[inline(always)]
    pub fn new(rho: f64, rho_u: f64, rho_v: f64, rho_w: f64, energy: f64) -> Self {
        Self {
            rho,
            rho_u,
            rho_v,
            rho_w,
            energy,
        }
    }

    /// Create a state from primitive variables (ρ, u, v, w, p).
    #[inline]
    pub fn from_primitives(rho: f64, u: f64, v: f64, w: f64, p: f64, gamma: f64) -> Self {
        let kinetic = 0.5 * rho * (u * u + v * v + w * w);
        Self {
            rho,
            rho_u: rho * u,
            rho_v: rho * v,
            rho_w: rho * w,
            energy: p / (gamma - 1.0) + kinetic,
        }
    }

    #[inline(always)]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Momentum vector (ρu, ρv, ρw).
    #[inline(always)]
    pub fn momentum(&self) -> [f64; 3] {
        [self.rho_u, self.rho_v, self.rho_w]
    }

    /// Velocity (u, v, w).
    #[inline(always)]
    pub fn velocity(&self) -> [f64; 3] {
        let inv = 1.0 / self.rho;
        [self.rho_u * inv, self.rho_v * inv, self.rho_w * inv]
    }

    /// Kinetic energy density ½|ρu|²/ρ.
    #[inline(always)]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * (self.rho_u * self.rho_u + self.rho_v * self.rho_v + self.rho_w * self.rho_w)
            / self.rho
    }

    #[inline(always)]
    pub fn to_array(&self) -> [f64; N_FIELDS] {
        [self.rho, self.rho_u, self.rho_v, self.rho_w, self.energy]
    }

    #[inline(always)]
    pub fn from_array(arr: [f64; N_FIELDS]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3], arr[4])
    }

    /// Maximum absolute difference over all fields.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl Add for EulerState {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rho + rhs.rho,
            self.rho_u + rhs.rho_u,
            self.rho_v + rhs.rho_v,
            self.rho_w + rhs.rho_w,
            self.energy + rhs.energy,
        )
    }
}

impl Sub for EulerState {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.rho - rhs.rho,
            self.rho_u - rhs.rho_u,
            self.rho_v - rhs.rho_v,
            self.rho_w - rhs.rho_w,
            self.energy - rhs.energy,
        )
    }
}

impl Mul<f64> for EulerState {
    type Output = Self;
    #[inline(always)]
    fn mul(self, s: f64) -> Self {
        Self::new(
            self.rho * s,
            self.rho_u * s,
            self.rho_v * s,
            self.rho_w * s,
            self.energy * s,
        )
    }
}

/// Ideal-gas Euler equations with ratio of specific heats γ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Euler3D {
    pub gamma: f64,
}

impl Euler3D {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Pressure p = (γ - 1)(E - ½ρ|u|²).
    #[inline(always)]
    pub fn pressure(&self, q: &EulerState) -> f64 {
        (self.gamma - 1.0) * (q.energy - q.kinetic_energy())
    }

    /// Sound speed c = sqrt(γ p / ρ).
    #[inline(always)]
    pub fn sound_speed(&self, q: &EulerState) -> f64 {
        (self.gamma * self.pressure(q).max(0.0) / q.rho).sqrt()
    }

    /// Physical flux in Cartesian direction `d` (0, 1, 2).
    #[inline]
    pub fn flux(&self, q: &EulerState, d: usize) -> EulerState {
        let vel = q.velocity();
        let p = self.pressure(q);
        let un = vel[d];
        let mut flux = EulerState::new(
            q.rho * un,
            q.rho_u * un,
            q.rho_v * un,
            q.rho_w * un,
            (q.energy + p) * un,
        );
        match d {
            0 => flux.rho_u += p,
            1 => flux.rho_v += p,
            _ => flux.rho_w += p,
        }
        flux
    }

    /// All three Cartesian fluxes at once.
    #[inline]
    pub fn fluxes(&self, q: &EulerState) -> [EulerState; 3] {
        [self.flux(q, 0), self.flux(q, 1), self.flux(q, 2)]
    }

    /// Flux through a surface with (not necessarily unit) normal `n`.
    #[inline]
    pub fn normal_flux(&self, q: &EulerState, n: [f64; 3]) -> EulerState {
        let [fx, fy, fz] = self.fluxes(q);
        fx * n[0] + fy * n[1] + fz * n[2]
    }

    /// Largest wave speed |u·n| + c along unit normal `n`.
    #[inline]
    pub fn max_wave_speed(&self, q: &EulerState, n: [f64; 3]) -> f64 {
        let vel = q.velocity();
        let un = vel[0] * n[0] + vel[1] * n[1] + vel[2] * n[2];
        un.abs() + self.sound_speed(q)
    }
}

impl Default for Euler3D {
    fn default() -> Self {
        Self::new(1.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_primitive_roundtrip_pressure() {
        let euler = Euler3D::default();
        let q = EulerState::from_primitives(1.2, 0.3, -0.4, 0.5, 2.0, euler.gamma);
        assert_relative_eq!(euler.pressure(&q), 2.0, epsilon = 1e-14);
        let [u, v, w] = q.velocity();
        assert_relative_eq!(u, 0.3, epsilon = 1e-14);
        assert_relative_eq!(v, -0.4, epsilon = 1e-14);
        assert_relative_eq!(w, 0.5, epsilon = 1e-14);
    }

    #[test]
    fn test_flux_at_rest_is_pressure() {
        let euler = Euler3D::default();
        let q = EulerState::from_primitives(1.0, 0.0, 0.0, 0.0, 1.0, euler.gamma);
        let fy = euler.flux(&q, 1);
        assert_eq!(fy.rho, 0.0);
        assert_relative_eq!(fy.rho_v, 1.0, epsilon = 1e-14);
        assert_eq!(fy.rho_u, 0.0);
        assert_eq!(fy.energy, 0.0);
    }

    #[test]
    fn test_normal_flux_rotation() {
        let euler = Euler3D::default();
        let q = EulerState::from_primitives(1.0, 1.0, 2.0, 0.0, 1.0, euler.gamma);
        let s = 1.0 / 2.0_f64.sqrt();
        let fn_ = euler.normal_flux(&q, [s, s, 0.0]);
        // Mass flux ρ u·n
        assert_relative_eq!(fn_.rho, 3.0 * s, epsilon = 1e-14);
    }

    #[test]
    fn test_wave_speed() {
        let euler = Euler3D::default();
        let q = EulerState::from_primitives(1.4, -2.0, 0.0, 0.0, 1.0, euler.gamma);
        // c = sqrt(1.4 * 1 / 1.4) = 1
        assert_relative_eq!(euler.max_wave_speed(&q, [1.0, 0.0, 0.0]), 3.0, epsilon = 1e-14);
        assert_relative_eq!(q.kinetic_energy(), 2.8, epsilon = 1e-14);
    }
}
