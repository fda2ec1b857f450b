//! Smooth periodic volume warping.
//!
//! Every geometry node is displaced by `a · d(x) · (1, 1, 1)` with
//!
//! ```text
//! d(x) = Π_d sin(2π m_d (x_d - c_d) / L_d)
//! ```
//!
//! where `c` is the domain centre and `L` the periods. With integer wave
//! numbers `m_d` the displacement vanishes on every periodic boundary plane,
//! so the outer box is unchanged and periodic faces still coincide under
//! translation. Large amplitudes fold elements and are caught later as
//! degenerate Jacobians.

use super::HexMesh;
use crate::error::{DgError, Result};
use std::f64::consts::PI;
use tracing::debug;

/// Warp amplitude and integer wave numbers per direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpConfig {
    pub amplitude: f64,
    pub modes: [u32; 3],
}

impl WarpConfig {
    pub fn new(amplitude: f64, modes: [u32; 3]) -> Self {
        Self { amplitude, modes }
    }

    /// No deformation.
    pub fn none() -> Self {
        Self::new(0.0, [1, 1, 1])
    }

    /// Displacement factor `d` at a point, for domain centre `c` and periods `l`.
    pub fn displacement(&self, p: [f64; 3], c: [f64; 3], l: [f64; 3]) -> f64 {
        (0..3)
            .map(|d| (2.0 * PI * self.modes[d] as f64 * (p[d] - c[d]) / l[d]).sin())
            .product()
    }
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Displace every geometry node of `mesh`.
///
/// Zero amplitude leaves the mesh untouched.
pub fn apply_curved_warp(mesh: &mut HexMesh, config: &WarpConfig) -> Result<()> {
    if !config.amplitude.is_finite() {
        return Err(DgError::config(format!(
            "warp amplitude must be finite, got {}",
            config.amplitude
        )));
    }
    if config.amplitude == 0.0 {
        return Ok(());
    }

    let bounds = mesh.bounds();
    let center = bounds.center();
    let periods = bounds.periods();
    let a = config.amplitude;

    let mut max_shift: f64 = 0.0;
    for n in 0..mesh.x.len() {
        let d = config.displacement([mesh.x[n], mesh.y[n], mesh.z[n]], center, periods);
        mesh.x[n] += a * d;
        mesh.y[n] += a * d;
        mesh.z[n] += a * d;
        max_shift = max_shift.max((a * d).abs());
    }

    debug!(
        amplitude = a,
        modes = ?config.modes,
        max_shift,
        "applied curved warp"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_hex_mesh;
    use crate::types::Bounds3D;

    #[test]
    fn test_zero_amplitude_is_identity() {
        let mut mesh = build_hex_mesh([2, 2, 2], Bounds3D::unit_cube(), 2).unwrap();
        let before = mesh.x.clone();
        apply_curved_warp(&mut mesh, &WarpConfig::none()).unwrap();
        assert_eq!(mesh.x, before);
    }

    #[test]
    fn test_boundary_nodes_do_not_move() {
        let bounds = Bounds3D::new(0.0, 10.0, 0.0, 20.0, 0.0, 10.0);
        let mut mesh = build_hex_mesh([2, 4, 2], bounds, 3).unwrap();
        let original = mesh.clone();
        apply_curved_warp(&mut mesh, &WarpConfig::new(0.5, [1, 2, 1])).unwrap();

        let mut moved_interior = false;
        for n in 0..mesh.x.len() {
            let (x, y, z) = (original.x[n], original.y[n], original.z[n]);
            let on_boundary = [x, y, z]
                .iter()
                .zip(bounds.min().iter().zip(bounds.max().iter()))
                .any(|(&p, (&lo, &hi))| (p - lo).abs() < 1e-12 || (p - hi).abs() < 1e-12);
            let shift = (mesh.x[n] - x).abs() + (mesh.y[n] - y).abs() + (mesh.z[n] - z).abs();
            if on_boundary {
                assert!(shift < 1e-12, "boundary node {} moved by {}", n, shift);
            } else if shift > 1e-3 {
                moved_interior = true;
            }
        }
        assert!(moved_interior);
    }

    #[test]
    fn test_non_finite_amplitude_rejected() {
        let mut mesh = build_hex_mesh([1, 1, 1], Bounds3D::unit_cube(), 1).unwrap();
        let err = apply_curved_warp(&mut mesh, &WarpConfig::new(f64::NAN, [1, 1, 1]));
        assert!(matches!(err, Err(DgError::InvalidConfig(_))));
    }
}
