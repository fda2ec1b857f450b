//! Vandermonde matrix for nodal-modal transformations.
//!
//! The Vandermonde matrix V connects nodal and modal representations:
//! - V[i,j] = φ_j(r_i) where φ_j is the j-th normalized Legendre polynomial
//! - nodal_values = V * modal_coeffs
//! - modal_coeffs = V^{-1} * nodal_values
//!
//! Changing node sets is a basis change through modal space:
//! I = V(targets) * V(nodes)^{-1} evaluates the degree-N interpolant at the
//! target points.

use crate::polynomial::{legendre, legendre_derivative};
use faer::{Mat, linalg::solvers::Solve};

/// Normalization factor sqrt((2j+1)/2), making ∫ φ_i φ_j dx = δ_{ij}.
#[inline]
fn mode_norm(j: usize) -> f64 {
    ((2 * j + 1) as f64 / 2.0).sqrt()
}

/// Vandermonde matrix and its inverse for a 1D node set.
#[derive(Clone)]
pub struct Vandermonde {
    /// Vandermonde matrix: V[i,j] = φ_j(r_i)
    pub v: Mat<f64>,
    /// Inverse Vandermonde matrix
    pub v_inv: Mat<f64>,
    /// Derivative Vandermonde: Vr[i,j] = φ'_j(r_i)
    pub vr: Mat<f64>,
    /// Polynomial order
    pub order: usize,
}

impl Vandermonde {
    /// Create the Vandermonde matrix for `order` on `order + 1` nodes.
    pub fn new(order: usize, nodes: &[f64]) -> Self {
        let n = order + 1;
        assert_eq!(nodes.len(), n, "Need order+1 nodes");

        let v = Self::evaluate(order, nodes);
        let mut vr = Mat::zeros(n, n);
        for (i, &r) in nodes.iter().enumerate() {
            for j in 0..n {
                vr[(i, j)] = mode_norm(j) * legendre_derivative(j, r);
            }
        }

        // Solve V * V_inv = I column by column
        let lu = v.as_ref().full_piv_lu();
        let mut v_inv = Mat::zeros(n, n);
        for j in 0..n {
            let mut rhs = Mat::zeros(n, 1);
            rhs[(j, 0)] = 1.0;
            let col = lu.solve(&rhs);
            for i in 0..n {
                v_inv[(i, j)] = col[(i, 0)];
            }
        }

        Self {
            v,
            v_inv,
            vr,
            order,
        }
    }

    /// Evaluate the first `order + 1` normalized modes at arbitrary points.
    ///
    /// Returns a `points.len() x (order + 1)` matrix.
    pub fn evaluate(order: usize, points: &[f64]) -> Mat<f64> {
        let n_modes = order + 1;
        let mut m = Mat::zeros(points.len(), n_modes);
        for (i, &r) in points.iter().enumerate() {
            for j in 0..n_modes {
                m[(i, j)] = mode_norm(j) * legendre(j, r);
            }
        }
        m
    }

    /// Interpolation matrix from this node set to `targets`: V(targets) V^{-1}.
    pub fn interpolation_matrix(&self, targets: &[f64]) -> Mat<f64> {
        let vt = Self::evaluate(self.order, targets);
        &vt * &self.v_inv
    }

    /// Differentiation matrix Dr = Vr V^{-1} on this node set.
    pub fn differentiation_matrix(&self) -> Mat<f64> {
        &self.vr * &self.v_inv
    }
}
