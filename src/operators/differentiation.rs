//! Differentiation matrix for nodal DG.
//!
//! The differentiation matrix Dr maps nodal values to derivative values:
//! (du/dr)_i = Σ_j Dr[i,j] * u_j
//!
//! Computed as Dr = Vr * V^{-1} where:
//! - V[i,j] = φ_j(r_i) is the Vandermonde matrix
//! - Vr[i,j] = φ'_j(r_i) is the derivative Vandermonde matrix
//!
//! The same construction serves both node families. On GLL nodes it
//! differentiates the geometry; on Gauss nodes it is the volume operator of the
//! strong-form solver.

use crate::basis::Vandermonde;
use faer::Mat;

/// Compute the differentiation matrix Dr = Vr * V^{-1}.
pub fn differentiation_matrix(vander: &Vandermonde) -> Mat<f64> {
    vander.differentiation_matrix()
}

/// Flatten a dense matrix into a row-major vector.
///
/// Kernels index operators as `op[i * n_cols + j]`.
pub fn row_major(m: &Mat<f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(m.nrows() * m.ncols());
    for i in 0..m.nrows() {
        for j in 0..m.ncols() {
            out.push(m[(i, j)]);
        }
    }
    out
}
