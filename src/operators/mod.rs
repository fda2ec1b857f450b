//! DG operators on the reference hexahedron.
//!
//! This module provides:
//! - 1D differentiation, interpolation, face-extrapolation and LIFT operators
//!   for the two node families (`HexOperators`)
//! - Tensor-product application helpers (`tensor`)
//! - Curvilinear geometric factors (`GeometricFactors3D`)
//!
//! Geometry lives on Gauss-Lobatto-Legendre (GLL) nodes, the solution on
//! Gauss-Legendre (GQ) nodes. All 3D operators are tensor products of the 1D
//! matrices held here.

mod differentiation;
mod geometric;
mod lift;
pub mod tensor;

pub use differentiation::{differentiation_matrix, row_major};
pub use geometric::{GeometricFactors3D, J_SLOT, N_FGEO, N_VGEO, SJ_SLOT};
pub use lift::{face_extrapolation, lift_matrix};

use crate::basis::Vandermonde;
use crate::error::{DgError, Result};
use crate::polynomial::{gauss_legendre, gauss_lobatto_nodes, gauss_lobatto_weights};
use faer::Mat;

/// Number of faces of a hexahedron.
pub const N_FACES: usize = 6;

/// Reference operators for hexahedral elements of a given order.
///
/// Dense matrices are kept as `faer::Mat`; the `*_flat` copies are row-major
/// vectors in the layout the device kernels consume.
#[derive(Clone)]
pub struct HexOperators {
    /// Polynomial order N
    pub order: usize,
    /// Nodes per direction (N + 1)
    pub n1: usize,
    /// Volume nodes per element ((N+1)^3)
    pub np: usize,
    /// Nodes per face ((N+1)^2)
    pub nfp: usize,
    /// GLL nodes (geometry)
    pub r_gll: Vec<f64>,
    /// GLL weights
    pub w_gll: Vec<f64>,
    /// Gauss nodes (solution)
    pub r_q: Vec<f64>,
    /// Gauss weights
    pub w_q: Vec<f64>,
    /// Vandermonde on GLL nodes
    pub vander_gll: Vandermonde,
    /// Vandermonde on Gauss nodes
    pub vander_q: Vandermonde,
    /// Differentiation on GLL nodes
    pub d_gll: Mat<f64>,
    /// Differentiation on Gauss nodes
    pub d_q: Mat<f64>,
    /// Interpolation GLL -> Gauss
    pub gll_to_q: Mat<f64>,
    /// Face extrapolation from Gauss nodes, shape (2, N+1)
    pub vf: Mat<f64>,
    /// LIFT coefficients, shape (N+1, 2)
    pub lift: Mat<f64>,
    pub d_gll_flat: Vec<f64>,
    pub d_q_flat: Vec<f64>,
    pub gll_to_q_flat: Vec<f64>,
    pub vf_flat: Vec<f64>,
    pub lift_flat: Vec<f64>,
}

impl HexOperators {
    /// Build all reference operators for `order`.
    ///
    /// Fails with `InvalidConfig` for order 0.
    pub fn new(order: usize) -> Result<Self> {
        if order == 0 {
            return Err(DgError::config("polynomial order must be at least 1"));
        }
        let n1 = order + 1;

        let r_gll = gauss_lobatto_nodes(order);
        let w_gll = gauss_lobatto_weights(order, &r_gll);
        let (r_q, w_q) = gauss_legendre(n1);

        let vander_gll = Vandermonde::new(order, &r_gll);
        let vander_q = Vandermonde::new(order, &r_q);

        let d_gll = differentiation_matrix(&vander_gll);
        let d_q = differentiation_matrix(&vander_q);
        let gll_to_q = vander_gll.interpolation_matrix(&r_q);
        let vf = face_extrapolation(&vander_q);
        let lift = lift_matrix(&vf, &w_q);

        Ok(Self {
            order,
            n1,
            np: n1 * n1 * n1,
            nfp: n1 * n1,
            d_gll_flat: row_major(&d_gll),
            d_q_flat: row_major(&d_q),
            gll_to_q_flat: row_major(&gll_to_q),
            vf_flat: row_major(&vf),
            lift_flat: row_major(&lift),
            r_gll,
            w_gll,
            r_q,
            w_q,
            vander_gll,
            vander_q,
            d_gll,
            d_q,
            gll_to_q,
            vf,
            lift,
        })
    }

    /// Face nodes of all six faces of one element.
    #[inline]
    pub fn n_face_nodes(&self) -> usize {
        N_FACES * self.nfp
    }

    /// Tensor-product quadrature weights at the Gauss volume nodes.
    pub fn volume_weights(&self) -> Vec<f64> {
        let n1 = self.n1;
        let mut w = Vec::with_capacity(self.np);
        for k in 0..n1 {
            for j in 0..n1 {
                for i in 0..n1 {
                    w.push(self.w_q[i] * self.w_q[j] * self.w_q[k]);
                }
            }
        }
        w
    }
}
