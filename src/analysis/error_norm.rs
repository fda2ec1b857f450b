//! Over-integrated L2 error against an analytic solution.
//!
//! The numerical field lives on (N+1)^3 Gauss nodes; integrating the squared
//! error with the same rule would be exact only for the polynomial part. The
//! estimator maps everything to a finer Gauss rule with N+2 points per
//! direction:
//!
//! - solution: `V(r_fine) V(r_q)^{-1}` applied per direction
//! - coordinates and J: `V(r_fine) V(r_gll)^{-1}` from the geometry nodes
//!
//! and returns `sqrt(Σ w J Σ_fields (exact - numerical)²)`.

use super::AnalyticSolution;
use crate::equations::N_FIELDS;
use crate::error::{DgError, Result};
use crate::mesh::HexMesh;
use crate::operators::tensor::apply_all;
use crate::operators::{row_major, GeometricFactors3D, HexOperators};
use crate::polynomial::gauss_legendre;
use crate::solver::{Field, FieldArray};

/// Precomputed fine-rule interpolation for L2 errors.
#[derive(Clone, Debug)]
pub struct L2ErrorEstimator {
    n1: usize,
    n_fine: usize,
    /// Tensor-product fine weights, `[n_fine^3]`
    weights: Vec<f64>,
    /// Gauss → fine, row-major (n_fine × n1)
    q_to_fine: Vec<f64>,
    /// GLL → fine, row-major (n_fine × n1)
    gll_to_fine: Vec<f64>,
}

impl L2ErrorEstimator {
    /// Fine rule with N+2 points per direction.
    pub fn new(ops: &HexOperators) -> Self {
        Self::with_points(ops, ops.n1 + 1)
    }

    /// Fine rule with `n_fine` points per direction.
    pub fn with_points(ops: &HexOperators, n_fine: usize) -> Self {
        let (r_fine, w_fine) = gauss_legendre(n_fine);
        let mut weights = Vec::with_capacity(n_fine.pow(3));
        for k in 0..n_fine {
            for j in 0..n_fine {
                for i in 0..n_fine {
                    weights.push(w_fine[i] * w_fine[j] * w_fine[k]);
                }
            }
        }
        Self {
            n1: ops.n1,
            n_fine,
            weights,
            q_to_fine: row_major(&ops.vander_q.interpolation_matrix(&r_fine)),
            gll_to_fine: row_major(&ops.vander_gll.interpolation_matrix(&r_fine)),
        }
    }

    /// Points per direction of the fine rule.
    pub fn n_fine(&self) -> usize {
        self.n_fine
    }

    /// Physical coordinates of the fine nodes, `[element][n_fine^3]`.
    pub fn fine_coordinates(&self, mesh: &HexMesh) -> [Vec<f64>; 3] {
        let mut out: [Vec<f64>; 3] = Default::default();
        for k in 0..mesh.n_elements {
            let coords = mesh.element_coordinates(k);
            for d in 0..3 {
                out[d].extend(apply_all(&self.gll_to_fine, self.n_fine, self.n1, coords[d]));
            }
        }
        out
    }

    /// Weighted error contribution of one element.
    fn element_error(
        &self,
        k: usize,
        mesh: &HexMesh,
        geo: &GeometricFactors3D,
        q: &FieldArray,
        exact: &dyn AnalyticSolution,
        t: f64,
    ) -> f64 {
        let np = geo.np;
        let coords = mesh.element_coordinates(k);
        let [x, y, z] = coords.map(|c| apply_all(&self.gll_to_fine, self.n_fine, self.n1, c));
        let jac = apply_all(
            &self.gll_to_fine,
            self.n_fine,
            self.n1,
            &geo.jacobian_gll[k * np..(k + 1) * np],
        );
        let numerical: Vec<Vec<f64>> = Field::ALL
            .iter()
            .map(|&f| apply_all(&self.q_to_fine, self.n_fine, self.n1, q.element_field(f, k)))
            .collect();

        let mut sum = 0.0;
        for n in 0..self.weights.len() {
            let reference = exact.evaluate(x[n], y[n], z[n], t).to_array();
            let sq: f64 = (0..N_FIELDS)
                .map(|f| (reference[f] - numerical[f][n]).powi(2))
                .sum();
            sum += self.weights[n] * jac[n] * sq;
        }
        sum
    }

    /// L2 error of `q` against `exact` at time `t`.
    pub fn error(
        &self,
        mesh: &HexMesh,
        geo: &GeometricFactors3D,
        q: &FieldArray,
        exact: &dyn AnalyticSolution,
        t: f64,
    ) -> Result<f64> {
        if q.n_elements() != mesh.n_elements || q.n_nodes() != self.n1.pow(3) {
            return Err(DgError::config(format!(
                "state has {} elements x {} nodes, mesh needs {} x {}",
                q.n_elements(),
                q.n_nodes(),
                mesh.n_elements,
                self.n1.pow(3)
            )));
        }

        #[cfg(feature = "parallel")]
        let total: f64 = {
            use rayon::prelude::*;
            (0..mesh.n_elements)
                .into_par_iter()
                .map(|k| self.element_error(k, mesh, geo, q, exact, t))
                .sum()
        };

        #[cfg(not(feature = "parallel"))]
        let total: f64 = (0..mesh.n_elements)
            .map(|k| self.element_error(k, mesh, geo, q, exact, t))
            .sum();

        Ok(total.sqrt())
    }
}
