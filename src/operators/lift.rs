//! Face extrapolation and LIFT for Gauss-collocated elements.
//!
//! Gauss nodes do not include the endpoints, so face values are extrapolated:
//! u(±1) = Σ_j ℓ_j(±1) u_j. The extraction matrix E (2 × (N+1)) holds these
//! coefficients, row 0 for r = -1 and row 1 for r = +1.
//!
//! With the diagonal Gauss mass matrix M = diag(w), the LIFT matrix is
//! LIFT = M^{-1} E^T, i.e. LIFT[i, side] = ℓ_i(±1) / w_i. On a hexahedron the
//! tangential weights of the face quadrature cancel against the volume
//! weights, so the 1D coefficients lift face data along each normal line.

use crate::basis::Vandermonde;
use faer::Mat;

/// Extraction matrix E with E[side, j] = ℓ_j(±1).
pub fn face_extrapolation(vander: &Vandermonde) -> Mat<f64> {
    vander.interpolation_matrix(&[-1.0, 1.0])
}

/// LIFT = M^{-1} E^T for diagonal mass matrix diag(weights).
///
/// Shape (N+1, 2); column 0 lifts the r = -1 face, column 1 the r = +1 face.
pub fn lift_matrix(extrapolation: &Mat<f64>, weights: &[f64]) -> Mat<f64> {
    let n = weights.len();
    assert_eq!(extrapolation.ncols(), n);
    let mut lift = Mat::zeros(n, 2);
    for i in 0..n {
        for side in 0..2 {
            lift[(i, side)] = extrapolation[(side, i)] / weights[i];
        }
    }
    lift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::gauss_legendre;

    #[test]
    fn test_extrapolation_rows_sum_to_one() {
        for order in 1..=6 {
            let (nodes, _) = gauss_legendre(order + 1);
            let vf = face_extrapolation(&Vandermonde::new(order, &nodes));
            for side in 0..2 {
                let sum: f64 = (0..=order).map(|j| vf[(side, j)]).sum();
                assert!((sum - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_lift_is_weak_boundary_term() {
        // Σ_i w_i u_i LIFT[i, side] = u(±1) for any polynomial u
        let order = 3;
        let (nodes, weights) = gauss_legendre(order + 1);
        let vf = face_extrapolation(&Vandermonde::new(order, &nodes));
        let lift = lift_matrix(&vf, &weights);

        let u = |x: f64| 0.3 + x - 2.0 * x * x * x;
        for (side, end) in [(0, -1.0), (1, 1.0)] {
            let value: f64 = (0..=order)
                .map(|i| weights[i] * u(nodes[i]) * lift[(i, side)])
                .sum();
            assert!((value - u(end)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_lift_symmetry() {
        // Mirror nodes swap the two faces
        let order = 4;
        let (nodes, weights) = gauss_legendre(order + 1);
        let lift = lift_matrix(
            &face_extrapolation(&Vandermonde::new(order, &nodes)),
            &weights,
        );
        for i in 0..=order {
            assert!((lift[(i, 0)] - lift[(order - i, 1)]).abs() < 1e-11);
        }
    }
}
