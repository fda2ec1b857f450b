//! Gauss-Lobatto-Legendre and Gauss-Legendre nodes and weights.
//!
//! Hexahedral elements use two node families:
//! - GLL nodes (roots of (1-x²)P'_N) include the endpoints, so a face of the
//!   element carries its own geometry nodes and neighbouring elements agree on
//!   the shared face exactly.
//! - Gauss nodes (roots of P_{N+1}) are strictly interior and integrate
//!   polynomials of degree 2N+1 exactly; the solution is collocated there.

use super::legendre::{legendre, legendre_and_derivative};
use std::f64::consts::PI;

const NEWTON_TOL: f64 = 1e-15;
const NEWTON_MAX_ITER: usize = 100;

/// Compute Gauss-Lobatto-Legendre nodes for polynomial order N.
///
/// Returns N+1 nodes in [-1, 1], including the endpoints, sorted ascending.
/// Uses Newton iteration from Chebyshev-Lobatto initial guesses.
pub fn gauss_lobatto_nodes(order: usize) -> Vec<f64> {
    let n = order;
    if n == 0 {
        return vec![0.0];
    }

    let mut nodes: Vec<f64> = (0..=n).map(|j| -(PI * j as f64 / n as f64).cos()).collect();
    nodes[0] = -1.0;
    nodes[n] = 1.0;

    let scale = (n * (n + 1)) as f64;
    for node in nodes.iter_mut().take(n).skip(1) {
        let mut x = *node;
        // L(x) = (1-x²)P'_N(x) has L'(x) = -N(N+1) P_N(x)
        for _ in 0..NEWTON_MAX_ITER {
            let (p_n, dp_n) = legendre_and_derivative(n, x);
            let update = (1.0 - x * x) * dp_n / (scale * p_n);
            x += update;
            if update.abs() < NEWTON_TOL {
                break;
            }
        }
        *node = x;
    }

    nodes
}

/// Compute Gauss-Lobatto-Legendre weights: w_j = 2 / (N(N+1) [P_N(x_j)]²).
pub fn gauss_lobatto_weights(order: usize, nodes: &[f64]) -> Vec<f64> {
    if order == 0 {
        return vec![2.0];
    }
    let denom = (order * (order + 1)) as f64;
    nodes
        .iter()
        .map(|&x| {
            let p_n = legendre(order, x);
            2.0 / (denom * p_n * p_n)
        })
        .collect()
}

/// Compute the `n_points` Gauss-Legendre nodes and weights.
///
/// Nodes are the roots of P_{n_points}, sorted ascending; weights are
/// w_j = 2 / ((1 - x_j²) [P'_{n_points}(x_j)]²). Exact for polynomials of
/// degree 2 n_points - 1.
pub fn gauss_legendre(n_points: usize) -> (Vec<f64>, Vec<f64>) {
    assert!(n_points > 0, "need at least one Gauss point");
    let n = n_points;

    let mut nodes = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    for j in 0..n {
        // Chebyshev-like initial guess, ordered from -1 to 1
        let mut x = -(PI * (j as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITER {
            let (p, d) = legendre_and_derivative(n, x);
            let update = p / d;
            x -= update;
            if update.abs() < NEWTON_TOL {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(n, x);
        nodes.push(x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }

    (nodes, weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monomial_integral(k: usize) -> f64 {
        if k % 2 == 0 {
            2.0 / (k + 1) as f64
        } else {
            0.0
        }
    }

    #[test]
    fn test_gll_endpoints_and_symmetry() {
        for order in 1..=7 {
            let nodes = gauss_lobatto_nodes(order);
            assert_eq!(nodes.len(), order + 1);
            assert!((nodes[0] + 1.0).abs() < 1e-14);
            assert!((nodes[order] - 1.0).abs() < 1e-14);
            for i in 0..nodes.len() / 2 {
                assert!((nodes[i] + nodes[order - i]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_gll_known_order_two() {
        let nodes = gauss_lobatto_nodes(2);
        let weights = gauss_lobatto_weights(2, &nodes);
        assert!(nodes[1].abs() < 1e-14);
        assert!((weights[0] - 1.0 / 3.0).abs() < 1e-14);
        assert!((weights[1] - 4.0 / 3.0).abs() < 1e-14);
    }

    #[test]
    fn test_gll_exactness() {
        for order in 1..=6 {
            let nodes = gauss_lobatto_nodes(order);
            let weights = gauss_lobatto_weights(order, &nodes);
            for k in 0..=(2 * order - 1) {
                let quad: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                assert!((quad - monomial_integral(k)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_gauss_nodes_are_interior_roots() {
        for n in 1..=8 {
            let (nodes, _) = gauss_legendre(n);
            assert_eq!(nodes.len(), n);
            for w in nodes.windows(2) {
                assert!(w[0] < w[1], "nodes must be ascending");
            }
            for &x in &nodes {
                assert!(x.abs() < 1.0);
                assert!(legendre(n, x).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_gauss_exactness() {
        for n in 1..=7 {
            let (nodes, weights) = gauss_legendre(n);
            let sum: f64 = weights.iter().sum();
            assert!((sum - 2.0).abs() < 1e-13);
            for k in 0..=(2 * n - 1) {
                let quad: f64 = nodes
                    .iter()
                    .zip(&weights)
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();
                assert!(
                    (quad - monomial_integral(k)).abs() < 1e-12,
                    "n={} degree={}: {}",
                    n,
                    k,
                    quad
                );
            }
        }
    }

    #[test]
    fn test_gauss_two_point_rule() {
        let (nodes, weights) = gauss_legendre(2);
        let r = 1.0 / 3.0_f64.sqrt();
        assert!((nodes[0] + r).abs() < 1e-14);
        assert!((nodes[1] - r).abs() < 1e-14);
        assert!((weights[0] - 1.0).abs() < 1e-14);
    }
}
