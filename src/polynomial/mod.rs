//! Polynomial evaluation and node generation.
//!
//! This module provides:
//! - 1D Legendre polynomials and their derivatives
//! - 1D Gauss-Lobatto-Legendre (GLL) nodes and weights, used to carry the
//!   curvilinear geometry
//! - 1D Gauss-Legendre (GQ) nodes and weights, used as collocation and
//!   quadrature points for the solution
//!
//! Hexahedral elements are built as tensor products of these 1D sets.

mod legendre;
mod nodes;

pub use legendre::{legendre, legendre_and_derivative, legendre_derivative};
pub use nodes::{gauss_legendre, gauss_lobatto_nodes, gauss_lobatto_weights};
