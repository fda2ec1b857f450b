//! Polynomial basis representations.
//!
//! The 1D Vandermonde matrix connects nodal and modal (normalized Legendre)
//! representations. Every hexahedral operator is a tensor product of 1D
//! operators built from it: differentiation, interpolation between node sets
//! and extrapolation to the element faces.

mod vandermonde;

pub use vandermonde::Vandermonde;
