//! Tensor-product application of 1D operators.
//!
//! A nodal field on a hexahedron is stored as a 3D array with shape
//! `[n0, n1, n2]` and flat index `i + n0 (j + n1 k)`. Applying a 1D operator
//! along one axis contracts that axis and leaves the other two untouched, so
//! differentiation and interpolation on hexahedra reduce to three passes of
//! small dense products.

use crate::types::Axis;

/// Apply the row-major `n_out × dims[axis]` matrix `op` along `axis`.
///
/// `output` has shape `dims` with `dims[axis]` replaced by `n_out` and is
/// overwritten.
pub fn apply_axis(
    op: &[f64],
    n_out: usize,
    axis: Axis,
    dims: [usize; 3],
    input: &[f64],
    output: &mut [f64],
) {
    let n_in = dims[axis.index()];
    debug_assert_eq!(op.len(), n_out * n_in);
    debug_assert_eq!(input.len(), dims[0] * dims[1] * dims[2]);

    let mut out_dims = dims;
    out_dims[axis.index()] = n_out;
    debug_assert_eq!(output.len(), out_dims[0] * out_dims[1] * out_dims[2]);

    let in_index = |i: usize, j: usize, k: usize| i + dims[0] * (j + dims[1] * k);
    let out_index = |i: usize, j: usize, k: usize| i + out_dims[0] * (j + out_dims[1] * k);

    for k in 0..out_dims[2] {
        for j in 0..out_dims[1] {
            for i in 0..out_dims[0] {
                let (row, base) = match axis {
                    Axis::R => (i, [0, j, k]),
                    Axis::S => (j, [i, 0, k]),
                    Axis::T => (k, [i, j, 0]),
                };
                let mut sum = 0.0;
                for l in 0..n_in {
                    let mut idx = base;
                    idx[axis.index()] = l;
                    sum += op[row * n_in + l] * input[in_index(idx[0], idx[1], idx[2])];
                }
                output[out_index(i, j, k)] = sum;
            }
        }
    }
}

/// Apply the same square-or-rectangular 1D operator along all three axes.
///
/// Maps a `[n_in; 3]` field to a `[n_out; 3]` field, e.g. GLL → Gauss
/// interpolation.
pub fn apply_all(op: &[f64], n_out: usize, n_in: usize, input: &[f64]) -> Vec<f64> {
    let mut a = vec![0.0; n_out * n_in * n_in];
    apply_axis(op, n_out, Axis::R, [n_in, n_in, n_in], input, &mut a);
    let mut b = vec![0.0; n_out * n_out * n_in];
    apply_axis(op, n_out, Axis::S, [n_out, n_in, n_in], &a, &mut b);
    let mut c = vec![0.0; n_out * n_out * n_out];
    apply_axis(op, n_out, Axis::T, [n_out, n_out, n_in], &b, &mut c);
    c
}

/// Apply a 1D operator along both directions of a 2D `[n_in, n_in]` face field.
pub fn apply_face(op: &[f64], n_out: usize, n_in: usize, input: &[f64]) -> Vec<f64> {
    let mut a = vec![0.0; n_out * n_in];
    apply_axis(op, n_out, Axis::R, [n_in, n_in, 1], input, &mut a);
    let mut b = vec![0.0; n_out * n_out];
    apply_axis(op, n_out, Axis::S, [n_out, n_in, 1], &a, &mut b);
    b
}

/// Volume index of the node at position `l` along `axis` and tangential
/// position `(a, b)` (tangential axes in increasing order), for `n1` nodes
/// per direction.
#[inline]
pub fn line_index(n1: usize, axis: Axis, l: usize, a: usize, b: usize) -> usize {
    match axis {
        Axis::R => l + n1 * (a + n1 * b),
        Axis::S => a + n1 * (l + n1 * b),
        Axis::T => a + n1 * (b + n1 * l),
    }
}
