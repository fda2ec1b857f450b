//! Bucketed point lookup for face-node matching.
//!
//! Points are bucketed by quantized coordinates with cell size equal to the
//! matching tolerance. Any point within the tolerance of a query lies in one
//! of the 27 cells around the query's cell.

use std::collections::HashMap;

use crate::error::{DgError, Result};

/// Source of candidate partners for a query point.
pub trait CandidateIndex {
    /// Append every point index that may lie within the tolerance of `p`.
    fn candidates(&self, p: [f64; 3], out: &mut Vec<usize>);
}

/// Uniform-grid hash of point indices.
pub struct SpatialHash {
    grid: HashMap<(i64, i64, i64), Vec<usize>>,
    step: f64,
}

impl SpatialHash {
    /// Bucket all points `(x[i], y[i], z[i])` with cell size `step`.
    pub fn new(x: &[f64], y: &[f64], z: &[f64], step: f64) -> Result<Self> {
        if !(step.is_finite() && step > 0.0) {
            return Err(DgError::config(format!("cell size must be positive, got {}", step)));
        }
        let mut grid: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
        for i in 0..x.len() {
            let cell = Self::cell_of([x[i], y[i], z[i]], step);
            grid.entry(cell).or_default().push(i);
        }
        Ok(Self { grid, step })
    }

    #[inline]
    fn cell_of(p: [f64; 3], step: f64) -> (i64, i64, i64) {
        (
            (p[0] / step).floor() as i64,
            (p[1] / step).floor() as i64,
            (p[2] / step).floor() as i64,
        )
    }

    /// Number of occupied cells.
    pub fn n_cells(&self) -> usize {
        self.grid.len()
    }

    /// Largest number of points in a single cell.
    pub fn max_bucket(&self) -> usize {
        self.grid.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl CandidateIndex for SpatialHash {
    fn candidates(&self, p: [f64; 3], out: &mut Vec<usize>) {
        let (ci, cj, ck) = Self::cell_of(p, self.step);
        for di in -1..=1 {
            for dj in -1..=1 {
                for dk in -1..=1 {
                    if let Some(indices) = self.grid.get(&(ci + di, cj + dj, ck + dk)) {
                        out.extend_from_slice(indices);
                    }
                }
            }
        }
    }
}

/// Every point is a candidate. O(M) per query; reference for tests.
pub struct AllPoints {
    n: usize,
}

impl AllPoints {
    pub fn new(n: usize) -> Self {
        Self { n }
    }
}

impl CandidateIndex for AllPoints {
    fn candidates(&self, _p: [f64; 3], out: &mut Vec<usize>) {
        out.extend(0..self.n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbouring_cells_found() {
        let x = [0.0, 0.09, 0.5, -0.05];
        let y = [0.0, 0.0, 0.0, 0.0];
        let z = [0.0, 0.0, 0.0, 0.0];
        let hash = SpatialHash::new(&x, &y, &z, 0.1).unwrap();
        let mut out = Vec::new();
        hash.candidates([0.0, 0.0, 0.0], &mut out);
        out.sort_unstable();
        assert_eq!(out, vec![0, 1, 3]);
        assert_eq!(hash.n_cells(), 3);
        assert_eq!(hash.max_bucket(), 2);
    }

    #[test]
    fn test_far_point_has_no_candidates() {
        let hash = SpatialHash::new(&[0.0], &[0.0], &[0.0], 0.1).unwrap();
        let mut out = Vec::new();
        hash.candidates([1.0, 1.0, 1.0], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_non_positive_cell_size_rejected() {
        for step in [0.0, -0.1, f64::NAN] {
            let result = SpatialHash::new(&[0.0], &[0.0], &[0.0], step);
            assert!(matches!(result, Err(DgError::InvalidConfig(_))));
        }
    }
}
