//! Periodic face-node connectivity.
//!
//! Every face node of every element is paired with exactly one partner: the
//! coincident node of the neighbouring element across an interior face, or,
//! on the domain boundary, the node that coincides after translating by the
//! domain periods. Fluxes are computed from the own trace and the partner
//! trace, so the pairing must be an involution.
//!
//! Face nodes are indexed `g = k * (6 * nfp) + f * nfp + m`.
//!
//! Candidate partners come from a spatial hash with cell size equal to the
//! matching tolerance, giving expected O(M) work for M face nodes. An
//! all-pairs variant is kept as a reference.

mod spatial_hash;

pub use spatial_hash::{AllPoints, CandidateIndex, SpatialHash};

use crate::error::{DgError, Result};
use crate::mesh::HexMesh;
use crate::operators::{HexOperators, N_FACES};
use crate::types::Bounds3D;
use tracing::{debug, info};

/// Partner index of every face node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceNodeMap {
    map_pq: Vec<usize>,
    n_periodic: usize,
}

impl FaceNodeMap {
    /// Partner of face node `g`.
    #[inline]
    pub fn partner(&self, g: usize) -> usize {
        self.map_pq[g]
    }

    /// The flat partner table, one entry per face node.
    pub fn as_slice(&self) -> &[usize] {
        &self.map_pq
    }

    pub fn len(&self) -> usize {
        self.map_pq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map_pq.is_empty()
    }

    /// Face nodes paired across the periodic boundary.
    pub fn n_periodic(&self) -> usize {
        self.n_periodic
    }

    /// Whether `partner(partner(g)) == g` for every node.
    pub fn is_involution(&self) -> bool {
        self.map_pq
            .iter()
            .enumerate()
            .all(|(g, &p)| p < self.map_pq.len() && self.map_pq[p] == g)
    }
}

/// Face-node coordinates and the periodic box they live in.
pub struct FaceNodes<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub z: &'a [f64],
    /// Periods (DX, DY, DZ)
    pub periods: [f64; 3],
}

impl<'a> FaceNodes<'a> {
    fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    fn point(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }
}

/// Matching tolerance `0.25 · h_min / max(N, 1)`.
///
/// `h_min` is the smallest distance between adjacent nodes of any face, with
/// face nodes laid out `[n1 × n1]` per face.
pub fn matching_tolerance(x: &[f64], y: &[f64], z: &[f64], order: usize) -> f64 {
    let n1 = order + 1;
    let nfp = n1 * n1;
    let dist = |i: usize, j: usize| {
        ((x[i] - x[j]).powi(2) + (y[i] - y[j]).powi(2) + (z[i] - z[j]).powi(2)).sqrt()
    };

    let mut h_min = f64::INFINITY;
    for face in 0..x.len() / nfp {
        let base = face * nfp;
        for b in 0..n1 {
            for a in 0..n1 {
                let m = base + a + n1 * b;
                if a + 1 < n1 {
                    h_min = h_min.min(dist(m, m + 1));
                }
                if b + 1 < n1 {
                    h_min = h_min.min(dist(m, m + n1));
                }
            }
        }
    }
    0.25 * h_min / order.max(1) as f64
}

/// Build the face-node map of a mesh.
///
/// Face coordinates are taken at the face Gauss nodes; periods are the extents
/// of the undeformed mesh.
pub fn build_face_node_map(mesh: &HexMesh, ops: &HexOperators) -> Result<FaceNodeMap> {
    let [xf, yf, zf] = mesh.face_coordinates(ops);
    let tolerance = matching_tolerance(&xf, &yf, &zf, mesh.order);
    let nodes = FaceNodes {
        x: &xf,
        y: &yf,
        z: &zf,
        periods: mesh.periods(),
    };
    let map = match_face_nodes(&nodes, tolerance)?;
    info!(
        face_nodes = map.len(),
        periodic = map.n_periodic(),
        faces = mesh.n_elements * N_FACES,
        "face node map complete"
    );
    Ok(map)
}

/// Match face nodes using the spatial hash.
pub fn match_face_nodes(nodes: &FaceNodes<'_>, tolerance: f64) -> Result<FaceNodeMap> {
    check_tolerance(tolerance)?;
    let hash = SpatialHash::new(nodes.x, nodes.y, nodes.z, tolerance)?;
    debug!(
        tolerance,
        cells = hash.n_cells(),
        max_bucket = hash.max_bucket(),
        "bucketed face nodes"
    );
    match_with_index(nodes, tolerance, &hash)
}

/// Match face nodes by scanning all pairs. O(M²).
pub fn match_face_nodes_brute_force(
    nodes: &FaceNodes<'_>,
    tolerance: f64,
) -> Result<FaceNodeMap> {
    check_tolerance(tolerance)?;
    match_with_index(nodes, tolerance, &AllPoints::new(nodes.len()))
}

fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance > 0.0 {
        Ok(())
    } else {
        Err(DgError::config(format!(
            "matching tolerance must be positive, got {}",
            tolerance
        )))
    }
}

/// A matched partner and whether it was found through a periodic shift.
#[derive(Clone, Copy)]
struct Partner {
    index: usize,
    periodic: bool,
}

fn match_with_index<I>(nodes: &FaceNodes<'_>, tolerance: f64, index: &I) -> Result<FaceNodeMap>
where
    I: CandidateIndex + Sync,
{
    let m = nodes.len();
    let Some(bounds) = Bounds3D::enclosing(nodes.x, nodes.y, nodes.z) else {
        return Ok(FaceNodeMap {
            map_pq: Vec::new(),
            n_periodic: 0,
        });
    };

    #[cfg(feature = "parallel")]
    let partners: Vec<Partner> = {
        use rayon::prelude::*;
        (0..m)
            .into_par_iter()
            .map(|i| find_partner(nodes, &bounds, tolerance, index, i))
            .collect::<Result<Vec<_>>>()?
    };
    #[cfg(not(feature = "parallel"))]
    let partners: Vec<Partner> = (0..m)
        .map(|i| find_partner(nodes, &bounds, tolerance, index, i))
        .collect::<Result<Vec<_>>>()?;

    let map_pq: Vec<usize> = partners.iter().map(|p| p.index).collect();
    let n_periodic = partners.iter().filter(|p| p.periodic).count();

    if let Some(g) = (0..m).find(|&g| map_pq[map_pq[g]] != g) {
        let p = nodes.point(g);
        return Err(DgError::UnmatchedFaceNode {
            node: g,
            x: p[0],
            y: p[1],
            z: p[2],
            reason: format!(
                "asymmetric pairing: partner {} maps back to {}",
                map_pq[g], map_pq[map_pq[g]]
            ),
        });
    }

    Ok(FaceNodeMap { map_pq, n_periodic })
}

fn find_partner<I: CandidateIndex>(
    nodes: &FaceNodes<'_>,
    bounds: &Bounds3D,
    tolerance: f64,
    index: &I,
    i: usize,
) -> Result<Partner> {
    let p = nodes.point(i);
    let mut candidates = Vec::new();

    if let Some(j) = nearest(nodes, index, i, p, tolerance, &mut candidates) {
        return Ok(Partner {
            index: j,
            periodic: false,
        });
    }

    let mut best: Option<(usize, f64)> = None;
    for shift in translations(p, bounds, nodes.periods, tolerance) {
        let q = [p[0] + shift[0], p[1] + shift[1], p[2] + shift[2]];
        candidates.clear();
        if let Some(j) = nearest(nodes, index, i, q, tolerance, &mut candidates) {
            let d = distance(nodes.point(j), q);
            match best {
                Some((_, bd)) if bd <= d => {}
                _ => best = Some((j, d)),
            }
        }
    }

    match best {
        Some((j, _)) => Ok(Partner {
            index: j,
            periodic: true,
        }),
        None => Err(DgError::UnmatchedFaceNode {
            node: i,
            x: p[0],
            y: p[1],
            z: p[2],
            reason: format!("no partner within tolerance {:e}", tolerance),
        }),
    }
}

/// Closest node other than `skip` within `tolerance` of `q`.
fn nearest<I: CandidateIndex>(
    nodes: &FaceNodes<'_>,
    index: &I,
    skip: usize,
    q: [f64; 3],
    tolerance: f64,
    scratch: &mut Vec<usize>,
) -> Option<usize> {
    scratch.clear();
    index.candidates(q, scratch);
    scratch
        .iter()
        .copied()
        .filter(|&j| j != skip)
        .map(|j| (j, distance(nodes.point(j), q)))
        .filter(|&(_, d)| d < tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(j, _)| j)
}

/// Period translations consistent with the boundary planes `p` lies on.
///
/// A point on x-min is shifted by +DX, on x-max by -DX, and likewise for y
/// and z. A point on no boundary plane tries all 26 non-zero shifts.
fn translations(p: [f64; 3], bounds: &Bounds3D, periods: [f64; 3], tolerance: f64) -> Vec<[f64; 3]> {
    let lo = bounds.min();
    let hi = bounds.max();

    let mut options: [Vec<f64>; 3] = Default::default();
    let mut on_boundary = false;
    for d in 0..3 {
        options[d].push(0.0);
        if (p[d] - lo[d]).abs() < tolerance {
            options[d].push(periods[d]);
            on_boundary = true;
        }
        if (p[d] - hi[d]).abs() < tolerance {
            options[d].push(-periods[d]);
            on_boundary = true;
        }
    }
    if !on_boundary {
        for (d, opt) in options.iter_mut().enumerate() {
            *opt = vec![0.0, periods[d], -periods[d]];
        }
    }

    let mut shifts = Vec::new();
    for &sx in &options[0] {
        for &sy in &options[1] {
            for &sz in &options[2] {
                if sx != 0.0 || sy != 0.0 || sz != 0.0 {
                    shifts.push([sx, sy, sz]);
                }
            }
        }
    }
    shifts
}

#[inline]
fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_hex_mesh;

    fn nodes_of(mesh: &HexMesh, ops: &HexOperators) -> ([Vec<f64>; 3], f64) {
        let xyz = mesh.face_coordinates(ops);
        let tol = matching_tolerance(&xyz[0], &xyz[1], &xyz[2], mesh.order);
        (xyz, tol)
    }

    #[test]
    fn test_tolerance_scales_with_spacing() {
        let mesh = build_hex_mesh([2, 2, 2], Bounds3D::unit_cube(), 1).unwrap();
        let ops = HexOperators::new(1).unwrap();
        let (_, tol) = nodes_of(&mesh, &ops);
        // Two Gauss nodes per direction at ±1/√3 on faces of size 1/2
        let spacing = 0.5 * (2.0 / 3.0_f64.sqrt()) / 2.0;
        assert!((tol - 0.25 * spacing).abs() < 1e-12);
    }

    #[test]
    fn test_single_element_is_self_periodic() {
        // Opposite faces of the one element pair with each other
        let mesh = build_hex_mesh([1, 1, 1], Bounds3D::unit_cube(), 2).unwrap();
        let ops = HexOperators::new(2).unwrap();
        let map = build_face_node_map(&mesh, &ops).unwrap();
        let nfp = ops.nfp;
        assert!(map.is_involution());
        assert_eq!(map.n_periodic(), map.len());
        for m in 0..nfp {
            assert_eq!(map.partner(m), nfp + m);
            assert_eq!(map.partner(4 * nfp + m), 5 * nfp + m);
        }
    }

    #[test]
    fn test_interior_neighbours() {
        // Face 1 (x = +) of element 0 meets face 0 of element 1
        let mesh = build_hex_mesh([2, 1, 1], Bounds3D::unit_cube(), 2).unwrap();
        let ops = HexOperators::new(2).unwrap();
        let map = build_face_node_map(&mesh, &ops).unwrap();
        let nface = N_FACES * ops.nfp;
        for m in 0..ops.nfp {
            assert_eq!(map.partner(ops.nfp + m), nface + m);
        }
    }

    #[test]
    fn test_wrong_period_is_unmatched() {
        let mesh = build_hex_mesh([2, 2, 2], Bounds3D::unit_cube(), 1).unwrap();
        let ops = HexOperators::new(1).unwrap();
        let (xyz, tol) = nodes_of(&mesh, &ops);
        let nodes = FaceNodes {
            x: &xyz[0],
            y: &xyz[1],
            z: &xyz[2],
            periods: [1.0, 1.3, 1.0],
        };
        let err = match_face_nodes(&nodes, tol).unwrap_err();
        assert!(matches!(err, DgError::UnmatchedFaceNode { .. }));
    }

    #[test]
    fn test_asymmetric_pairing_detected() {
        // Three coincident points: 0 and 2 both pick 1, which picks 0
        let x = [0.5, 0.5, 0.5];
        let y = [0.5, 0.5, 0.5];
        let z = [0.5, 0.5, 0.5];
        let nodes = FaceNodes {
            x: &x,
            y: &y,
            z: &z,
            periods: [1.0, 1.0, 1.0],
        };
        let err = match_face_nodes_brute_force(&nodes, 0.1).unwrap_err();
        match err {
            DgError::UnmatchedFaceNode { reason, .. } => assert!(reason.contains("asymmetric")),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_non_positive_tolerance_rejected() {
        let nodes = FaceNodes {
            x: &[0.0],
            y: &[0.0],
            z: &[0.0],
            periods: [1.0, 1.0, 1.0],
        };
        assert!(matches!(
            match_face_nodes(&nodes, 0.0),
            Err(DgError::InvalidConfig(_))
        ));
    }
}
