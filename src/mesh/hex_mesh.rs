//! Structured hexahedral mesh with high-order geometry nodes.
//!
//! The mesh stores:
//! - Vertex coordinates of the Cartesian grid
//! - Element-vertex connectivity (8 vertices, lexicographic `v = a + 2b + 4c`)
//! - Physical coordinates of every GLL geometry node, element-major
//!
//! Vertex convention (reference coordinates of vertex `v = a + 2b + 4c`):
//! `r = -1 + 2a`, `s = -1 + 2b`, `t = -1 + 2c`.

use crate::error::{DgError, Result};
use crate::operators::tensor::{apply_all, apply_face, line_index};
use crate::operators::{HexOperators, N_FACES};
use crate::polynomial::gauss_lobatto_nodes;
use crate::types::{Axis, Bounds3D};
use tracing::debug;

/// Hexahedral mesh of a box, with nodal geometry of order `order`.
#[derive(Clone, Debug)]
pub struct HexMesh {
    /// Polynomial order of the geometry nodes
    pub order: usize,
    /// Elements per direction (cx, cy, cz)
    pub counts: [usize; 3],
    /// Number of elements K
    pub n_elements: usize,
    /// Nodes per element ((N+1)^3)
    pub np: usize,
    /// Nodes per face ((N+1)^2)
    pub nfp: usize,
    /// Vertex coordinates of the undeformed grid
    pub vertices: Vec<[f64; 3]>,
    /// Element-vertex connectivity: elements[k][a + 2b + 4c]
    pub elements: Vec<[usize; 8]>,
    /// x at GLL nodes, index `k * np + n`
    pub x: Vec<f64>,
    /// y at GLL nodes
    pub y: Vec<f64>,
    /// z at GLL nodes
    pub z: Vec<f64>,
}

impl HexMesh {
    /// Corner coordinates of element `k`.
    pub fn element_vertices(&self, k: usize) -> [[f64; 3]; 8] {
        let mut out = [[0.0; 3]; 8];
        for (v, &idx) in self.elements[k].iter().enumerate() {
            out[v] = self.vertices[idx];
        }
        out
    }

    /// Map reference coordinates (r, s, t) in [-1, 1]^3 to physical
    /// coordinates with the trilinear map of element `k`.
    pub fn reference_to_physical(&self, k: usize, r: f64, s: f64, t: f64) -> [f64; 3] {
        let verts = self.element_vertices(k);
        let mut p = [0.0; 3];
        for (v, vert) in verts.iter().enumerate() {
            let (a, b, c) = (v & 1, (v >> 1) & 1, (v >> 2) & 1);
            let weight = shape(a, r) * shape(b, s) * shape(c, t);
            for d in 0..3 {
                p[d] += weight * vert[d];
            }
        }
        p
    }

    /// Bounding box of the undeformed vertices.
    pub fn bounds(&self) -> Bounds3D {
        let xs: Vec<f64> = self.vertices.iter().map(|v| v[0]).collect();
        let ys: Vec<f64> = self.vertices.iter().map(|v| v[1]).collect();
        let zs: Vec<f64> = self.vertices.iter().map(|v| v[2]).collect();
        Bounds3D::enclosing(&xs, &ys, &zs).unwrap_or_default()
    }

    /// Periods (DX, DY, DZ) of the fully periodic domain.
    pub fn periods(&self) -> [f64; 3] {
        self.bounds().periods()
    }

    /// Geometry node coordinates of element `k`.
    pub fn element_coordinates(&self, k: usize) -> [&[f64]; 3] {
        let range = k * self.np..(k + 1) * self.np;
        [
            &self.x[range.clone()],
            &self.y[range.clone()],
            &self.z[range],
        ]
    }

    /// Physical coordinates at the Gauss solution nodes, index `k * np + n`.
    pub fn gauss_coordinates(&self, ops: &HexOperators) -> [Vec<f64>; 3] {
        let mut out = [
            Vec::with_capacity(self.n_elements * self.np),
            Vec::with_capacity(self.n_elements * self.np),
            Vec::with_capacity(self.n_elements * self.np),
        ];
        for k in 0..self.n_elements {
            for (dst, src) in out.iter_mut().zip(self.element_coordinates(k)) {
                dst.extend(apply_all(&ops.gll_to_q_flat, ops.n1, ops.n1, src));
            }
        }
        out
    }

    /// Physical coordinates at the face Gauss nodes.
    ///
    /// Index `g = k * (6 * nfp) + f * nfp + m`; each face restricts the GLL
    /// geometry to the face and interpolates tangentially, so two elements
    /// sharing a face see the same points.
    pub fn face_coordinates(&self, ops: &HexOperators) -> [Vec<f64>; 3] {
        let n1 = ops.n1;
        let total = self.n_elements * N_FACES * self.nfp;
        let mut out = [
            Vec::with_capacity(total),
            Vec::with_capacity(total),
            Vec::with_capacity(total),
        ];
        let mut trace = vec![0.0; self.nfp];
        for k in 0..self.n_elements {
            let coords = self.element_coordinates(k);
            for f in 0..N_FACES {
                let axis = Axis::from_face(f);
                let layer = if f % 2 == 0 { 0 } else { self.order };
                for (dst, src) in out.iter_mut().zip(coords) {
                    for b in 0..n1 {
                        for a in 0..n1 {
                            trace[a + n1 * b] = src[line_index(n1, axis, layer, a, b)];
                        }
                    }
                    dst.extend(apply_face(&ops.gll_to_q_flat, n1, n1, &trace));
                }
            }
        }
        out
    }
}

/// Linear shape function of vertex coordinate `a` (0 or 1) at `r`.
#[inline]
fn shape(a: usize, r: f64) -> f64 {
    if a == 0 { 0.5 * (1.0 - r) } else { 0.5 * (1.0 + r) }
}

/// Builder for structured hexahedral meshes.
///
/// # Example
///
/// ```
/// use dg_hex::mesh::HexMeshBuilder;
/// use dg_hex::types::Bounds3D;
///
/// let mesh = HexMeshBuilder::new(Bounds3D::new(0.0, 10.0, 0.0, 20.0, 0.0, 10.0))
///     .with_elements(2, 4, 2)
///     .with_order(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(mesh.n_elements, 16);
/// assert_eq!(mesh.np, 64);
/// ```
#[derive(Clone, Debug)]
pub struct HexMeshBuilder {
    bounds: Bounds3D,
    counts: [usize; 3],
    order: usize,
}

impl HexMeshBuilder {
    /// Start from domain bounds; one element of order 1 until configured.
    pub fn new(bounds: Bounds3D) -> Self {
        Self {
            bounds,
            counts: [1, 1, 1],
            order: 1,
        }
    }

    /// Set the number of elements per direction.
    pub fn with_elements(mut self, cx: usize, cy: usize, cz: usize) -> Self {
        self.counts = [cx, cy, cz];
        self
    }

    /// Set the polynomial order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Tile the domain and place the GLL geometry nodes.
    pub fn build(self) -> Result<HexMesh> {
        let [cx, cy, cz] = self.counts;
        if cx == 0 || cy == 0 || cz == 0 {
            return Err(DgError::config(format!(
                "element counts must be positive, got {}×{}×{}",
                cx, cy, cz
            )));
        }
        if self.order == 0 {
            return Err(DgError::config("polynomial order must be at least 1"));
        }
        if !self.bounds.is_valid() {
            return Err(DgError::config(format!(
                "domain bounds {} are empty or inverted",
                self.bounds
            )));
        }

        let b = self.bounds;
        let [dx, dy, dz] = b.periods();
        let (hx, hy, hz) = (dx / cx as f64, dy / cy as f64, dz / cz as f64);

        let vertex_index = |i: usize, j: usize, k: usize| i + (cx + 1) * (j + (cy + 1) * k);
        let mut vertices = Vec::with_capacity((cx + 1) * (cy + 1) * (cz + 1));
        for k in 0..=cz {
            for j in 0..=cy {
                for i in 0..=cx {
                    // Pin the last plane to the bound to avoid round-off drift
                    let x = if i == cx { b.x_max } else { b.x_min + i as f64 * hx };
                    let y = if j == cy { b.y_max } else { b.y_min + j as f64 * hy };
                    let z = if k == cz { b.z_max } else { b.z_min + k as f64 * hz };
                    vertices.push([x, y, z]);
                }
            }
        }

        let n_elements = cx * cy * cz;
        let mut elements = Vec::with_capacity(n_elements);
        for ez in 0..cz {
            for ey in 0..cy {
                for ex in 0..cx {
                    let mut ev = [0usize; 8];
                    for (v, slot) in ev.iter_mut().enumerate() {
                        let (a, bb, c) = (v & 1, (v >> 1) & 1, (v >> 2) & 1);
                        *slot = vertex_index(ex + a, ey + bb, ez + c);
                    }
                    elements.push(ev);
                }
            }
        }

        let n1 = self.order + 1;
        let np = n1 * n1 * n1;
        let mut mesh = HexMesh {
            order: self.order,
            counts: self.counts,
            n_elements,
            np,
            nfp: n1 * n1,
            vertices,
            elements,
            x: Vec::with_capacity(n_elements * np),
            y: Vec::with_capacity(n_elements * np),
            z: Vec::with_capacity(n_elements * np),
        };

        let r = gauss_lobatto_nodes(self.order);
        for k in 0..n_elements {
            for l in 0..n1 {
                for j in 0..n1 {
                    for i in 0..n1 {
                        let [x, y, z] = mesh.reference_to_physical(k, r[i], r[j], r[l]);
                        mesh.x.push(x);
                        mesh.y.push(y);
                        mesh.z.push(z);
                    }
                }
            }
        }

        debug!(
            elements = n_elements,
            order = self.order,
            "built {}×{}×{} hexahedral mesh on {}",
            cx,
            cy,
            cz,
            b
        );
        Ok(mesh)
    }
}

/// Build a `counts[0] × counts[1] × counts[2]` mesh of `bounds` with order `order`.
pub fn build_hex_mesh(counts: [usize; 3], bounds: Bounds3D, order: usize) -> Result<HexMesh> {
    HexMeshBuilder::new(bounds)
        .with_elements(counts[0], counts[1], counts[2])
        .with_order(order)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_mesh(order: usize) -> HexMesh {
        build_hex_mesh([2, 3, 2], Bounds3D::new(0.0, 2.0, 0.0, 3.0, 0.0, 4.0), order).unwrap()
    }

    #[test]
    fn test_counts() {
        let mesh = unit_mesh(2);
        assert_eq!(mesh.n_elements, 12);
        assert_eq!(mesh.vertices.len(), 3 * 4 * 3);
        assert_eq!(mesh.x.len(), 12 * 27);
        assert_eq!(mesh.periods(), [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_element_ordering() {
        // k = ex + cx (ey + cy ez); element 1 is the second one along x
        let mesh = unit_mesh(1);
        let v = mesh.element_vertices(1);
        assert_eq!(v[0], [1.0, 0.0, 0.0]);
        assert_eq!(v[7], [2.0, 1.0, 2.0]);
        let v = mesh.element_vertices(2);
        assert_eq!(v[0], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gll_nodes_fill_element() {
        let mesh = unit_mesh(3);
        let [x, y, z] = mesh.element_coordinates(0);
        // First node is vertex 0, last node is vertex 7
        assert_eq!((x[0], y[0], z[0]), (0.0, 0.0, 0.0));
        let last = mesh.np - 1;
        assert!((x[last] - 1.0).abs() < 1e-14);
        assert!((y[last] - 1.0).abs() < 1e-14);
        assert!((z[last] - 2.0).abs() < 1e-14);
    }

    #[test]
    fn test_face_coordinates_lie_on_faces() {
        let mesh = unit_mesh(2);
        let ops = HexOperators::new(2).unwrap();
        let [xf, _, zf] = mesh.face_coordinates(&ops);
        let nfaces = N_FACES * mesh.nfp;
        assert_eq!(xf.len(), mesh.n_elements * nfaces);
        // Element 0: face 0 is x = 0, face 5 is z = 2
        for m in 0..mesh.nfp {
            assert!(xf[m].abs() < 1e-14);
            assert!((zf[5 * mesh.nfp + m] - 2.0).abs() < 1e-14);
        }
    }

    #[test]
    fn test_invalid_input_rejected() {
        let b = Bounds3D::unit_cube();
        assert!(matches!(
            build_hex_mesh([0, 1, 1], b, 2),
            Err(DgError::InvalidConfig(_))
        ));
        assert!(matches!(
            build_hex_mesh([1, 1, 1], b, 0),
            Err(DgError::InvalidConfig(_))
        ));
        let inverted = Bounds3D {
            z_min: 2.0,
            ..Bounds3D::unit_cube()
        };
        assert!(matches!(
            build_hex_mesh([1, 1, 1], inverted, 2),
            Err(DgError::InvalidConfig(_))
        ));
    }
}
