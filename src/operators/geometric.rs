//! Geometric factors for curvilinear hexahedra.
//!
//! The scaled inverse-map metrics Ja_{a,d} = J ∂ξ_a/∂x_d are computed on the
//! GLL geometry nodes in conservative curl form,
//!
//! ```text
//! rxJ = D_t((D_s y) z) - D_s((D_t y) z)
//! sxJ = D_r((D_t y) z) - D_t((D_r y) z)
//! txJ = D_s((D_r y) z) - D_r((D_s y) z)
//! ```
//!
//! and cyclically (y, z) → (z, x) → (x, y) for the y and z components. Each
//! metric is a polynomial of degree N per direction, so interpolating it to
//! the Gauss nodes is exact and the discrete metric identities
//! Σ_a D_a(Ja_{a,d}) = 0 hold to round-off there: a uniform state has a zero
//! right-hand side on curved elements.
//!
//! Face normals are the face values of the same metrics, nJ = ±Ja_{a,·} on the
//! face normal to axis `a`. The face value of a curl-form metric depends only
//! on the face geometry, so neighbours see equal and opposite normals.

use super::tensor::{apply_all, apply_axis, apply_face, line_index};
use super::{HexOperators, N_FACES};
use crate::error::{DgError, Result};
use crate::mesh::HexMesh;
use crate::types::{face_side, Axis};
use tracing::debug;

/// Volume geometry entries per node: nine metrics followed by J.
pub const N_VGEO: usize = 10;
/// Face geometry entries per face node: nx, ny, nz, sJ.
pub const N_FGEO: usize = 4;

/// Slot of J in the volume geometry layout.
pub const J_SLOT: usize = 9;
/// Slot of sJ in the face geometry layout.
pub const SJ_SLOT: usize = 3;

/// Geometric factors at the Gauss solution nodes and face nodes.
///
/// Stored directly in the device layouts:
/// - `vgeo` per element `[10][np]`: rxJ, ryJ, rzJ, sxJ, syJ, szJ, txJ, tyJ, tzJ, J
/// - `fgeo` per element `[4][6 nfp]`: nx, ny, nz, sJ
#[derive(Clone, Debug)]
pub struct GeometricFactors3D {
    pub n_elements: usize,
    pub np: usize,
    pub nfp: usize,
    pub vgeo: Vec<f64>,
    pub fgeo: Vec<f64>,
    /// J at the GLL geometry nodes, `[element][np]`
    pub jacobian_gll: Vec<f64>,
}

impl GeometricFactors3D {
    /// Compute all geometric factors of `mesh`.
    ///
    /// Fails with `MeshDegenerate` if J ≤ 0 at any GLL or Gauss node or
    /// sJ ≤ 0 at any face node. For face failures `node` is the element-local
    /// face node index `f * nfp + m`.
    pub fn compute(mesh: &HexMesh, ops: &HexOperators) -> Result<Self> {
        if mesh.order != ops.order {
            return Err(DgError::config(format!(
                "mesh has order {}, operators have order {}",
                mesh.order, ops.order
            )));
        }
        let n_elements = mesh.n_elements;
        let (np, nfp) = (ops.np, ops.nfp);
        let nface = N_FACES * nfp;

        let mut vgeo = vec![0.0; n_elements * N_VGEO * np];
        let mut fgeo = vec![0.0; n_elements * N_FGEO * nface];
        let mut jacobian_gll = vec![0.0; n_elements * np];

        for k in 0..n_elements {
            let element = ElementGeometry::compute(mesh, ops, k)?;
            jacobian_gll[k * np..(k + 1) * np].copy_from_slice(&element.jacobian_gll);
            vgeo[k * N_VGEO * np..(k + 1) * N_VGEO * np].copy_from_slice(&element.vgeo);
            fgeo[k * N_FGEO * nface..(k + 1) * N_FGEO * nface].copy_from_slice(&element.fgeo);
        }

        let geo = Self {
            n_elements,
            np,
            nfp,
            vgeo,
            fgeo,
            jacobian_gll,
        };
        debug!(
            min_j = geo.min_jacobian(),
            max_j = geo.max_jacobian(),
            max_sj = geo.max_face_jacobian(),
            "computed geometric factors"
        );
        Ok(geo)
    }

    /// Metric Ja_{a,d} at Gauss node `n` of element `k`.
    #[inline]
    pub fn metric(&self, k: usize, a: Axis, d: usize, n: usize) -> f64 {
        self.vgeo[(k * N_VGEO + 3 * a.index() + d) * self.np + n]
    }

    /// Jacobian J at Gauss node `n` of element `k`.
    #[inline]
    pub fn jacobian(&self, k: usize, n: usize) -> f64 {
        self.vgeo[(k * N_VGEO + J_SLOT) * self.np + n]
    }

    /// Unit outward normal at element-local face node `fnode`.
    #[inline]
    pub fn normal(&self, k: usize, fnode: usize) -> [f64; 3] {
        let nface = N_FACES * self.nfp;
        let base = k * N_FGEO * nface + fnode;
        [
            self.fgeo[base],
            self.fgeo[base + nface],
            self.fgeo[base + 2 * nface],
        ]
    }

    /// Surface Jacobian sJ at element-local face node `fnode`.
    #[inline]
    pub fn surface_jacobian(&self, k: usize, fnode: usize) -> f64 {
        let nface = N_FACES * self.nfp;
        self.fgeo[(k * N_FGEO + SJ_SLOT) * nface + fnode]
    }

    fn jacobians(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_elements).flat_map(move |k| (0..self.np).map(move |n| self.jacobian(k, n)))
    }

    /// Largest J over all Gauss nodes.
    pub fn max_jacobian(&self) -> f64 {
        self.jacobians().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Smallest J over all Gauss nodes.
    pub fn min_jacobian(&self) -> f64 {
        self.jacobians().fold(f64::INFINITY, f64::min)
    }

    /// Largest sJ over all face nodes.
    pub fn max_face_jacobian(&self) -> f64 {
        let nface = N_FACES * self.nfp;
        (0..self.n_elements)
            .flat_map(|k| (0..nface).map(move |m| (k, m)))
            .map(|(k, m)| self.surface_jacobian(k, m))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Quadrature weights times J at every Gauss node, `[element][np]`.
    pub fn quadrature_weighted_jacobian(&self, ops: &HexOperators) -> Vec<f64> {
        let w = ops.volume_weights();
        let mut out = Vec::with_capacity(self.n_elements * self.np);
        for k in 0..self.n_elements {
            out.extend((0..self.np).map(|n| w[n] * self.jacobian(k, n)));
        }
        out
    }
}

/// Geometry of a single element, in the per-element device layouts.
struct ElementGeometry {
    vgeo: Vec<f64>,
    fgeo: Vec<f64>,
    jacobian_gll: Vec<f64>,
}

impl ElementGeometry {
    fn compute(mesh: &HexMesh, ops: &HexOperators, k: usize) -> Result<Self> {
        let n1 = ops.n1;
        let np = ops.np;
        let nfp = ops.nfp;
        let dims = [n1; 3];
        let coords = mesh.element_coordinates(k);

        let derivative = |u: &[f64], axis: Axis| {
            let mut out = vec![0.0; np];
            apply_axis(&ops.d_gll_flat, n1, axis, dims, u, &mut out);
            out
        };

        // grad[c][a] = ∂x_c/∂ξ_a at GLL nodes
        let grad: Vec<[Vec<f64>; 3]> = coords
            .iter()
            .map(|u| Axis::ALL.map(|axis| derivative(u, axis)))
            .collect();

        let jacobian_gll: Vec<f64> = (0..np).map(|n| determinant(&grad, n)).collect();
        check_positive(k, &jacobian_gll)?;

        // Curl form: component d uses the cyclic pair (p, q) = (d+1, d+2)
        let mut metrics_gll: Vec<Vec<f64>> = vec![Vec::new(); 9];
        for d in 0..3 {
            let p = (d + 1) % 3;
            let q = coords[(d + 2) % 3];
            for a in 0..3 {
                let b = (a + 1) % 3;
                let c = (a + 2) % 3;
                let pb_q: Vec<f64> = (0..np).map(|n| grad[p][b][n] * q[n]).collect();
                let pc_q: Vec<f64> = (0..np).map(|n| grad[p][c][n] * q[n]).collect();
                let dc = derivative(&pb_q, Axis::ALL[c]);
                let db = derivative(&pc_q, Axis::ALL[b]);
                metrics_gll[3 * a + d] = dc.iter().zip(&db).map(|(x, y)| x - y).collect();
            }
        }

        let to_gauss = |u: &[f64]| apply_all(&ops.gll_to_q_flat, n1, n1, u);

        let mut vgeo = Vec::with_capacity(N_VGEO * np);
        for m in &metrics_gll {
            vgeo.extend(to_gauss(m));
        }

        let grad_q: Vec<[Vec<f64>; 3]> = grad
            .iter()
            .map(|g| [to_gauss(&g[0]), to_gauss(&g[1]), to_gauss(&g[2])])
            .collect();
        let jacobian_q: Vec<f64> = (0..np).map(|n| determinant(&grad_q, n)).collect();
        check_positive(k, &jacobian_q)?;
        vgeo.extend_from_slice(&jacobian_q);

        let nface = N_FACES * nfp;
        let mut fgeo = vec![0.0; N_FGEO * nface];
        let mut trace = vec![0.0; nfp];
        for f in 0..N_FACES {
            let axis = Axis::from_face(f);
            let (layer, sign) = if face_side(f) == 0 {
                (0, -1.0)
            } else {
                (ops.order, 1.0)
            };

            let mut nj: [Vec<f64>; 3] = Default::default();
            for (d, component) in nj.iter_mut().enumerate() {
                let metric = &metrics_gll[3 * axis.index() + d];
                for b in 0..n1 {
                    for a in 0..n1 {
                        trace[a + n1 * b] = sign * metric[line_index(n1, axis, layer, a, b)];
                    }
                }
                *component = apply_face(&ops.gll_to_q_flat, n1, n1, &trace);
            }

            for m in 0..nfp {
                let fnode = f * nfp + m;
                let sj = (nj[0][m].powi(2) + nj[1][m].powi(2) + nj[2][m].powi(2)).sqrt();
                if !(sj > 0.0) {
                    return Err(DgError::MeshDegenerate {
                        element: k,
                        node: fnode,
                        jacobian: sj,
                    });
                }
                for d in 0..3 {
                    fgeo[d * nface + fnode] = nj[d][m] / sj;
                }
                fgeo[SJ_SLOT * nface + fnode] = sj;
            }
        }

        Ok(Self {
            vgeo,
            fgeo,
            jacobian_gll,
        })
    }
}

/// det(∂x_c/∂ξ_a) at node `n`.
fn determinant(grad: &[[Vec<f64>; 3]], n: usize) -> f64 {
    let g = |c: usize, a: usize| grad[c][a][n];
    g(0, 0) * (g(1, 1) * g(2, 2) - g(1, 2) * g(2, 1))
        - g(0, 1) * (g(1, 0) * g(2, 2) - g(1, 2) * g(2, 0))
        + g(0, 2) * (g(1, 0) * g(2, 1) - g(1, 1) * g(2, 0))
}

fn check_positive(element: usize, jacobian: &[f64]) -> Result<()> {
    match jacobian.iter().position(|&j| !(j > 0.0)) {
        Some(node) => Err(DgError::MeshDegenerate {
            element,
            node,
            jacobian: jacobian[node],
        }),
        None => Ok(()),
    }
}
