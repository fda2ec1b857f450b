//! Host implementation of the DG kernels.
//!
//! Each kernel loops over elements and writes only the output slice of its
//! own element, so elements are processed with `par_chunks_mut` when the
//! `parallel` feature is enabled. The surface kernel reads partner traces of
//! other elements from Qf, which no kernel writes concurrently.

use super::{check_len, Accelerator, KernelConfig, KernelName, KernelRegistry};
use crate::connectivity::FaceNodeMap;
use crate::equations::{Euler3D, EulerState, N_FIELDS};
use crate::error::{DgError, Result};
use crate::flux::{FluxContext3D, LaxFriedrichsFlux, NumericalFlux3D};
use crate::operators::tensor::{apply_axis, line_index};
use crate::operators::{
    GeometricFactors3D, HexOperators, J_SLOT, N_FACES, N_FGEO, N_VGEO, SJ_SLOT,
};
use crate::types::{face_side, Axis};

/// Reference operators in the flat layouts the host kernels use.
#[derive(Clone, Debug)]
pub struct CpuOperators {
    pub order: usize,
    pub n1: usize,
    pub np: usize,
    pub nfp: usize,
    /// Gauss differentiation matrix, row-major (n1 × n1)
    pub d_q: Vec<f64>,
    /// Face extrapolation, row-major (2 × n1)
    pub vf: Vec<f64>,
    /// LIFT coefficients, row-major (n1 × 2)
    pub lift: Vec<f64>,
}

impl CpuOperators {
    #[inline]
    fn n_face_nodes(&self) -> usize {
        N_FACES * self.nfp
    }
}

/// Geometry, connectivity and quadrature weights on the host.
#[derive(Clone, Debug)]
pub struct CpuGeometry {
    pub n_elements: usize,
    /// `[element][10][np]`
    pub vgeo: Vec<f64>,
    /// `[element][4][6 nfp]`
    pub fgeo: Vec<f64>,
    /// Partner of every face node
    pub map_pq: Vec<usize>,
    /// Quadrature weight times J, `[element][np]`
    pub wjq: Vec<f64>,
}

/// Runs every kernel on the host.
#[derive(Clone, Debug, Default)]
pub struct CpuAccelerator {
    registry: KernelRegistry,
}

impl CpuAccelerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn launch(&self, name: KernelName, ops: Option<&CpuOperators>) -> Result<KernelConfig> {
        let config = *self.registry.config(name)?;
        if let Some(ops) = ops {
            if ops.order != config.order {
                return Err(DgError::kernel(
                    name.as_str(),
                    format!(
                        "kernel built for order {}, operators have order {}",
                        config.order, ops.order
                    ),
                ));
            }
        }
        Ok(config)
    }
}

/// Run `f(element, chunk)` over consecutive `chunk`-sized pieces of `out`.
fn for_each_element<F>(out: &mut [f64], chunk: usize, f: F)
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(k, c)| f(k, c));
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(chunk).enumerate().for_each(|(k, c)| f(k, c));
    }
}

#[inline]
fn state_at(buffer: &[f64], stride: usize, k: usize, m: usize) -> EulerState {
    let base = k * N_FIELDS * stride + m;
    EulerState::new(
        buffer[base],
        buffer[base + stride],
        buffer[base + 2 * stride],
        buffer[base + 3 * stride],
        buffer[base + 4 * stride],
    )
}

fn eval_surface_element(ops: &CpuOperators, q_k: &[f64], qf_k: &mut [f64]) {
    let (n1, np, nfp) = (ops.n1, ops.np, ops.nfp);
    let nface = ops.n_face_nodes();
    for fld in 0..N_FIELDS {
        let u = &q_k[fld * np..(fld + 1) * np];
        let out = &mut qf_k[fld * nface..(fld + 1) * nface];
        for f in 0..N_FACES {
            let axis = Axis::from_face(f);
            let vf = &ops.vf[face_side(f) * n1..(face_side(f) + 1) * n1];
            for b in 0..n1 {
                for a in 0..n1 {
                    out[f * nfp + a + n1 * b] = (0..n1)
                        .map(|l| vf[l] * u[line_index(n1, axis, l, a, b)])
                        .sum();
                }
            }
        }
    }
}

fn volume_element(
    ops: &CpuOperators,
    euler: &Euler3D,
    vgeo_k: &[f64],
    q_k: &[f64],
    rhs_k: &mut [f64],
    rhsf_k: &mut [f64],
) {
    let (n1, np, nfp) = (ops.n1, ops.np, ops.nfp);
    let nface = ops.n_face_nodes();

    // Contravariant fluxes F̃_a = Σ_d Ja_{a,d} F_d, laid out [axis][field][np]
    let mut contravariant = vec![0.0; 3 * N_FIELDS * np];
    for n in 0..np {
        let q = state_at(q_k, np, 0, n);
        let f = euler.fluxes(&q).map(|s| s.to_array());
        for a in 0..3 {
            let ja = [
                vgeo_k[(3 * a) * np + n],
                vgeo_k[(3 * a + 1) * np + n],
                vgeo_k[(3 * a + 2) * np + n],
            ];
            for fld in 0..N_FIELDS {
                contravariant[(a * N_FIELDS + fld) * np + n] =
                    ja[0] * f[0][fld] + ja[1] * f[1][fld] + ja[2] * f[2][fld];
            }
        }
    }

    rhs_k.fill(0.0);
    let mut deriv = vec![0.0; np];
    for axis in Axis::ALL {
        for fld in 0..N_FIELDS {
            let ft = &contravariant[(axis.index() * N_FIELDS + fld) * np..][..np];
            apply_axis(&ops.d_q, n1, axis, [n1, n1, n1], ft, &mut deriv);
            for (r, d) in rhs_k[fld * np..(fld + 1) * np].iter_mut().zip(&deriv) {
                *r -= d;
            }

            // F · nJ on the two faces normal to this axis
            for side in 0..2 {
                let f = 2 * axis.index() + side;
                let sign = if side == 0 { -1.0 } else { 1.0 };
                let vf = &ops.vf[side * n1..(side + 1) * n1];
                for b in 0..n1 {
                    for a in 0..n1 {
                        let trace: f64 = (0..n1)
                            .map(|l| vf[l] * ft[line_index(n1, axis, l, a, b)])
                            .sum();
                        rhsf_k[fld * nface + f * nfp + a + n1 * b] = sign * trace;
                    }
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn surface_element(
    k: usize,
    ops: &CpuOperators,
    geo: &CpuGeometry,
    flux: &LaxFriedrichsFlux,
    euler: Euler3D,
    qf: &[f64],
    rhsf: &[f64],
    rhs_k: &mut [f64],
) {
    let (n1, np, nfp) = (ops.n1, ops.np, ops.nfp);
    let nface = ops.n_face_nodes();
    let fgeo_k = &geo.fgeo[k * N_FGEO * nface..(k + 1) * N_FGEO * nface];
    let rhsf_k = &rhsf[k * N_FIELDS * nface..(k + 1) * N_FIELDS * nface];

    // sJ F* - F · nJ at every face node
    let mut diff = vec![0.0; N_FIELDS * nface];
    for m in 0..nface {
        let p = geo.map_pq[k * nface + m];
        let q_minus = state_at(qf, nface, k, m);
        let q_plus = state_at(qf, nface, p / nface, p % nface);
        let normal = [fgeo_k[m], fgeo_k[nface + m], fgeo_k[2 * nface + m]];
        let sj = fgeo_k[SJ_SLOT * nface + m];
        let fstar = flux
            .compute(&q_minus, &q_plus, &FluxContext3D::new(euler, normal))
            .to_array();
        for fld in 0..N_FIELDS {
            diff[fld * nface + m] = sj * fstar[fld] - rhsf_k[fld * nface + m];
        }
    }

    for fld in 0..N_FIELDS {
        let out = &mut rhs_k[fld * np..(fld + 1) * np];
        let d = &diff[fld * nface..(fld + 1) * nface];
        for f in 0..N_FACES {
            let axis = Axis::from_face(f);
            let side = face_side(f);
            for b in 0..n1 {
                for a in 0..n1 {
                    let value = d[f * nfp + a + n1 * b];
                    for l in 0..n1 {
                        out[line_index(n1, axis, l, a, b)] -= ops.lift[l * 2 + side] * value;
                    }
                }
            }
        }
    }

    let jac = &geo.vgeo[(k * N_VGEO + J_SLOT) * np..(k * N_VGEO + J_SLOT + 1) * np];
    for fld in 0..N_FIELDS {
        for (r, j) in rhs_k[fld * np..(fld + 1) * np].iter_mut().zip(jac) {
            *r /= j;
        }
    }
}

impl Accelerator for CpuAccelerator {
    type Buffer = Vec<f64>;
    type Operators = CpuOperators;
    type Geometry = CpuGeometry;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn upload(&self, data: &[f64]) -> Result<Vec<f64>> {
        Ok(data.to_vec())
    }

    fn download(&self, buffer: &Vec<f64>) -> Result<Vec<f64>> {
        Ok(buffer.clone())
    }

    fn upload_operators(&self, ops: &HexOperators) -> Result<CpuOperators> {
        Ok(CpuOperators {
            order: ops.order,
            n1: ops.n1,
            np: ops.np,
            nfp: ops.nfp,
            d_q: ops.d_q_flat.clone(),
            vf: ops.vf_flat.clone(),
            lift: ops.lift_flat.clone(),
        })
    }

    fn upload_geometry(
        &self,
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
    ) -> Result<CpuGeometry> {
        if map.len() != geo.n_elements * ops.n_face_nodes() {
            return Err(DgError::config(format!(
                "face node map has {} entries, expected {}",
                map.len(),
                geo.n_elements * ops.n_face_nodes()
            )));
        }
        Ok(CpuGeometry {
            n_elements: geo.n_elements,
            vgeo: geo.vgeo.clone(),
            fgeo: geo.fgeo.clone(),
            map_pq: map.as_slice().to_vec(),
            wjq: geo.quadrature_weighted_jacobian(ops),
        })
    }

    fn build_kernel(&mut self, name: KernelName, config: &KernelConfig) -> Result<()> {
        self.registry.register(name, config)
    }

    fn is_built(&self, name: KernelName) -> bool {
        self.registry.is_built(name)
    }

    fn eval_surface(&self, ops: &CpuOperators, q: &Vec<f64>, qf: &mut Vec<f64>) -> Result<()> {
        let name = KernelName::EvalSurface;
        let config = self.launch(name, Some(ops))?;
        let k = config.n_elements;
        check_len(name, "Q", q.len(), k * N_FIELDS * ops.np)?;
        check_len(name, "Qf", qf.len(), k * N_FIELDS * ops.n_face_nodes())?;

        let chunk_q = N_FIELDS * ops.np;
        for_each_element(qf, N_FIELDS * ops.n_face_nodes(), |e, qf_k| {
            eval_surface_element(ops, &q[e * chunk_q..(e + 1) * chunk_q], qf_k);
        });
        Ok(())
    }

    fn volume(
        &self,
        ops: &CpuOperators,
        geo: &CpuGeometry,
        q: &Vec<f64>,
        rhs: &mut Vec<f64>,
        rhsf: &mut Vec<f64>,
    ) -> Result<()> {
        let name = KernelName::Volume;
        let config = self.launch(name, Some(ops))?;
        let k = config.n_elements;
        let (chunk, chunk_f) = (N_FIELDS * ops.np, N_FIELDS * ops.n_face_nodes());
        check_len(name, "Q", q.len(), k * chunk)?;
        check_len(name, "rhs", rhs.len(), k * chunk)?;
        check_len(name, "rhsf", rhsf.len(), k * chunk_f)?;
        check_len(name, "vgeo", geo.vgeo.len(), k * N_VGEO * ops.np)?;

        let euler = Euler3D::new(config.gamma);
        let chunk_g = N_VGEO * ops.np;
        let body = |e: usize, rhs_k: &mut [f64], rhsf_k: &mut [f64]| {
            volume_element(
                ops,
                &euler,
                &geo.vgeo[e * chunk_g..(e + 1) * chunk_g],
                &q[e * chunk..(e + 1) * chunk],
                rhs_k,
                rhsf_k,
            );
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            rhs.par_chunks_mut(chunk)
                .zip(rhsf.par_chunks_mut(chunk_f))
                .enumerate()
                .for_each(|(e, (rhs_k, rhsf_k))| body(e, rhs_k, rhsf_k));
        }

        #[cfg(not(feature = "parallel"))]
        {
            rhs.chunks_mut(chunk)
                .zip(rhsf.chunks_mut(chunk_f))
                .enumerate()
                .for_each(|(e, (rhs_k, rhsf_k))| body(e, rhs_k, rhsf_k));
        }
        Ok(())
    }

    fn surface(
        &self,
        ops: &CpuOperators,
        geo: &CpuGeometry,
        qf: &Vec<f64>,
        rhsf: &Vec<f64>,
        rhs: &mut Vec<f64>,
    ) -> Result<()> {
        let name = KernelName::Surface;
        let config = self.launch(name, Some(ops))?;
        let k = config.n_elements;
        let chunk_f = N_FIELDS * ops.n_face_nodes();
        check_len(name, "Qf", qf.len(), k * chunk_f)?;
        check_len(name, "rhsf", rhsf.len(), k * chunk_f)?;
        check_len(name, "rhs", rhs.len(), k * N_FIELDS * ops.np)?;
        check_len(name, "mapPq", geo.map_pq.len(), k * ops.n_face_nodes())?;

        let euler = Euler3D::new(config.gamma);
        let flux = LaxFriedrichsFlux::new(config.tau);
        for_each_element(rhs, N_FIELDS * ops.np, |e, rhs_k| {
            surface_element(e, ops, geo, &flux, euler, qf, rhsf, rhs_k);
        });
        Ok(())
    }

    fn update(
        &self,
        a: f64,
        b: f64,
        dt: f64,
        q: &mut Vec<f64>,
        rhs: &Vec<f64>,
        res: &mut Vec<f64>,
    ) -> Result<()> {
        let name = KernelName::Update;
        self.launch(name, None)?;
        check_len(name, "rhs", rhs.len(), q.len())?;
        check_len(name, "res", res.len(), q.len())?;

        let step = |(qi, (ri, hi)): (&mut f64, (&mut f64, &f64))| {
            *ri = a * *ri + dt * hi;
            *qi += b * *ri;
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            q.par_iter_mut()
                .zip(res.par_iter_mut().zip(rhs.par_iter()))
                .for_each(step);
        }

        #[cfg(not(feature = "parallel"))]
        {
            q.iter_mut().zip(res.iter_mut().zip(rhs.iter())).for_each(step);
        }
        Ok(())
    }

    fn compute_aux(&self, geo: &CpuGeometry, q: &Vec<f64>, ke: &mut Vec<f64>) -> Result<()> {
        let name = KernelName::ComputeAux;
        let config = self.launch(name, None)?;
        let k = config.n_elements;
        let np = config.np();
        check_len(name, "Q", q.len(), k * N_FIELDS * np)?;
        check_len(name, "wJq", geo.wjq.len(), k * np)?;
        check_len(name, "KE", ke.len(), k)?;

        for_each_element(ke, 1, |e, ke_k| {
            ke_k[0] = (0..np)
                .map(|n| geo.wjq[e * np + n] * state_at(q, np, e, n).kinetic_energy())
                .sum();
        });
        Ok(())
    }
}
