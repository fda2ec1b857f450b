//! Tensor-backend accelerator using the [Burn](https://github.com/tracel-ai/burn) framework.
//!
//! # Backend Selection
//!
//! - **CUDA**: NVIDIA GPUs (`burn-cuda` feature)
//! - **WGPU**: Cross-platform GPU (Vulkan/DX12/Metal, `burn-wgpu` feature)
//! - **NdArray**: CPU reference implementation (`burn-ndarray` feature)
//!
//! Solution buffers are flat 1D tensors in the same layouts as the host
//! backend; kernels reshape them into per-field `[K, n]` views and express
//! every tensor-product operator as a batched matmul with a dense
//! element-level matrix. The partner trace is gathered on the device with
//! `select` over the flattened face-node map.
//!
//! # Usage
//!
//! ```ignore
//! use dg_hex::device::burn::BurnAccelerator;
//! use dg_hex::device::{Accelerator, KernelConfig};
//! use burn_ndarray::{NdArray, NdArrayDevice};
//!
//! let mut acc = BurnAccelerator::<NdArray<f64>>::new(NdArrayDevice::Cpu);
//! acc.build_all(&KernelConfig::new(3, mesh.n_elements, 1.4))?;
//! let ops = acc.upload_operators(&host_ops)?;
//! ```
//!
//! Dense element matrices grow as (N+1)^6, so this backend pays off for many
//! elements at moderate order.

mod backend;
mod error;
mod geometry;
mod kernels;
mod operators;

pub use backend::{tensor_from_row_major, tensor_from_slice, tensor_to_vec, DGBackend};
pub use error::BurnError;
pub use geometry::BurnGeometry3D;
pub use kernels::{euler_fluxes, join_fields, kinetic_energy, lax_friedrichs, split_fields};
pub use operators::BurnOperators3D;

use burn::prelude::*;

use super::{check_len, Accelerator, KernelConfig, KernelName, KernelRegistry};
use crate::connectivity::FaceNodeMap;
use crate::equations::N_FIELDS;
use crate::error::{DgError, Result};
use crate::operators::{GeometricFactors3D, HexOperators};

/// Runs the DG kernels as batched tensor operations on a Burn device.
#[derive(Clone, Debug)]
pub struct BurnAccelerator<B: Backend> {
    device: B::Device,
    registry: KernelRegistry,
}

impl<B: Backend> BurnAccelerator<B> {
    pub fn new(device: B::Device) -> Self {
        Self {
            device,
            registry: KernelRegistry::new(),
        }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    fn launch(&self, name: KernelName, order: Option<usize>) -> Result<KernelConfig> {
        let config = *self.registry.config(name)?;
        if let Some(order) = order {
            if order != config.order {
                return Err(DgError::kernel(
                    name.as_str(),
                    format!(
                        "kernel built for order {}, operators have order {}",
                        config.order, order
                    ),
                ));
            }
        }
        Ok(config)
    }
}

impl<B: DGBackend> Default for BurnAccelerator<B> {
    fn default() -> Self {
        Self::new(B::default_device())
    }
}

#[inline]
fn len_of<B: Backend>(t: &Tensor<B, 1>) -> usize {
    t.dims()[0]
}

impl<B: Backend> Accelerator for BurnAccelerator<B>
where
    B::FloatElem: From<f64>,
    f64: From<B::FloatElem>,
{
    type Buffer = Tensor<B, 1>;
    type Operators = BurnOperators3D<B>;
    type Geometry = BurnGeometry3D<B>;

    fn name(&self) -> &'static str {
        "burn"
    }

    fn upload(&self, data: &[f64]) -> Result<Tensor<B, 1>> {
        Ok(tensor_from_slice::<B>(data, &self.device))
    }

    fn download(&self, buffer: &Tensor<B, 1>) -> Result<Vec<f64>> {
        Ok(tensor_to_vec(buffer)?)
    }

    fn zeros(&self, len: usize) -> Result<Tensor<B, 1>> {
        Ok(Tensor::zeros([len], &self.device))
    }

    fn upload_operators(&self, ops: &HexOperators) -> Result<BurnOperators3D<B>> {
        Ok(BurnOperators3D::from_cpu(ops, &self.device))
    }

    fn upload_geometry(
        &self,
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
    ) -> Result<BurnGeometry3D<B>> {
        if map.len() != geo.n_elements * ops.n_face_nodes() {
            return Err(DgError::config(format!(
                "face node map has {} entries, expected {}",
                map.len(),
                geo.n_elements * ops.n_face_nodes()
            )));
        }
        Ok(BurnGeometry3D::from_cpu(ops, geo, map, &self.device))
    }

    fn build_kernel(&mut self, name: KernelName, config: &KernelConfig) -> Result<()> {
        self.registry.register(name, config)
    }

    fn is_built(&self, name: KernelName) -> bool {
        self.registry.is_built(name)
    }

    fn eval_surface(
        &self,
        ops: &BurnOperators3D<B>,
        q: &Tensor<B, 1>,
        qf: &mut Tensor<B, 1>,
    ) -> Result<()> {
        let name = KernelName::EvalSurface;
        let config = self.launch(name, Some(ops.order))?;
        let k = config.n_elements;
        let nface = ops.n_face_nodes();
        check_len(name, "Q", len_of(q), k * N_FIELDS * ops.np)?;
        check_len(name, "Qf", len_of(qf), k * N_FIELDS * nface)?;

        let traces = split_fields(q, k, ops.np).map(|u| u.matmul(ops.vf_t.clone()));
        *qf = join_fields(traces, k, nface);
        Ok(())
    }

    fn volume(
        &self,
        ops: &BurnOperators3D<B>,
        geo: &BurnGeometry3D<B>,
        q: &Tensor<B, 1>,
        rhs: &mut Tensor<B, 1>,
        rhsf: &mut Tensor<B, 1>,
    ) -> Result<()> {
        let name = KernelName::Volume;
        let config = self.launch(name, Some(ops.order))?;
        let k = config.n_elements;
        let (np, nface) = (ops.np, ops.n_face_nodes());
        check_len(name, "Q", len_of(q), k * N_FIELDS * np)?;
        check_len(name, "rhs", len_of(rhs), k * N_FIELDS * np)?;
        check_len(name, "rhsf", len_of(rhsf), k * N_FIELDS * nface)?;

        let fluxes = euler_fluxes(&split_fields(q, k, np), config.gamma);
        let mut volume: [Tensor<B, 2>; N_FIELDS] =
            std::array::from_fn(|_| Tensor::zeros([k, np], &self.device));
        let mut faces: [Tensor<B, 2>; N_FIELDS] =
            std::array::from_fn(|_| Tensor::zeros([k, nface], &self.device));

        for a in 0..3 {
            for f in 0..N_FIELDS {
                let contravariant = (0..3)
                    .map(|d| geo.metrics[3 * a + d].clone().mul(fluxes[d][f].clone()))
                    .reduce(|acc, t| acc.add(t))
                    .ok_or_else(|| DgError::kernel(name.as_str(), "empty metric sum"))?;
                volume[f] = volume[f]
                    .clone()
                    .sub(contravariant.clone().matmul(ops.d_t[a].clone()));
                faces[f] = faces[f]
                    .clone()
                    .add(contravariant.matmul(ops.face_t[a].clone()));
            }
        }

        *rhs = join_fields(volume, k, np);
        *rhsf = join_fields(faces, k, nface);
        Ok(())
    }

    fn surface(
        &self,
        ops: &BurnOperators3D<B>,
        geo: &BurnGeometry3D<B>,
        qf: &Tensor<B, 1>,
        rhsf: &Tensor<B, 1>,
        rhs: &mut Tensor<B, 1>,
    ) -> Result<()> {
        let name = KernelName::Surface;
        let config = self.launch(name, Some(ops.order))?;
        let k = config.n_elements;
        let (np, nface) = (ops.np, ops.n_face_nodes());
        check_len(name, "Qf", len_of(qf), k * N_FIELDS * nface)?;
        check_len(name, "rhsf", len_of(rhsf), k * N_FIELDS * nface)?;
        check_len(name, "rhs", len_of(rhs), k * N_FIELDS * np)?;
        check_len(name, "mapPq", geo.map_pq.dims()[0], k * nface)?;

        let q_minus = split_fields(qf, k, nface);
        let q_plus = q_minus.clone().map(|t| {
            t.reshape([k * nface])
                .select(0, geo.map_pq.clone())
                .reshape([k, nface])
        });
        let fstar = lax_friedrichs(&q_minus, &q_plus, &geo.normal, config.gamma, config.tau);
        let interior = split_fields(rhsf, k, nface);
        let volume = split_fields(rhs, k, np);

        let mut out = volume;
        for f in 0..N_FIELDS {
            let diff = fstar[f]
                .clone()
                .mul(geo.surface_jacobian.clone())
                .sub(interior[f].clone());
            out[f] = out[f]
                .clone()
                .sub(diff.matmul(ops.lift_t.clone()))
                .div(geo.jacobian.clone());
        }
        *rhs = join_fields(out, k, np);
        Ok(())
    }

    fn update(
        &self,
        a: f64,
        b: f64,
        dt: f64,
        q: &mut Tensor<B, 1>,
        rhs: &Tensor<B, 1>,
        res: &mut Tensor<B, 1>,
    ) -> Result<()> {
        let name = KernelName::Update;
        self.launch(name, None)?;
        check_len(name, "rhs", len_of(rhs), len_of(q))?;
        check_len(name, "res", len_of(res), len_of(q))?;

        *res = res.clone().mul_scalar(a).add(rhs.clone().mul_scalar(dt));
        *q = q.clone().add(res.clone().mul_scalar(b));
        Ok(())
    }

    fn compute_aux(
        &self,
        geo: &BurnGeometry3D<B>,
        q: &Tensor<B, 1>,
        ke: &mut Tensor<B, 1>,
    ) -> Result<()> {
        let name = KernelName::ComputeAux;
        let config = self.launch(name, None)?;
        let (k, np) = (config.n_elements, config.np());
        check_len(name, "Q", len_of(q), k * N_FIELDS * np)?;
        check_len(name, "KE", len_of(ke), k)?;

        *ke = kinetic_energy(&split_fields(q, k, np))
            .mul(geo.wjq.clone())
            .sum_dim(1)
            .reshape([k]);
        Ok(())
    }
}

#[cfg(test)]
#[cfg(feature = "burn-ndarray")]
mod tests {
    use super::*;
    use crate::connectivity::build_face_node_map;
    use crate::device::CpuAccelerator;
    use crate::equations::EulerState;
    use crate::mesh::{apply_curved_warp, build_hex_mesh, WarpConfig};
    use crate::types::Bounds3D;
    use burn_ndarray::{NdArray, NdArrayDevice};

    type B = NdArray<f64>;

    fn max_diff(a: &[f64], b: &[f64]) -> f64 {
        assert_eq!(a.len(), b.len());
        a.iter().zip(b).fold(0.0, |m, (x, y)| m.max((x - y).abs()))
    }

    #[test]
    fn test_kernels_match_host_backend() {
        let order = 2;
        let bounds = Bounds3D::new(0.0, 2.0, 0.0, 2.0, 0.0, 2.0);
        let mut mesh = build_hex_mesh([2, 2, 1], bounds, order).unwrap();
        apply_curved_warp(&mut mesh, &WarpConfig::new(0.1, [1, 1, 1])).unwrap();
        let host_ops = HexOperators::new(order).unwrap();
        let geo = GeometricFactors3D::compute(&mesh, &host_ops).unwrap();
        let map = build_face_node_map(&mesh, &host_ops).unwrap();
        let config = KernelConfig::new(order, mesh.n_elements, 1.4);

        let [xq, yq, zq] = mesh.gauss_coordinates(&host_ops);
        let np = host_ops.np;
        let mut q0 = vec![0.0; mesh.n_elements * N_FIELDS * np];
        for k in 0..mesh.n_elements {
            for n in 0..np {
                let g = k * np + n;
                let s = EulerState::from_primitives(
                    1.0 + 0.1 * xq[g].sin(),
                    0.2 * yq[g].cos(),
                    -0.1 * zq[g].sin(),
                    0.05,
                    1.0 + 0.1 * xq[g].cos(),
                    1.4,
                )
                .to_array();
                for f in 0..N_FIELDS {
                    q0[(k * N_FIELDS + f) * np + n] = s[f];
                }
            }
        }
        let nf = mesh.n_elements * N_FIELDS * host_ops.n_face_nodes();
        let nv = q0.len();

        let mut cpu = CpuAccelerator::new();
        cpu.build_all(&config).unwrap();
        let c_ops = cpu.upload_operators(&host_ops).unwrap();
        let c_geo = cpu.upload_geometry(&host_ops, &geo, &map).unwrap();
        let (mut c_qf, mut c_rhs, mut c_rhsf) = (vec![0.0; nf], vec![0.0; nv], vec![0.0; nf]);
        let mut c_ke = vec![0.0; mesh.n_elements];
        cpu.eval_surface(&c_ops, &q0, &mut c_qf).unwrap();
        cpu.volume(&c_ops, &c_geo, &q0, &mut c_rhs, &mut c_rhsf).unwrap();
        cpu.surface(&c_ops, &c_geo, &c_qf, &c_rhsf, &mut c_rhs).unwrap();
        cpu.compute_aux(&c_geo, &q0, &mut c_ke).unwrap();

        let mut acc = BurnAccelerator::<B>::new(NdArrayDevice::Cpu);
        acc.build_all(&config).unwrap();
        let b_ops = acc.upload_operators(&host_ops).unwrap();
        let b_geo = acc.upload_geometry(&host_ops, &geo, &map).unwrap();
        let q = acc.upload(&q0).unwrap();
        let mut qf = acc.zeros(nf).unwrap();
        let mut rhs = acc.zeros(nv).unwrap();
        let mut rhsf = acc.zeros(nf).unwrap();
        let mut ke = acc.zeros(mesh.n_elements).unwrap();
        acc.eval_surface(&b_ops, &q, &mut qf).unwrap();
        acc.volume(&b_ops, &b_geo, &q, &mut rhs, &mut rhsf).unwrap();
        assert!(max_diff(&acc.download(&rhsf).unwrap(), &c_rhsf) < 1e-11);
        acc.surface(&b_ops, &b_geo, &qf, &rhsf, &mut rhs).unwrap();
        acc.compute_aux(&b_geo, &q, &mut ke).unwrap();

        assert!(max_diff(&acc.download(&qf).unwrap(), &c_qf) < 1e-12);
        assert!(max_diff(&acc.download(&rhs).unwrap(), &c_rhs) < 1e-9);
        assert!(max_diff(&acc.download(&ke).unwrap(), &c_ke) < 1e-12);
    }

    #[test]
    fn test_unbuilt_kernel_rejected() {
        let acc = BurnAccelerator::<B>::new(NdArrayDevice::Cpu);
        let mut q = acc.zeros(10).unwrap();
        let rhs = acc.zeros(10).unwrap();
        let mut res = acc.zeros(10).unwrap();
        let err = acc.update(0.0, 1.0, 0.1, &mut q, &rhs, &mut res).unwrap_err();
        assert!(matches!(err, DgError::KernelLaunch { ref kernel, .. } if kernel == "update"));
    }

    #[test]
    fn test_update_stage() {
        let mut acc = BurnAccelerator::<B>::new(NdArrayDevice::Cpu);
        acc.build_kernel(KernelName::Update, &KernelConfig::new(1, 1, 1.4))
            .unwrap();
        let mut q = acc.upload(&[1.0, 2.0]).unwrap();
        let rhs = acc.upload(&[1.0, -1.0]).unwrap();
        let mut res = acc.zeros(2).unwrap();
        acc.update(0.0, 0.5, 0.2, &mut q, &rhs, &mut res).unwrap();
        let q = acc.download(&q).unwrap();
        assert!((q[0] - 1.1).abs() < 1e-15);
        assert!((q[1] - 1.9).abs() < 1e-15);
    }
}
