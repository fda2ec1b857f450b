//! Device-resident geometric factors and face connectivity.

use burn::prelude::*;

use super::backend::{index_tensor, tensor_from_row_major};
use crate::connectivity::FaceNodeMap;
use crate::operators::{GeometricFactors3D, HexOperators, J_SLOT, N_FACES, N_FGEO, N_VGEO, SJ_SLOT};

/// Geometry split into per-quantity `[K, np]` and `[K, 6 nfp]` tensors.
#[derive(Clone, Debug)]
pub struct BurnGeometry3D<B: Backend> {
    /// Ja_{a,d} at slot 3a + d
    pub metrics: [Tensor<B, 2>; 9],
    pub jacobian: Tensor<B, 2>,
    /// Unit normal components
    pub normal: [Tensor<B, 2>; 3],
    pub surface_jacobian: Tensor<B, 2>,
    /// Partner of every face node, flat over `[K][6 nfp]`
    pub map_pq: Tensor<B, 1, Int>,
    /// Quadrature weight times J
    pub wjq: Tensor<B, 2>,
    pub n_elements: usize,
}

impl<B: Backend> BurnGeometry3D<B>
where
    B::FloatElem: From<f64>,
{
    pub fn from_cpu(
        ops: &HexOperators,
        geo: &GeometricFactors3D,
        map: &FaceNodeMap,
        device: &B::Device,
    ) -> Self {
        let k = geo.n_elements;
        let np = ops.np;
        let nface = N_FACES * ops.nfp;

        let volume_slot = |slot: usize| {
            let mut data = Vec::with_capacity(k * np);
            for e in 0..k {
                let base = (e * N_VGEO + slot) * np;
                data.extend_from_slice(&geo.vgeo[base..base + np]);
            }
            tensor_from_row_major::<B>(&data, [k, np], device)
        };
        let face_slot = |slot: usize| {
            let mut data = Vec::with_capacity(k * nface);
            for e in 0..k {
                let base = (e * N_FGEO + slot) * nface;
                data.extend_from_slice(&geo.fgeo[base..base + nface]);
            }
            tensor_from_row_major::<B>(&data, [k, nface], device)
        };

        Self {
            metrics: std::array::from_fn(|slot| volume_slot(slot)),
            jacobian: volume_slot(J_SLOT),
            normal: std::array::from_fn(|slot| face_slot(slot)),
            surface_jacobian: face_slot(SJ_SLOT),
            map_pq: index_tensor::<B>(map.as_slice(), device),
            wjq: tensor_from_row_major::<B>(&geo.quadrature_weighted_jacobian(ops), [k, np], device),
            n_elements: k,
        }
    }
}
