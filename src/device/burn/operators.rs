//! Device-resident DG operators for hexahedra.
//!
//! The 1D tensor-product operators are expanded into dense element-level
//! matrices so that every kernel is a batched matmul over all elements:
//! `[K, np] @ [np, np]` for differentiation, `[K, np] @ [np, 6 nfp]` for
//! face extrapolation and `[K, 6 nfp] @ [6 nfp, np]` for LIFT. All matrices
//! are stored transposed, ready to be applied from the right.

use burn::prelude::*;

use super::backend::tensor_from_row_major;
use crate::operators::tensor::line_index;
use crate::operators::{HexOperators, N_FACES};
use crate::types::{face_side, Axis};

/// Dense operators on the device.
#[derive(Clone, Debug)]
pub struct BurnOperators3D<B: Backend> {
    /// D_a^T per reference axis: [np, np]
    pub d_t: [Tensor<B, 2>; 3],
    /// Face extrapolation Vf^T: [np, 6 nfp]
    pub vf_t: Tensor<B, 2>,
    /// Signed extrapolation onto the two faces of each axis: [np, 6 nfp]
    pub face_t: [Tensor<B, 2>; 3],
    /// LIFT^T: [6 nfp, np]
    pub lift_t: Tensor<B, 2>,
    pub order: usize,
    pub np: usize,
    pub nfp: usize,
    pub device: B::Device,
}

impl<B: Backend> BurnOperators3D<B>
where
    B::FloatElem: From<f64>,
{
    /// Expand and upload the reference operators.
    pub fn from_cpu(ops: &HexOperators, device: &B::Device) -> Self {
        let (n1, np, nfp) = (ops.n1, ops.np, ops.nfp);
        let nface = N_FACES * nfp;

        let d_t = Axis::ALL.map(|axis| {
            let mut dt = vec![0.0; np * np];
            for b in 0..n1 {
                for a in 0..n1 {
                    for l_out in 0..n1 {
                        let row = line_index(n1, axis, l_out, a, b);
                        for l_in in 0..n1 {
                            let col = line_index(n1, axis, l_in, a, b);
                            dt[col * np + row] = ops.d_q_flat[l_out * n1 + l_in];
                        }
                    }
                }
            }
            tensor_from_row_major(&dt, [np, np], device)
        });

        let mut vf_t = vec![0.0; np * nface];
        let mut lift_t = vec![0.0; nface * np];
        let mut face_t = [vec![0.0; np * nface], vec![0.0; np * nface], vec![0.0; np * nface]];
        for f in 0..N_FACES {
            let axis = Axis::from_face(f);
            let side = face_side(f);
            let sign = if side == 0 { -1.0 } else { 1.0 };
            for b in 0..n1 {
                for a in 0..n1 {
                    let fnode = f * nfp + a + n1 * b;
                    for l in 0..n1 {
                        let n = line_index(n1, axis, l, a, b);
                        let v = ops.vf_flat[side * n1 + l];
                        vf_t[n * nface + fnode] = v;
                        face_t[axis.index()][n * nface + fnode] = sign * v;
                        lift_t[fnode * np + n] = ops.lift_flat[l * 2 + side];
                    }
                }
            }
        }

        Self {
            d_t,
            vf_t: tensor_from_row_major(&vf_t, [np, nface], device),
            face_t: face_t.map(|m| tensor_from_row_major(&m, [np, nface], device)),
            lift_t: tensor_from_row_major(&lift_t, [nface, np], device),
            order: ops.order,
            np,
            nfp,
            device: device.clone(),
        }
    }

    /// Face nodes per element.
    #[inline]
    pub fn n_face_nodes(&self) -> usize {
        N_FACES * self.nfp
    }
}

#[cfg(test)]
#[cfg(feature = "burn-ndarray")]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    #[test]
    fn test_operators_upload() {
        let cpu_ops = HexOperators::new(2).unwrap();
        let device = burn_ndarray::NdArrayDevice::Cpu;
        let ops = BurnOperators3D::<NdArray<f64>>::from_cpu(&cpu_ops, &device);

        assert_eq!(ops.d_t[0].dims(), [27, 27]);
        assert_eq!(ops.vf_t.dims(), [27, 54]);
        assert_eq!(ops.lift_t.dims(), [54, 27]);
        assert_eq!(ops.face_t[2].dims(), [27, 54]);
    }

    #[test]
    fn test_extrapolation_of_constant() {
        let cpu_ops = HexOperators::new(3).unwrap();
        let device = burn_ndarray::NdArrayDevice::Cpu;
        let ops = BurnOperators3D::<NdArray<f64>>::from_cpu(&cpu_ops, &device);

        let ones = Tensor::<NdArray<f64>, 2>::ones([1, cpu_ops.np], &device);
        let traces: Vec<f64> = ones.matmul(ops.vf_t.clone()).into_data().to_vec().unwrap();
        assert!(traces.iter().all(|v| (v - 1.0).abs() < 1e-13));
    }
}
