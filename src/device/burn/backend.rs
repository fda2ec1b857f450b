//! Backend abstraction and host transfer helpers.

use burn::prelude::*;

use super::error::BurnError;

/// Burn backends the DG kernels can run on.
pub trait DGBackend: Backend {
    /// Get the default device for this backend.
    fn default_device() -> Self::Device;
}

#[cfg(feature = "burn-ndarray")]
impl DGBackend for burn_ndarray::NdArray<f64> {
    fn default_device() -> Self::Device {
        burn_ndarray::NdArrayDevice::Cpu
    }
}

#[cfg(feature = "burn-wgpu")]
impl DGBackend for burn_wgpu::Wgpu {
    fn default_device() -> Self::Device {
        burn_wgpu::WgpuDevice::default()
    }
}

#[cfg(feature = "burn-cuda")]
impl DGBackend for burn_cuda::Cuda {
    fn default_device() -> Self::Device {
        burn_cuda::CudaDevice::default()
    }
}

/// Create a 2D tensor from row-major host data.
#[inline]
pub fn tensor_from_row_major<B: Backend>(
    data: &[f64],
    shape: [usize; 2],
    device: &B::Device,
) -> Tensor<B, 2>
where
    B::FloatElem: From<f64>,
{
    let data_converted: Vec<B::FloatElem> = data.iter().map(|&x| B::FloatElem::from(x)).collect();
    Tensor::from_data(
        burn::tensor::TensorData::new(data_converted, shape.to_vec()),
        device,
    )
}

/// Create a 1D tensor from host data.
#[inline]
pub fn tensor_from_slice<B: Backend>(data: &[f64], device: &B::Device) -> Tensor<B, 1>
where
    B::FloatElem: From<f64>,
{
    let data_converted: Vec<B::FloatElem> = data.iter().map(|&x| B::FloatElem::from(x)).collect();
    Tensor::from_data(
        burn::tensor::TensorData::new(data_converted, vec![data.len()]),
        device,
    )
}

/// Create an index tensor from host indices.
#[inline]
pub fn index_tensor<B: Backend>(indices: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let data: Vec<i64> = indices.iter().map(|&i| i as i64).collect();
    Tensor::from_data(
        burn::tensor::TensorData::new(data, vec![indices.len()]),
        device,
    )
}

/// Download a tensor of any rank to a flat host vector.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> Result<Vec<f64>, BurnError>
where
    f64: From<B::FloatElem>,
{
    tensor
        .to_data()
        .to_vec::<B::FloatElem>()
        .map(|v| v.into_iter().map(f64::from).collect())
        .map_err(|e| BurnError::DataTransfer(format!("{:?}", e)))
}
