//! Tensor workloads
//!
//! Device-agnostic candle operations shared by every runtime and by the CPU
//! baseline.

use candle_core::{DType, Device, Tensor};
use std::time::Instant;

use crate::domain::BenchmarkResult;
use crate::error::ComputeError;

const F32_BYTES: u64 = std::mem::size_of::<f32>() as u64;

/// Create two `size`x`size` matrices of uniform random f32 values
pub fn random_pair(device: &Device, size: usize) -> Result<(Tensor, Tensor), ComputeError> {
    let a = Tensor::rand(0f32, 1f32, (size, size), device)
        .map_err(ComputeError::op("array creation"))?;
    let b = Tensor::rand(0f32, 1f32, (size, size), device)
        .map_err(ComputeError::op("array creation"))?;
    Ok((a, b))
}

/// Add, scale and reduce; returns the sum of the first matrix
pub fn elementwise_smoke(device: &Device, size: usize) -> Result<f32, ComputeError> {
    let (a, b) = random_pair(device, size)?;

    let _sum = (&a + &b).map_err(ComputeError::op("element-wise add"))?;
    let _scaled = a.affine(2.0, 0.0).map_err(ComputeError::op("element-wise scale"))?;
    let total = a
        .sum_all()
        .and_then(|t| t.to_scalar::<f32>())
        .map_err(ComputeError::op("reduction"))?;

    Ok(total)
}

/// Time `iterations` matrix multiplications after `warmup` untimed ones
///
/// The device is synchronized after the warmup and after every timed
/// iteration so queued work is included in the measurement.
pub fn matmul_benchmark(
    device: &Device,
    size: usize,
    warmup: u32,
    iterations: u32,
) -> Result<BenchmarkResult, ComputeError> {
    let (a, b) = random_pair(device, size)?;

    for _ in 0..warmup {
        a.matmul(&b).map_err(ComputeError::op("matmul warmup"))?;
    }
    device
        .synchronize()
        .map_err(ComputeError::op("synchronize"))?;

    let start = Instant::now();
    for _ in 0..iterations {
        let _product = a.matmul(&b).map_err(ComputeError::op("matmul"))?;
        device
            .synchronize()
            .map_err(ComputeError::op("synchronize"))?;
    }

    Ok(BenchmarkResult::new(size, iterations, start.elapsed()))
}

/// Allocate a zeroed f32 buffer of roughly `bytes` bytes
pub fn allocate_zeros(device: &Device, bytes: u64) -> Result<Tensor, ComputeError> {
    let elements = (bytes / F32_BYTES) as usize;
    Tensor::zeros(elements, DType::F32, device).map_err(ComputeError::op("allocation"))
}
