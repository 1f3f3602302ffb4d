//! CPU baseline
//!
//! A rough host-side matrix multiplication timing for comparison with the
//! GPU benchmark.

use candle_core::Device;

use crate::compute::kernels;
use crate::domain::BenchmarkResult;
use crate::error::ComputeError;

/// Time `iterations` multiplications of `size`x`size` matrices on the CPU
pub fn cpu_baseline(size: usize, iterations: u32) -> Result<BenchmarkResult, ComputeError> {
    kernels::matmul_benchmark(&Device::Cpu, size, 0, iterations)
}
