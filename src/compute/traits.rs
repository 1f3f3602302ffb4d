//! Trait definitions for the GPU numeric library

use candle_core::Device;

use crate::compute::{cpu, kernels};
use crate::domain::{BenchmarkResult, ComputeCapability, CudaVersion, DeviceMemory};
use crate::error::ComputeError;

/// Result of the large-allocation probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationProbe {
    /// Bytes allocated
    pub bytes: u64,
    /// Device 0 memory while the buffer was held, if it could be read
    pub memory_while_held: Option<DeviceMemory>,
}

/// GPU runtime operations
///
/// Property queries are per device ordinal. Workload methods run on the
/// primary device and have default implementations built on
/// [`kernels`]; implementations only override them to change behavior.
pub trait ComputeRuntime {
    /// Human-readable backend description
    fn backend_name(&self) -> String;

    /// CUDA version the runtime reports, if known
    fn runtime_version(&self) -> Option<CudaVersion>;

    /// Number of visible devices
    fn device_count(&self) -> Result<u32, ComputeError>;

    /// Device product name
    fn device_name(&self, ordinal: u32) -> Result<String, ComputeError>;

    /// Free/total memory
    fn memory_info(&self, ordinal: u32) -> Result<DeviceMemory, ComputeError>;

    /// Architecture version
    fn compute_capability(&self, ordinal: u32) -> Result<ComputeCapability, ComputeError>;

    /// Number of streaming multiprocessors
    fn multiprocessor_count(&self, ordinal: u32) -> Result<u32, ComputeError>;

    /// Tensor device workloads run on
    fn primary_device(&self) -> &Device;

    /// Element-wise add/scale/sum on `size`x`size` random matrices
    fn elementwise_smoke(&self, size: usize) -> Result<f32, ComputeError> {
        kernels::elementwise_smoke(self.primary_device(), size)
    }

    /// Timed matrix multiplication with warmup and synchronization
    fn matmul_benchmark(
        &self,
        size: usize,
        warmup: u32,
        iterations: u32,
    ) -> Result<BenchmarkResult, ComputeError> {
        kernels::matmul_benchmark(self.primary_device(), size, warmup, iterations)
    }

    /// Host-side matrix multiplication timing for comparison
    fn cpu_baseline(&self, size: usize, iterations: u32) -> Result<BenchmarkResult, ComputeError> {
        cpu::cpu_baseline(size, iterations)
    }

    /// Allocate `bytes` of zeros, read device memory while held, then release
    fn probe_allocation(&self, bytes: u64) -> Result<AllocationProbe, ComputeError> {
        let device = self.primary_device();
        let buffer = kernels::allocate_zeros(device, bytes)?;

        let memory_while_held = match self.memory_info(0) {
            Ok(mem) => {
                log::debug!("Memory while allocation is held: {}", mem);
                Some(mem)
            }
            Err(e) => {
                log::debug!("Could not read memory while allocation was held: {}", e);
                None
            }
        };

        drop(buffer);
        device.synchronize().map_err(ComputeError::op("release"))?;

        Ok(AllocationProbe {
            bytes,
            memory_while_held,
        })
    }
}
