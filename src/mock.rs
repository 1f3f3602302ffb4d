//! Mock implementations for testing
//!
//! Provides a scripted driver query and a CPU-backed compute runtime for
//! unit testing without real hardware.

use crate::compute::{kernels, AllocationProbe, ComputeRuntime};
use crate::domain::{BenchmarkResult, ComputeCapability, CudaVersion, DeviceMemory};
use crate::error::{ComputeError, SmiError};
use crate::smi::DriverQuery;

use candle_core::Device;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply of [`MockQuery`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockResponse {
    /// Successful query with this stdout
    Output(String),
    /// Non-zero exit with this stderr
    Failed(String),
    /// Query timed out
    Timeout,
}

impl MockResponse {
    fn to_result(&self) -> Result<String, SmiError> {
        match self {
            Self::Output(stdout) => Ok(stdout.clone()),
            Self::Failed(stderr) => Err(SmiError::Failed {
                program: "mock-smi".to_string(),
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            Self::Timeout => Err(SmiError::Timeout {
                program: "mock-smi".to_string(),
                timeout: Duration::from_secs(5),
            }),
        }
    }
}

/// Scripted driver query
///
/// Replies are consumed in order; the last one repeats forever.
#[derive(Debug)]
pub struct MockQuery {
    responses: Mutex<VecDeque<MockResponse>>,
    calls: AtomicUsize,
    fields: Mutex<Vec<String>>,
    stop_after: Option<(usize, Arc<AtomicBool>)>,
}

impl MockQuery {
    /// Reply with the given responses in order
    pub fn sequence(responses: Vec<MockResponse>) -> Self {
        assert!(!responses.is_empty(), "MockQuery needs at least one response");
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            fields: Mutex::new(Vec::new()),
            stop_after: None,
        }
    }

    /// Shorthand for a successful response
    pub fn output(stdout: &str) -> MockResponse {
        MockResponse::Output(stdout.to_string())
    }

    /// Always succeed with `stdout`
    pub fn with_output(stdout: &str) -> Self {
        Self::sequence(vec![Self::output(stdout)])
    }

    /// Always exit non-zero with `stderr`
    pub fn failing(stderr: &str) -> Self {
        Self::sequence(vec![MockResponse::Failed(stderr.to_string())])
    }

    /// Always time out
    pub fn timing_out() -> Self {
        Self::sequence(vec![MockResponse::Timeout])
    }

    /// Builder: raise `flag` on the `calls`-th query
    pub fn stop_after(mut self, calls: usize, flag: Arc<AtomicBool>) -> Self {
        self.stop_after = Some((calls, flag));
        self
    }

    /// Number of queries made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Comma-joined field lists of every query made
    pub fn recorded_fields(&self) -> Vec<String> {
        self.fields.lock().unwrap().clone()
    }
}

impl DriverQuery for MockQuery {
    fn query(&self, fields: &[&str]) -> Result<String, SmiError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.fields.lock().unwrap().push(fields.join(","));

        if let Some((limit, flag)) = &self.stop_after {
            if call >= *limit {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let mut responses = self.responses.lock().unwrap();
        let response = if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        };
        response.to_result()
    }
}

/// Properties of one mock GPU
#[derive(Debug, Clone)]
pub struct MockGpu {
    pub name: Option<String>,
    pub capability: ComputeCapability,
    pub multiprocessors: Option<u32>,
    pub memory: Option<DeviceMemory>,
}

impl Default for MockGpu {
    fn default() -> Self {
        Self {
            name: Some("Mock GPU".to_string()),
            capability: ComputeCapability::new(8, 6),
            multiprocessors: Some(28),
            memory: Some(DeviceMemory::new(7 << 30, 8 << 30)),
        }
    }
}

impl MockGpu {
    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: make the name query fail
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Builder: make the multiprocessor query fail
    pub fn without_multiprocessor_count(mut self) -> Self {
        self.multiprocessors = None;
        self
    }

    /// Builder: make the memory query fail
    pub fn without_memory_info(mut self) -> Self {
        self.memory = None;
        self
    }
}

/// Compute runtime running workloads on the candle CPU device
pub struct MockRuntime {
    device: Device,
    gpus: Vec<MockGpu>,
    fail_elementwise: bool,
    fail_matmul: bool,
    fail_cpu_baseline: bool,
    fail_allocation: bool,
    out_of_memory: bool,
}

impl MockRuntime {
    /// Create a runtime with `count` default GPUs named "Mock GPU <i>"
    pub fn new(count: u32) -> Self {
        let gpus = (0..count)
            .map(|i| MockGpu::default().with_name(format!("Mock GPU {}", i)))
            .collect();
        Self::with_devices(gpus)
    }

    /// Create a runtime with the given GPUs
    pub fn with_devices(gpus: Vec<MockGpu>) -> Self {
        Self {
            device: Device::Cpu,
            gpus,
            fail_elementwise: false,
            fail_matmul: false,
            fail_cpu_baseline: false,
            fail_allocation: false,
            out_of_memory: false,
        }
    }

    /// Builder: fail the element-wise smoke test
    pub fn with_failing_elementwise(mut self) -> Self {
        self.fail_elementwise = true;
        self
    }

    /// Builder: fail the matmul benchmark
    pub fn with_failing_matmul(mut self) -> Self {
        self.fail_matmul = true;
        self
    }

    /// Builder: fail the CPU baseline
    pub fn with_failing_cpu_baseline(mut self) -> Self {
        self.fail_cpu_baseline = true;
        self
    }

    /// Builder: fail the allocation probe with a non-memory error
    pub fn with_failing_allocation(mut self) -> Self {
        self.fail_allocation = true;
        self
    }

    /// Builder: fail the allocation probe with out-of-memory
    pub fn with_out_of_memory(mut self) -> Self {
        self.out_of_memory = true;
        self
    }

    fn gpu(&self, ordinal: u32) -> Result<&MockGpu, ComputeError> {
        self.gpus
            .get(ordinal as usize)
            .ok_or_else(|| query_error(ordinal, "no such device"))
    }
}

fn query_error(ordinal: u32, message: &str) -> ComputeError {
    ComputeError::DeviceQuery {
        ordinal,
        message: message.to_string(),
    }
}

impl ComputeRuntime for MockRuntime {
    fn backend_name(&self) -> String {
        "mock (CPU)".to_string()
    }

    fn runtime_version(&self) -> Option<CudaVersion> {
        Some(CudaVersion::from_packed(12020))
    }

    fn device_count(&self) -> Result<u32, ComputeError> {
        Ok(self.gpus.len() as u32)
    }

    fn device_name(&self, ordinal: u32) -> Result<String, ComputeError> {
        self.gpu(ordinal)?
            .name
            .clone()
            .ok_or_else(|| query_error(ordinal, "name unavailable"))
    }

    fn memory_info(&self, ordinal: u32) -> Result<DeviceMemory, ComputeError> {
        self.gpu(ordinal)?
            .memory
            .ok_or_else(|| query_error(ordinal, "memory info unavailable"))
    }

    fn compute_capability(&self, ordinal: u32) -> Result<ComputeCapability, ComputeError> {
        Ok(self.gpu(ordinal)?.capability)
    }

    fn multiprocessor_count(&self, ordinal: u32) -> Result<u32, ComputeError> {
        self.gpu(ordinal)?
            .multiprocessors
            .ok_or_else(|| query_error(ordinal, "attribute unavailable"))
    }

    fn primary_device(&self) -> &Device {
        &self.device
    }

    fn elementwise_smoke(&self, size: usize) -> Result<f32, ComputeError> {
        if self.fail_elementwise {
            return Err(ComputeError::Operation {
                op: "element-wise add",
                message: "mock failure".to_string(),
            });
        }
        kernels::elementwise_smoke(&self.device, size)
    }

    fn matmul_benchmark(
        &self,
        size: usize,
        warmup: u32,
        iterations: u32,
    ) -> Result<BenchmarkResult, ComputeError> {
        if self.fail_matmul {
            return Err(ComputeError::Operation {
                op: "matmul",
                message: "mock kernel compilation failure".to_string(),
            });
        }
        kernels::matmul_benchmark(&self.device, size, warmup, iterations)
    }

    fn cpu_baseline(&self, size: usize, iterations: u32) -> Result<BenchmarkResult, ComputeError> {
        if self.fail_cpu_baseline {
            return Err(ComputeError::Operation {
                op: "matmul",
                message: "mock CPU failure".to_string(),
            });
        }
        kernels::matmul_benchmark(&Device::Cpu, size, 0, iterations)
    }

    fn probe_allocation(&self, bytes: u64) -> Result<AllocationProbe, ComputeError> {
        if self.fail_allocation {
            return Err(ComputeError::Operation {
                op: "allocation",
                message: "CUDA_ERROR_INVALID_CONTEXT".to_string(),
            });
        }
        if self.out_of_memory {
            return Err(ComputeError::OutOfMemory {
                op: "allocation",
                message: "CUDA_ERROR_OUT_OF_MEMORY".to_string(),
            });
        }
        Ok(AllocationProbe {
            bytes,
            memory_while_held: self.memory_info(0).ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_query_sequence_repeats_last() {
        let query = MockQuery::sequence(vec![
            MockQuery::output("first"),
            MockResponse::Failed("boom".to_string()),
        ]);
        assert_eq!(query.query(&["a"]).unwrap(), "first");
        assert!(query.query(&["a"]).is_err());
        assert!(query.query(&["a"]).is_err());
        assert_eq!(query.calls(), 3);
    }

    #[test]
    fn test_mock_query_stop_after() {
        let flag = Arc::new(AtomicBool::new(false));
        let query = MockQuery::with_output("x").stop_after(2, flag.clone());
        query.query(&["a"]).unwrap();
        assert!(!flag.load(Ordering::SeqCst));
        query.query(&["a"]).unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_mock_runtime_devices() {
        let runtime = MockRuntime::new(2);
        assert_eq!(runtime.device_count().unwrap(), 2);
        assert_eq!(runtime.device_name(1).unwrap(), "Mock GPU 1");
        assert!(runtime.device_name(5).is_err());
    }

    #[test]
    fn test_mock_runtime_default_allocation_probe() {
        // The trait's default probe actually allocates on the CPU device
        struct Plain(MockRuntime);

        impl ComputeRuntime for Plain {
            fn backend_name(&self) -> String {
                self.0.backend_name()
            }
            fn runtime_version(&self) -> Option<CudaVersion> {
                None
            }
            fn device_count(&self) -> Result<u32, ComputeError> {
                self.0.device_count()
            }
            fn device_name(&self, ordinal: u32) -> Result<String, ComputeError> {
                self.0.device_name(ordinal)
            }
            fn memory_info(&self, ordinal: u32) -> Result<DeviceMemory, ComputeError> {
                self.0.memory_info(ordinal)
            }
            fn compute_capability(&self, ordinal: u32) -> Result<ComputeCapability, ComputeError> {
                self.0.compute_capability(ordinal)
            }
            fn multiprocessor_count(&self, ordinal: u32) -> Result<u32, ComputeError> {
                self.0.multiprocessor_count(ordinal)
            }
            fn primary_device(&self) -> &Device {
                self.0.primary_device()
            }
        }

        let probe = Plain(MockRuntime::new(1)).probe_allocation(1 << 20).unwrap();
        assert_eq!(probe.bytes, 1 << 20);
        assert_eq!(probe.memory_while_held.unwrap().total, 8 << 30);
    }
}
