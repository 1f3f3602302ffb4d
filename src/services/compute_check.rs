//! Compute verifier
//!
//! Loads the GPU numeric library, reports device properties and runs the
//! workload tests. Only a library load failure, a device query failure or a
//! failed element-wise smoke test fail the check; the benchmark, CPU
//! baseline and allocation probe only ever produce warnings.

use crate::cli::output::{print_section, Mark};
use crate::compute::ComputeRuntime;
use crate::config::ComputeConfig;
use crate::domain::bytes_to_gib;
use crate::error::{AppError, ComputeError, Result};

use std::io::Write;

/// Verifies CUDA compute through the GPU numeric library
pub struct ComputeVerifier {
    config: ComputeConfig,
}

impl ComputeVerifier {
    /// Create a verifier with the given workload sizes
    pub fn new(config: ComputeConfig) -> Self {
        Self { config }
    }

    /// Run the check
    ///
    /// `load` attempts to load the library; its failure is reported and
    /// yields `Ok(false)` without touching any device.
    pub fn run<F>(&self, load: F, out: &mut dyn Write) -> Result<bool>
    where
        F: FnOnce() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError>,
    {
        print_section(out, "CUDA Compute Test")?;

        let runtime = match load() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Compute library load failed: {}", e);
                writeln!(out, "{} {}", Mark::Fail, e)?;
                return Ok(false);
            }
        };

        writeln!(out, "{} Compute library: {}", Mark::Pass, runtime.backend_name())?;

        match self.verify(runtime.as_ref(), out) {
            Ok(passed) => Ok(passed),
            Err(AppError::Compute(e)) => {
                writeln!(out, "{} CUDA test failed: {}", Mark::Fail, e)?;
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }

    fn verify(&self, runtime: &dyn ComputeRuntime, out: &mut dyn Write) -> Result<bool> {
        writeln!(out, "\nCUDA Information:")?;
        match runtime.runtime_version() {
            Some(version) => writeln!(out, "  CUDA Version: {}", version)?,
            None => writeln!(out, "  CUDA Version: unknown")?,
        }

        let count = runtime.device_count()?;
        writeln!(out, "  Device Count: {}", count)?;

        for ordinal in 0..count {
            self.report_device(runtime, ordinal, out)?;
        }

        print_section(out, "GPU Performance Test")?;
        let size = self.config.matrix_size;

        writeln!(out, "Testing basic GPU operations on {}x{} matrices...", size, size)?;
        match runtime.elementwise_smoke(size) {
            Ok(sum) => writeln!(out, "  {} Basic operations successful (sum: {:.2})", Mark::Pass, sum)?,
            Err(e) => {
                writeln!(out, "  {} Basic operations failed: {}", Mark::Fail, e)?;
                return Ok(false);
            }
        }

        self.run_benchmark(runtime, out)?;
        self.run_cpu_baseline(runtime, out)?;
        self.run_memory_probe(runtime, out)?;

        Ok(true)
    }

    fn report_device(
        &self,
        runtime: &dyn ComputeRuntime,
        ordinal: u32,
        out: &mut dyn Write,
    ) -> Result<()> {
        let name = runtime.device_name(ordinal).unwrap_or_else(|e| {
            log::debug!("Device {} name query failed: {}", ordinal, e);
            format!("GPU {}", ordinal)
        });
        let memory = runtime.memory_info(ordinal)?;
        let capability = runtime.compute_capability(ordinal)?;

        writeln!(out, "\nGPU {}: {}", ordinal, name)?;
        writeln!(out, "  Compute Capability: {}", capability)?;
        writeln!(out, "  Total Memory: {:.2} GB", memory.total_gib())?;
        writeln!(out, "  Free Memory: {:.2} GB", memory.free_gib())?;

        match runtime.multiprocessor_count(ordinal) {
            Ok(sm_count) => {
                writeln!(out, "  Multiprocessors: {}", sm_count)?;
                writeln!(
                    out,
                    "  CUDA Cores: ~{} (CC {}, estimated)",
                    capability.estimated_cuda_cores(sm_count),
                    capability
                )?;
            }
            Err(e) => writeln!(out, "  Could not get detailed properties: {}", e)?,
        }

        Ok(())
    }

    fn run_benchmark(&self, runtime: &dyn ComputeRuntime, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "  Testing matrix multiplication...")?;

        match runtime.matmul_benchmark(
            self.config.matrix_size,
            self.config.warmup_iterations,
            self.config.benchmark_iterations,
        ) {
            Ok(result) => {
                writeln!(out, "  {} Matrix multiplication successful", Mark::Pass)?;
                writeln!(
                    out,
                    "  GPU Time ({} iterations): {:.3} seconds",
                    result.iterations,
                    result.seconds()
                )?;
                if let Some(throughput) = result.throughput() {
                    writeln!(out, "  GPU Throughput: {:.2} ops/sec", throughput)?;
                }
            }
            Err(e) => {
                log::warn!("Matrix multiplication benchmark failed: {}", e);
                writeln!(out, "  {} Matrix multiplication failed: {}", Mark::Warn, e)?;
                writeln!(out, "  Basic GPU operations still work.")?;
            }
        }

        Ok(())
    }

    fn run_cpu_baseline(&self, runtime: &dyn ComputeRuntime, out: &mut dyn Write) -> Result<()> {
        let size = self.config.cpu_matrix_size();
        let iterations = self.config.cpu_iterations;
        writeln!(
            out,
            "\n  Testing {}x{} matrix multiplication on CPU for comparison...",
            size, size
        )?;

        match runtime.cpu_baseline(size, iterations) {
            Ok(result) => writeln!(
                out,
                "  CPU Time ({} iterations, {}x{}): {:.3} seconds",
                result.iterations,
                size,
                size,
                result.seconds()
            )?,
            Err(e) => {
                log::debug!("CPU baseline failed: {}", e);
                writeln!(out, "  CPU comparison skipped")?;
            }
        }

        Ok(())
    }

    fn run_memory_probe(&self, runtime: &dyn ComputeRuntime, out: &mut dyn Write) -> Result<()> {
        print_section(out, "GPU Memory Test")?;

        let bytes = self.config.allocation_bytes();
        let label = format!("{:.2} GB", bytes_to_gib(bytes));
        writeln!(out, "Allocating {} on GPU...", label)?;

        match runtime.probe_allocation(bytes) {
            Ok(probe) => {
                writeln!(out, "  {} Successfully allocated {} on GPU", Mark::Pass, label)?;
                if let Some(memory) = probe.memory_while_held {
                    writeln!(out, "  Memory used: {:.2} GB", memory.used_gib())?;
                }
            }
            Err(e) if e.is_out_of_memory() => {
                log::warn!("Allocation probe ran out of memory: {}", e);
                writeln!(out, "  {} Could not allocate {}: {}", Mark::Warn, label, e)?;
            }
            Err(e) => {
                log::warn!("Allocation probe failed: {}", e);
                writeln!(out, "  {} Memory test failed: {}", Mark::Warn, e)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockGpu, MockRuntime};

    fn small_config() -> ComputeConfig {
        ComputeConfig {
            matrix_size: 16,
            benchmark_iterations: 2,
            warmup_iterations: 1,
            cpu_iterations: 2,
            allocation_mib: 1,
        }
    }

    fn run_with(runtime: MockRuntime) -> (bool, String) {
        let mut buf = Vec::new();
        let ok = ComputeVerifier::new(small_config())
            .run(|| Ok(Box::new(runtime) as Box<dyn ComputeRuntime>), &mut buf)
            .unwrap();
        (ok, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_library_unavailable() {
        let mut buf = Vec::new();
        let ok = ComputeVerifier::new(small_config())
            .run(
                || Err(ComputeError::Unavailable("ImportError".to_string())),
                &mut buf,
            )
            .unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(!ok);
        assert!(text.contains("GPU compute library unavailable: ImportError"));
        assert!(!text.contains("Device Count"));
        assert!(!text.contains("GPU 0:"));
    }

    #[test]
    fn test_all_passing() {
        let (ok, text) = run_with(MockRuntime::new(1));
        assert!(ok);
        assert!(text.contains("Device Count: 1"));
        assert!(text.contains("GPU 0: Mock GPU 0"));
        assert!(text.contains("Compute Capability: 8.6"));
        assert!(text.contains("Multiprocessors: 28"));
        assert!(text.contains("CUDA Cores: ~3584 (CC 8.6, estimated)"));
        assert!(text.contains("Basic operations successful"));
        assert!(text.contains("Matrix multiplication successful"));
        assert!(text.contains("CPU Time (2 iterations, 8x8)"));
        assert!(text.contains("Successfully allocated"));
    }

    #[test]
    fn test_matmul_failure_still_passes() {
        let (ok, text) = run_with(MockRuntime::new(1).with_failing_matmul());
        assert!(ok);
        assert!(text.contains("Matrix multiplication failed"));
        assert!(text.contains("CPU Time"));
    }

    #[test]
    fn test_smoke_failure_fails_early() {
        let (ok, text) = run_with(MockRuntime::new(1).with_failing_elementwise());
        assert!(!ok);
        assert!(text.contains("Basic operations failed"));
        assert!(!text.contains("Testing matrix multiplication"));
        assert!(!text.contains("GPU Memory Test"));
    }

    #[test]
    fn test_out_of_memory_is_warning() {
        let (ok, text) = run_with(MockRuntime::new(1).with_out_of_memory());
        assert!(ok);
        assert!(text.contains("Could not allocate"));
    }

    #[test]
    fn test_name_fallback() {
        let gpu = MockGpu::default().without_name();
        let (ok, text) = run_with(MockRuntime::with_devices(vec![gpu]));
        assert!(ok);
        assert!(text.contains("GPU 0: GPU 0"));
    }

    #[test]
    fn test_missing_detailed_properties() {
        let gpu = MockGpu::default().without_multiprocessor_count();
        let (ok, text) = run_with(MockRuntime::with_devices(vec![gpu]));
        assert!(ok);
        assert!(text.contains("Could not get detailed properties"));
        assert!(!text.contains("CUDA Cores"));
    }

    #[test]
    fn test_memory_query_failure_fails_check() {
        let gpu = MockGpu::default().without_memory_info();
        let (ok, text) = run_with(MockRuntime::with_devices(vec![gpu]));
        assert!(!ok);
        assert!(text.contains("CUDA test failed"));
    }

    #[test]
    fn test_cpu_baseline_failure_is_skipped() {
        let (ok, text) = run_with(MockRuntime::new(1).with_failing_cpu_baseline());
        assert!(ok);
        assert!(text.contains("CPU comparison skipped"));
        assert!(!text.contains("CPU Time"));
        assert!(text.contains("Successfully allocated"));
    }

    #[test]
    fn test_allocation_error_is_warning() {
        let (ok, text) = run_with(MockRuntime::new(1).with_failing_allocation());
        assert!(ok);
        assert!(text.contains("Memory test failed"));
        assert!(!text.contains("Could not allocate"));
        assert!(!text.contains("Successfully allocated"));
    }
}
