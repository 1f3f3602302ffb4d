//! Environment report domain type
//!
//! Snapshot of the process and host the diagnostics run in.

use chrono::{DateTime, Local};
use std::path::PathBuf;

use super::memory::bytes_to_gib;
use super::version::CudaVersion;

/// Host and process environment
#[derive(Debug, Clone)]
pub struct EnvironmentReport {
    /// Name and version of this tool
    pub tool: String,
    /// Path of the running executable
    pub executable: Option<PathBuf>,
    /// Current working directory
    pub working_dir: Option<PathBuf>,
    /// Time the report was taken
    pub timestamp: DateTime<Local>,
    /// Target triple components (os, arch)
    pub platform: (String, String),
    /// Isolated runtime environment marker, if set (variable name, value)
    pub isolated_env: Option<(String, String)>,
    /// Host resources
    pub resources: SystemResources,
    /// Driver-level information from NVML, when available
    pub driver: Option<DriverSummary>,
}

/// Host CPU and memory totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemResources {
    pub cpu_count: usize,
    /// Total RAM in bytes
    pub total_memory: u64,
    /// Available RAM in bytes
    pub available_memory: u64,
}

impl SystemResources {
    pub fn total_gib(&self) -> f64 {
        bytes_to_gib(self.total_memory)
    }

    pub fn available_gib(&self) -> f64 {
        bytes_to_gib(self.available_memory)
    }
}

/// Driver details reported by NVML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSummary {
    pub driver_version: String,
    pub nvml_version: Option<String>,
    pub cuda_version: Option<CudaVersion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_gib() {
        let res = SystemResources {
            cpu_count: 8,
            total_memory: 16 << 30,
            available_memory: 12 << 30,
        };
        assert!((res.total_gib() - 16.0).abs() < f64::EPSILON);
        assert!((res.available_gib() - 12.0).abs() < f64::EPSILON);
    }
}
