//! Configuration system
//!
//! Handles TOML config file parsing and CLI argument merging. Every timeout,
//! size and interval the checks use comes from here.

pub mod builder;
pub mod file;

pub use builder::ConfigBuilder;
pub use file::ConfigFile;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest accepted matrix dimension (256 MiB per f32 matrix)
pub const MAX_MATRIX_SIZE: usize = 8192;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Driver query settings
    pub driver: DriverConfig,
    /// Compute verification settings
    pub compute: ComputeConfig,
    /// Monitor loop settings
    pub monitor: MonitorConfig,
    /// Environment report settings
    pub environment: EnvironmentConfig,
}

impl Config {
    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero("driver.timeout_secs", self.driver.timeout_secs)?;
        require_nonzero("compute.matrix_size", self.compute.matrix_size as u64)?;
        if self.compute.matrix_size > MAX_MATRIX_SIZE {
            return Err(ConfigError::InvalidValue {
                key: "compute.matrix_size".to_string(),
                message: format!("must not exceed {}", MAX_MATRIX_SIZE),
            });
        }
        require_nonzero(
            "compute.benchmark_iterations",
            self.compute.benchmark_iterations as u64,
        )?;
        require_nonzero("compute.cpu_iterations", self.compute.cpu_iterations as u64)?;
        require_nonzero("compute.allocation_mib", self.compute.allocation_mib)?;
        require_nonzero("monitor.interval_secs", self.monitor.interval_secs)?;
        require_nonzero("monitor.timeout_secs", self.monitor.timeout_secs)?;

        if self.driver.command.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "driver.command".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn require_nonzero(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Driver query configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Query program
    pub command: String,
    /// Timeout per invocation in seconds
    pub timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            command: crate::smi::command::DEFAULT_PROGRAM.to_string(),
            timeout_secs: 5,
        }
    }
}

impl DriverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Compute verification configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Square matrix dimension for the smoke test and benchmark
    pub matrix_size: usize,
    /// Timed benchmark iterations
    pub benchmark_iterations: u32,
    /// Untimed warmup multiplications before the benchmark
    pub warmup_iterations: u32,
    /// Iterations for the CPU baseline (at half the matrix size)
    pub cpu_iterations: u32,
    /// Size of the large-allocation probe in MiB
    pub allocation_mib: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            matrix_size: 1000,
            benchmark_iterations: 5,
            warmup_iterations: 1,
            cpu_iterations: 5,
            allocation_mib: 1024,
        }
    }
}

impl ComputeConfig {
    /// Matrix dimension used by the CPU baseline
    pub fn cpu_matrix_size(&self) -> usize {
        (self.matrix_size / 2).max(1)
    }

    /// Allocation probe size in bytes
    pub fn allocation_bytes(&self) -> u64 {
        self.allocation_mib.saturating_mul(1024 * 1024)
    }
}

/// Monitor loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Enter the monitor loop after a successful run
    pub enabled: bool,
    /// Seconds between samples
    pub interval_secs: u64,
    /// Timeout per query in seconds
    pub timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            timeout_secs: 5,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Environment report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Variable marking an active isolated runtime environment
    pub marker_var: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            marker_var: "VIRTUAL_ENV".to_string(),
        }
    }
}
