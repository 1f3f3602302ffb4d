//! Unified error types for gpucheck
//!
//! This module defines all error types used throughout the application.
//! Uses thiserror for ergonomic error definitions.

use std::time::Duration;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from the GPU numeric library
    #[error("Compute error: {0}")]
    Compute(#[from] ComputeError),

    /// Error from configuration parsing/validation
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Interrupt handler could not be installed
    #[error("Failed to install signal handler: {0}")]
    Signal(String),

    /// IO error (output, file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from invoking the driver query tool
#[derive(Error, Debug)]
pub enum SmiError {
    /// The query program is not installed or not on PATH
    #[error("'{0}' not found. Is the NVIDIA driver installed?")]
    NotFound(String),

    /// The query program could not be started
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The query program did not finish in time
    #[error("'{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    /// The query program exited unsuccessfully
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Errors from the GPU numeric library
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    /// The library (or its CUDA backend) cannot be loaded
    #[error("GPU compute library unavailable: {0}")]
    Unavailable(String),

    /// A device property query failed
    #[error("Device {ordinal} query failed: {message}")]
    DeviceQuery { ordinal: u32, message: String },

    /// A tensor operation failed
    #[error("{op} failed: {message}")]
    Operation { op: &'static str, message: String },

    /// Device memory exhausted
    #[error("Out of memory during {op}: {message}")]
    OutOfMemory { op: &'static str, message: String },
}

impl ComputeError {
    /// Build a mapper that tags a candle error with the failing operation
    ///
    /// Allocation failures reported by the CUDA driver are classified as
    /// [`ComputeError::OutOfMemory`].
    pub fn op(op: &'static str) -> impl FnOnce(candle_core::Error) -> ComputeError {
        move |err| {
            let message = err.to_string();
            if is_out_of_memory(&message) {
                ComputeError::OutOfMemory { op, message }
            } else {
                ComputeError::Operation { op, message }
            }
        }
    }

    /// Check if this error is an out-of-memory condition
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, ComputeError::OutOfMemory { .. })
    }
}

fn is_out_of_memory(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("out_of_memory") || lower.contains("out of memory")
}

/// Errors from NVML wrapper operations
#[derive(Error, Debug)]
pub enum NvmlError {
    /// Failed to initialize NVML library
    #[error("Failed to initialize NVML: {0}")]
    InitializationFailed(String),

    /// NVML library not found
    #[error("NVML library not found. Is the NVIDIA driver installed?")]
    LibraryNotFound,

    /// Unknown NVML error
    #[error("NVML error: {0}")]
    Unknown(String),
}

/// Errors from configuration parsing and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Invalid config value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smi_not_found_display() {
        let err = SmiError::NotFound("nvidia-smi".to_string());
        assert!(err.to_string().contains("NVIDIA driver"));
    }

    #[test]
    fn test_smi_timeout_display() {
        let err = SmiError::Timeout {
            program: "nvidia-smi".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(err.to_string(), "'nvidia-smi' timed out after 5s");
    }

    #[test]
    fn test_compute_error_classifies_oom() {
        let err = ComputeError::op("allocation")(candle_core::Error::Msg(
            "DriverError(CUDA_ERROR_OUT_OF_MEMORY, \"out of memory\")".to_string(),
        ));
        assert!(err.is_out_of_memory());

        let err = ComputeError::op("matmul")(candle_core::Error::Msg("shape mismatch".into()));
        assert!(!err.is_out_of_memory());
        assert_eq!(err.to_string(), "matmul failed: shape mismatch");
    }

    #[test]
    fn test_error_conversion() {
        let compute_err = ComputeError::Unavailable("no cuda".to_string());
        let app_err: AppError = compute_err.into();
        assert!(matches!(app_err, AppError::Compute(_)));
    }
}
