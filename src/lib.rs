//! gpucheck - GPU availability and CUDA compute verification library
//!
//! This library provides the checks behind the `gpucheck` tool: an
//! environment report, an NVIDIA driver check, a CUDA compute verification
//! and a telemetry monitor loop.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions and output helpers
//! - [`commands`]: Command handlers
//! - [`compute`]: GPU numeric library abstraction
//! - [`config`]: Configuration system
//! - [`domain`]: Transient value types
//! - [`error`]: Error types
//! - [`nvml`]: Supplementary NVML queries
//! - [`services`]: The diagnostic checks
//! - [`smi`]: Driver query tool abstraction

pub mod cli;
pub mod commands;
pub mod compute;
pub mod config;
pub mod domain;
pub mod error;
pub mod nvml;
pub mod services;
pub mod smi;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
