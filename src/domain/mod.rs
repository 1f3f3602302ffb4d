//! Domain models for gpucheck
//!
//! Transient value types produced by the checks. All of them are parsed or
//! queried once, printed, and discarded.

pub mod benchmark;
pub mod capability;
pub mod device;
pub mod environment;
pub mod memory;
pub mod sample;
pub mod version;

pub use benchmark::BenchmarkResult;
pub use capability::ComputeCapability;
pub use device::{DeviceRecord, DEVICE_QUERY_FIELDS};
pub use environment::{DriverSummary, EnvironmentReport, SystemResources};
pub use memory::{bytes_to_gib, DeviceMemory};
pub use sample::{MonitorSample, MONITOR_QUERY_FIELDS};
pub use version::CudaVersion;
