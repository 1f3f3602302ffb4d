//! NVML access
//!
//! Supplementary driver information read directly through NVML. Every
//! caller treats a failure here as "information not available".

pub mod wrapper;

pub use wrapper::{try_driver_summary, NvmlManager};
