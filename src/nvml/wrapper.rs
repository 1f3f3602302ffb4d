//! NVML manager implementation
//!
//! Loads NVML at runtime and exposes the system-level queries used in the
//! environment report and compute section.

use crate::domain::{CudaVersion, DriverSummary};
use crate::error::NvmlError;

use nvml_wrapper::Nvml;

/// NVML handle for system-level driver queries
pub struct NvmlManager {
    nvml: Nvml,
}

impl NvmlManager {
    /// Initialize NVML
    pub fn new() -> Result<Self, NvmlError> {
        let nvml = Nvml::init().map_err(|e| match e {
            nvml_wrapper::error::NvmlError::LibloadingError(_) => NvmlError::LibraryNotFound,
            nvml_wrapper::error::NvmlError::DriverNotLoaded => {
                NvmlError::InitializationFailed("NVIDIA driver not loaded".to_string())
            }
            other => NvmlError::InitializationFailed(other.to_string()),
        })?;

        Ok(Self { nvml })
    }

    /// Get driver version
    pub fn driver_version(&self) -> Result<String, NvmlError> {
        self.nvml
            .sys_driver_version()
            .map_err(|e| NvmlError::Unknown(e.to_string()))
    }

    /// Get NVML version
    pub fn nvml_version(&self) -> Result<String, NvmlError> {
        self.nvml
            .sys_nvml_version()
            .map_err(|e| NvmlError::Unknown(e.to_string()))
    }

    /// Get the highest CUDA version the installed driver supports
    pub fn cuda_driver_version(&self) -> Result<CudaVersion, NvmlError> {
        self.nvml
            .sys_cuda_driver_version()
            .map(CudaVersion::from_packed)
            .map_err(|e| NvmlError::Unknown(e.to_string()))
    }

    /// Collect a driver summary
    ///
    /// Only the driver version is required; the other fields are left empty
    /// when their query fails.
    pub fn summary(&self) -> Result<DriverSummary, NvmlError> {
        Ok(DriverSummary {
            driver_version: self.driver_version()?,
            nvml_version: self.nvml_version().ok(),
            cuda_version: self.cuda_driver_version().ok(),
        })
    }
}

/// Try to read a driver summary, logging why it is unavailable
pub fn try_driver_summary() -> Option<DriverSummary> {
    match NvmlManager::new().and_then(|m| m.summary()) {
        Ok(summary) => Some(summary),
        Err(e) => {
            log::debug!("NVML unavailable: {}", e);
            None
        }
    }
}
