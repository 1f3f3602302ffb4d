//! CUDA runtime implementation
//!
//! Device properties come from the CUDA driver API (through candle's cudarc
//! re-export); workloads run on a candle CUDA device.

use candle_core::cuda_backend::cudarc::driver::{result, sys::CUdevice_attribute, CudaDevice};
use candle_core::Device;
use std::sync::Arc;

use crate::compute::traits::ComputeRuntime;
use crate::domain::{ComputeCapability, CudaVersion, DeviceMemory};
use crate::error::ComputeError;
use crate::nvml::NvmlManager;

/// CUDA devices plus a candle device bound to ordinal 0
pub struct CudaRuntime {
    devices: Vec<Arc<CudaDevice>>,
    primary: Device,
    version: Option<CudaVersion>,
}

impl CudaRuntime {
    /// Initialize the driver and open every visible device
    pub fn load() -> Result<Self, ComputeError> {
        result::init().map_err(|e| ComputeError::Unavailable(e.to_string()))?;
        let count =
            result::device::get_count().map_err(|e| ComputeError::Unavailable(e.to_string()))?;
        if count <= 0 {
            return Err(ComputeError::Unavailable(
                "no CUDA devices visible".to_string(),
            ));
        }

        let devices = (0..count as usize)
            .map(|ordinal| {
                CudaDevice::new(ordinal).map_err(|e| ComputeError::DeviceQuery {
                    ordinal: ordinal as u32,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let primary = Device::new_cuda(0).map_err(|e| ComputeError::Unavailable(e.to_string()))?;

        let version = match NvmlManager::new().and_then(|m| m.cuda_driver_version()) {
            Ok(version) => Some(version),
            Err(e) => {
                log::debug!("CUDA version unavailable: {}", e);
                None
            }
        };

        log::debug!("Opened {} CUDA device(s)", devices.len());

        Ok(Self {
            devices,
            primary,
            version,
        })
    }

    fn device(&self, ordinal: u32) -> Result<&Arc<CudaDevice>, ComputeError> {
        self.devices
            .get(ordinal as usize)
            .ok_or_else(|| ComputeError::DeviceQuery {
                ordinal,
                message: "no such device".to_string(),
            })
    }

    fn attribute(&self, ordinal: u32, attrib: CUdevice_attribute) -> Result<u32, ComputeError> {
        let value = self
            .device(ordinal)?
            .attribute(attrib)
            .map_err(|e| ComputeError::DeviceQuery {
                ordinal,
                message: e.to_string(),
            })?;
        Ok(value.max(0) as u32)
    }
}

impl ComputeRuntime for CudaRuntime {
    fn backend_name(&self) -> String {
        "candle (CUDA backend)".to_string()
    }

    fn runtime_version(&self) -> Option<CudaVersion> {
        self.version
    }

    fn device_count(&self) -> Result<u32, ComputeError> {
        Ok(self.devices.len() as u32)
    }

    fn device_name(&self, ordinal: u32) -> Result<String, ComputeError> {
        self.device(ordinal)?
            .name()
            .map_err(|e| ComputeError::DeviceQuery {
                ordinal,
                message: e.to_string(),
            })
    }

    fn memory_info(&self, ordinal: u32) -> Result<DeviceMemory, ComputeError> {
        let device = self.device(ordinal)?;
        let query_err = |e: result::DriverError| ComputeError::DeviceQuery {
            ordinal,
            message: e.to_string(),
        };

        // mem_get_info reports on the context current to this thread
        device.bind_to_thread().map_err(query_err)?;
        let (free, total) = result::mem_get_info().map_err(query_err)?;
        Ok(DeviceMemory::new(free as u64, total as u64))
    }

    fn compute_capability(&self, ordinal: u32) -> Result<ComputeCapability, ComputeError> {
        let major = self.attribute(
            ordinal,
            CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR,
        )?;
        let minor = self.attribute(
            ordinal,
            CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR,
        )?;
        Ok(ComputeCapability::new(major, minor))
    }

    fn multiprocessor_count(&self, ordinal: u32) -> Result<u32, ComputeError> {
        self.attribute(
            ordinal,
            CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MULTIPROCESSOR_COUNT,
        )
    }

    fn primary_device(&self) -> &Device {
        &self.primary
    }
}
