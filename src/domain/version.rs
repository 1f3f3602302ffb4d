//! CUDA version domain type

use std::fmt;

/// CUDA version decoded from the driver's integer form (`1000 * major + 10 * minor`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CudaVersion {
    pub major: u32,
    pub minor: u32,
}

impl CudaVersion {
    /// Decode e.g. `12020` into 12.2
    pub fn from_packed(value: i32) -> Self {
        let value = value.max(0) as u32;
        Self {
            major: value / 1000,
            minor: (value % 1000) / 10,
        }
    }
}

impl fmt::Display for CudaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
