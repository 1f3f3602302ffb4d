//! Device memory domain type

use std::fmt;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Convert a byte count to GiB
pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Free/total memory of a single device, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceMemory {
    pub free: u64,
    pub total: u64,
}

impl DeviceMemory {
    /// Create a new memory reading
    pub fn new(free: u64, total: u64) -> Self {
        Self { free, total }
    }

    /// Bytes currently in use
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }

    pub fn free_gib(&self) -> f64 {
        bytes_to_gib(self.free)
    }

    pub fn total_gib(&self) -> f64 {
        bytes_to_gib(self.total)
    }

    pub fn used_gib(&self) -> f64 {
        bytes_to_gib(self.used())
    }
}

impl fmt::Display for DeviceMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} / {:.2} GB free", self.free_gib(), self.total_gib())
    }
}
