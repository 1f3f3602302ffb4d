//! Compute capability domain type
//!
//! Includes the cores-per-multiprocessor lookup used to estimate CUDA core
//! counts.

use std::fmt;

/// Vendor-defined architecture version of a GPU (e.g. 8.6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputeCapability {
    pub major: u32,
    pub minor: u32,
}

impl ComputeCapability {
    /// Create a new compute capability
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Approximate CUDA cores per streaming multiprocessor
    ///
    /// This is a coarse lookup, not an authoritative hardware table:
    ///
    /// | capability | cores/SM |
    /// |------------|----------|
    /// | >= 8.0     | 128      |
    /// | >= 7.5     | 64       |
    /// | >= 6.0     | 128      |
    /// | older      | 128      |
    ///
    /// Several architectures deviate from it (6.0 and 8.0 parts have 64
    /// cores per SM), so the result must only be presented as an estimate.
    pub fn approx_cores_per_multiprocessor(&self) -> u32 {
        match (self.major, self.minor) {
            (8.., _) => 128,
            (7, 5..) => 64,
            (6..=7, _) => 128,
            _ => 128,
        }
    }

    /// Estimated total CUDA cores for a device with `multiprocessors` SMs
    pub fn estimated_cuda_cores(&self, multiprocessors: u32) -> u32 {
        multiprocessors.saturating_mul(self.approx_cores_per_multiprocessor())
    }
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(ComputeCapability::new(7, 5) > ComputeCapability::new(7, 0));
        assert!(ComputeCapability::new(8, 0) > ComputeCapability::new(7, 5));
    }

    #[test]
    fn test_cores_per_multiprocessor() {
        assert_eq!(ComputeCapability::new(9, 0).approx_cores_per_multiprocessor(), 128);
        assert_eq!(ComputeCapability::new(8, 6).approx_cores_per_multiprocessor(), 128);
        assert_eq!(ComputeCapability::new(7, 5).approx_cores_per_multiprocessor(), 64);
        assert_eq!(ComputeCapability::new(7, 0).approx_cores_per_multiprocessor(), 128);
        assert_eq!(ComputeCapability::new(6, 1).approx_cores_per_multiprocessor(), 128);
        assert_eq!(ComputeCapability::new(5, 2).approx_cores_per_multiprocessor(), 128);
    }

    #[test]
    fn test_estimated_cores() {
        // GTX 1060: 10 SMs at CC 6.1
        assert_eq!(ComputeCapability::new(6, 1).estimated_cuda_cores(10), 1280);
        // RTX 2080: 46 SMs at CC 7.5
        assert_eq!(ComputeCapability::new(7, 5).estimated_cuda_cores(46), 2944);
    }

    #[test]
    fn test_display() {
        assert_eq!(ComputeCapability::new(8, 9).to_string(), "8.9");
    }
}
