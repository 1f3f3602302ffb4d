//! GPU numeric library layer
//!
//! Wraps candle behind the [`ComputeRuntime`] trait. The CUDA runtime is only
//! compiled with the `cuda` feature; without it the library is reported as
//! unavailable, which the compute check treats as a recoverable failure.

pub mod cpu;
#[cfg(feature = "cuda")]
pub mod cuda;
pub mod kernels;
pub mod traits;

#[cfg(feature = "cuda")]
pub use cuda::CudaRuntime;
pub use traits::{AllocationProbe, ComputeRuntime};

use crate::error::ComputeError;

/// Load the GPU numeric library
#[cfg(feature = "cuda")]
pub fn load_runtime() -> Result<Box<dyn ComputeRuntime>, ComputeError> {
    Ok(Box::new(CudaRuntime::load()?))
}

/// Load the GPU numeric library
#[cfg(not(feature = "cuda"))]
pub fn load_runtime() -> Result<Box<dyn ComputeRuntime>, ComputeError> {
    Err(ComputeError::Unavailable(
        "built without CUDA support (rebuild with --features cuda)".to_string(),
    ))
}
