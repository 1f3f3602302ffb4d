//! Driver query layer
//!
//! Trait-based abstraction over the external driver query tool
//! (`nvidia-smi`) so the checks can be exercised with scripted output.

pub mod command;
pub mod traits;

pub use command::NvidiaSmi;
pub use traits::DriverQuery;
