//! Service layer for the diagnostic checks
//!
//! Each service is a self-contained sequential procedure that writes its
//! report to the given output.

pub mod compute_check;
pub mod driver_check;
pub mod environment;
pub mod monitor;
pub mod orchestrator;

pub use compute_check::ComputeVerifier;
pub use driver_check::DriverChecker;
pub use environment::EnvironmentReporter;
pub use monitor::Monitor;
pub use orchestrator::{ExitStatus, Orchestrator};
