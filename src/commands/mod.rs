//! Command handlers
//!
//! Each command handler wires the real driver query and compute runtime to
//! stdout and returns the process exit code.

pub mod check;
pub mod monitor;
pub mod print_config;
pub mod run;

pub use check::{run_compute, run_driver, run_env};
pub use monitor::run_monitor;
pub use print_config::run_print_config;
pub use run::run_all;

use crate::error::{AppError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Install a Ctrl+C handler that raises the returned flag
///
/// May only be called once per process.
pub fn interrupt_flag() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    ctrlc::set_handler(move || {
        log::info!("Received interrupt");
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| AppError::Signal(e.to_string()))?;

    Ok(stop)
}
