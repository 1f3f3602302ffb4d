//! Run command implementation
//!
//! Full diagnostic: every check, the summary, then monitoring.

use crate::commands::interrupt_flag;
use crate::compute::load_runtime;
use crate::config::Config;
use crate::error::Result;
use crate::services::Orchestrator;
use crate::smi::NvidiaSmi;

/// Execute the full diagnostic run
pub fn run_all(config: &Config) -> Result<i32> {
    let driver = NvidiaSmi::new(&config.driver.command, config.driver.timeout());
    let monitor = NvidiaSmi::new(&config.driver.command, config.monitor.timeout());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    // Ctrl+C keeps its default behavior until the monitor loop starts
    let status =
        Orchestrator::new(config, driver, monitor).run(load_runtime, interrupt_flag, &mut out)?;
    Ok(status.code())
}
