//! Monitor command implementation
//!
//! Runs the monitor loop directly, without the preceding checks.

use crate::commands::interrupt_flag;
use crate::config::Config;
use crate::error::Result;
use crate::services::Monitor;
use crate::smi::NvidiaSmi;

/// Execute the monitor command
pub fn run_monitor(config: &Config) -> Result<i32> {
    let query = NvidiaSmi::new(&config.driver.command, config.monitor.timeout());
    let stop = interrupt_flag()?;

    let mut out = std::io::stdout().lock();
    Monitor::new(query, config.monitor.interval()).run(&stop, &mut out)?;
    Ok(0)
}
