//! Single-check command implementations

use crate::cli::output::print_banner;
use crate::compute::load_runtime;
use crate::config::Config;
use crate::error::Result;
use crate::services::orchestrator::{ExitStatus, BANNER};
use crate::services::{ComputeVerifier, DriverChecker, EnvironmentReporter};
use crate::smi::NvidiaSmi;

/// Execute the env command
pub fn run_env(config: &Config) -> Result<i32> {
    let mut out = std::io::stdout().lock();
    print_banner(&mut out, BANNER)?;
    EnvironmentReporter::new(config.environment.marker_var.as_str()).run(&mut out)?;
    Ok(0)
}

/// Execute the driver command
pub fn run_driver(config: &Config) -> Result<i32> {
    let query = NvidiaSmi::new(&config.driver.command, config.driver.timeout());
    let mut out = std::io::stdout().lock();
    let passed = DriverChecker::new(query).run(&mut out)?;
    Ok(ExitStatus::from_passed(passed).code())
}

/// Execute the compute command
pub fn run_compute(config: &Config) -> Result<i32> {
    let mut out = std::io::stdout().lock();
    let passed = ComputeVerifier::new(config.compute.clone()).run(load_runtime, &mut out)?;
    Ok(ExitStatus::from_passed(passed).code())
}
