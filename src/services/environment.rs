//! Environment reporter
//!
//! Prints process, host and (when NVML loads) driver information.

use crate::cli::output::{print_output, print_section};
use crate::domain::{EnvironmentReport, SystemResources};
use crate::error::Result;
use crate::nvml::try_driver_summary;

use chrono::Local;
use std::io::Write;
use sysinfo::System;

/// Gathers and prints the environment report
pub struct EnvironmentReporter {
    marker_var: String,
}

impl EnvironmentReporter {
    /// Create a reporter that looks for `marker_var` to detect an isolated environment
    pub fn new(marker_var: impl Into<String>) -> Self {
        Self {
            marker_var: marker_var.into(),
        }
    }

    /// Collect the report
    pub fn collect(&self) -> EnvironmentReport {
        let isolated_env = std::env::var(&self.marker_var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| (self.marker_var.clone(), v));

        EnvironmentReport {
            tool: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            executable: std::env::current_exe().ok(),
            working_dir: std::env::current_dir().ok(),
            timestamp: Local::now(),
            platform: (
                std::env::consts::OS.to_string(),
                std::env::consts::ARCH.to_string(),
            ),
            isolated_env,
            resources: system_resources(),
            driver: try_driver_summary(),
        }
    }

    /// Collect and print the report
    pub fn run(&self, out: &mut dyn Write) -> Result<EnvironmentReport> {
        print_section(out, "Environment Information")?;
        let report = self.collect();
        print_output(out, &report)?;
        Ok(report)
    }
}

/// Query host CPU and memory totals
pub fn system_resources() -> SystemResources {
    let mut sys = System::new();
    sys.refresh_cpu();
    sys.refresh_memory();

    SystemResources {
        cpu_count: sys.cpus().len(),
        total_memory: sys.total_memory(),
        available_memory: sys.available_memory(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_resources() {
        let res = system_resources();
        assert!(res.cpu_count > 0);
        assert!(res.total_memory > 0);
        assert!(res.available_memory <= res.total_memory);
    }

    #[test]
    fn test_missing_marker_is_skipped() {
        let reporter = EnvironmentReporter::new("GPUCHECK_TEST_MARKER_THAT_IS_NEVER_SET");
        let report = reporter.collect();
        assert!(report.isolated_env.is_none());
        assert!(report.tool.starts_with("gpucheck "));
    }

    #[test]
    fn test_marker_is_reported() {
        // PATH is always set in a test process
        let reporter = EnvironmentReporter::new("PATH");
        let report = reporter.collect();
        assert_eq!(report.isolated_env.map(|(k, _)| k).as_deref(), Some("PATH"));
    }

    #[test]
    fn test_run_prints_section() {
        let mut buf = Vec::new();
        EnvironmentReporter::new("GPUCHECK_UNSET").run(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Environment Information"));
        assert!(text.contains("CPU Count:"));
    }
}
