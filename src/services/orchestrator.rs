//! Orchestrator
//!
//! Runs the environment report, driver check and compute check in order,
//! prints a summary and enters the monitor loop only when both hardware
//! checks passed.

use crate::cli::output::{print_banner, print_section, Mark};
use crate::compute::ComputeRuntime;
use crate::config::Config;
use crate::error::{ComputeError, Result};
use crate::services::{ComputeVerifier, DriverChecker, EnvironmentReporter, Monitor};
use crate::smi::DriverQuery;

use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Banner printed at the top of a full run
pub const BANNER: &str = "GPU Diagnostics";

/// Process exit status of a diagnostic run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Both hardware checks passed
    Success,
    /// At least one hardware check failed
    Failure,
}

impl ExitStatus {
    /// Build from a check outcome
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// Process exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

/// Outcome of each hardware check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSummary {
    pub driver_ok: bool,
    pub compute_ok: bool,
}

impl CheckSummary {
    /// True when every hardware check passed
    pub fn passed(&self) -> bool {
        self.driver_ok && self.compute_ok
    }
}

/// Sequential runner for the full diagnostic
pub struct Orchestrator<'a, D, M> {
    config: &'a Config,
    driver_query: D,
    monitor_query: M,
}

impl<'a, D: DriverQuery, M: DriverQuery> Orchestrator<'a, D, M> {
    /// Create an orchestrator
    ///
    /// The driver check and the monitor loop take separate queries so they
    /// can use different timeouts.
    pub fn new(config: &'a Config, driver_query: D, monitor_query: M) -> Self {
        Self {
            config,
            driver_query,
            monitor_query,
        }
    }

    /// Run every check without early exit, then monitor on success
    ///
    /// `interrupt` is only called when the monitor loop is entered, so an
    /// interrupt during the checks keeps its default behavior. The monitor
    /// loop returns once the flag it produces is raised.
    pub fn run<F, S>(&self, load: F, interrupt: S, out: &mut dyn Write) -> Result<ExitStatus>
    where
        F: FnOnce() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError>,
        S: FnOnce() -> Result<Arc<AtomicBool>>,
    {
        let summary = self.run_checks(load, out)?;
        self.print_summary(&summary, out)?;

        if summary.passed() {
            if self.config.monitor.enabled {
                let stop = interrupt()?;
                Monitor::new(&self.monitor_query, self.config.monitor.interval())
                    .run(&stop, out)?;
            } else {
                log::info!("Monitoring disabled, exiting");
            }
        }

        Ok(ExitStatus::from_passed(summary.passed()))
    }

    /// Run the environment report and both hardware checks
    pub fn run_checks<F>(&self, load: F, out: &mut dyn Write) -> Result<CheckSummary>
    where
        F: FnOnce() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError>,
    {
        print_banner(out, BANNER)?;

        EnvironmentReporter::new(self.config.environment.marker_var.as_str()).run(out)?;
        let driver_ok = DriverChecker::new(&self.driver_query).run(out)?;
        let compute_ok = ComputeVerifier::new(self.config.compute.clone()).run(load, out)?;

        log::debug!("driver_ok={} compute_ok={}", driver_ok, compute_ok);
        Ok(CheckSummary {
            driver_ok,
            compute_ok,
        })
    }

    fn print_summary(&self, summary: &CheckSummary, out: &mut dyn Write) -> Result<()> {
        print_section(out, "Test Summary")?;

        if summary.passed() {
            writeln!(out, "{} All tests PASSED!", Mark::Pass)?;
            writeln!(out, "GPU is fully functional in this container.")?;
        } else {
            writeln!(out, "{} Some tests FAILED", Mark::Fail)?;
            if !summary.driver_ok {
                writeln!(out, "  - NVIDIA drivers not detected")?;
            }
            if !summary.compute_ok {
                writeln!(out, "  - CUDA compute tests failed")?;
            }
        }
        out.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComputeConfig;
    use crate::error::AppError;
    use crate::mock::{MockQuery, MockRuntime};
    use std::cell::Cell;

    const DEVICE_LINE: &str = "0, Test GPU, 525.60.13, 8192 MiB, 45\n";

    fn test_config() -> Config {
        let mut config = Config::default();
        config.compute = ComputeConfig {
            matrix_size: 16,
            benchmark_iterations: 1,
            warmup_iterations: 1,
            cpu_iterations: 1,
            allocation_mib: 1,
        };
        config.monitor.interval_secs = 1;
        config.environment.marker_var = "GPUCHECK_TEST_UNSET".to_string();
        config
    }

    fn working_runtime() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError> {
        Ok(Box::new(MockRuntime::new(1)))
    }

    fn missing_runtime() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError> {
        Err(ComputeError::Unavailable("ImportError".to_string()))
    }

    fn run(
        config: &Config,
        driver: &MockQuery,
        load: fn() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError>,
    ) -> (ExitStatus, String) {
        let (status, text, _) = run_counting_installs(config, driver, load);
        (status, text)
    }

    /// Run with an already-raised stop flag; also returns how often the
    /// interrupt handler was requested
    fn run_counting_installs(
        config: &Config,
        driver: &MockQuery,
        load: fn() -> std::result::Result<Box<dyn ComputeRuntime>, ComputeError>,
    ) -> (ExitStatus, String, usize) {
        let monitor = MockQuery::with_output("1 %, 1 MiB, 2 MiB, 30");
        let installs = Cell::new(0);
        let interrupt = || {
            installs.set(installs.get() + 1);
            Ok(Arc::new(AtomicBool::new(true)))
        };
        let mut buf = Vec::new();
        let status = Orchestrator::new(config, driver, &monitor)
            .run(load, interrupt, &mut buf)
            .unwrap();
        (status, String::from_utf8(buf).unwrap(), installs.get())
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::Failure.code(), 1);
    }

    #[test]
    fn test_all_passed_enters_monitor() {
        let config = test_config();
        let (status, text) = run(&config, &MockQuery::with_output(DEVICE_LINE), working_runtime);
        assert_eq!(status, ExitStatus::Success);
        assert!(text.starts_with(&"=".repeat(60)));
        assert!(text.contains("All tests PASSED!"));
        assert!(text.contains("Continuous Monitoring Mode"));
        assert!(text.contains("Stopping monitoring..."));
    }

    #[test]
    fn test_monitor_disabled() {
        let mut config = test_config();
        config.monitor.enabled = false;
        let (status, text) = run(&config, &MockQuery::with_output(DEVICE_LINE), working_runtime);
        assert_eq!(status, ExitStatus::Success);
        assert!(!text.contains("Continuous Monitoring Mode"));
    }

    #[test]
    fn test_compute_unavailable_exits_one() {
        let config = test_config();
        let (status, text) = run(&config, &MockQuery::with_output(DEVICE_LINE), missing_runtime);
        assert_eq!(status.code(), 1);
        assert!(text.contains("Some tests FAILED"));
        assert!(text.contains("- CUDA compute tests failed"));
        assert!(!text.contains("- NVIDIA drivers not detected"));
        assert!(!text.contains("Continuous Monitoring Mode"));
    }

    #[test]
    fn test_driver_failure_still_runs_compute() {
        let config = test_config();
        let (status, text) = run(&config, &MockQuery::failing("no devices"), working_runtime);
        assert_eq!(status, ExitStatus::Failure);
        assert!(text.contains("Basic operations successful"));
        assert!(text.contains("- NVIDIA drivers not detected"));
        assert!(!text.contains("- CUDA compute tests failed"));
    }

    #[test]
    fn test_both_failed() {
        let config = test_config();
        let (status, text) = run(&config, &MockQuery::timing_out(), missing_runtime);
        assert_eq!(status, ExitStatus::Failure);
        assert!(text.contains("- NVIDIA drivers not detected"));
        assert!(text.contains("- CUDA compute tests failed"));
    }

    #[test]
    fn test_interrupt_handler_installed_only_for_monitoring() {
        let config = test_config();
        let driver = MockQuery::with_output(DEVICE_LINE);

        let (_, _, installs) = run_counting_installs(&config, &driver, working_runtime);
        assert_eq!(installs, 1);

        let (_, _, installs) = run_counting_installs(&config, &driver, missing_runtime);
        assert_eq!(installs, 0);

        let mut disabled = test_config();
        disabled.monitor.enabled = false;
        let (_, _, installs) = run_counting_installs(&disabled, &driver, working_runtime);
        assert_eq!(installs, 0);
    }

    #[test]
    fn test_checks_run_before_interrupt_handler() {
        let config = test_config();
        let driver = MockQuery::with_output(DEVICE_LINE);
        let monitor = MockQuery::with_output("1 %, 1 MiB, 2 MiB, 30");
        let mut buf = Vec::new();

        let result = Orchestrator::new(&config, &driver, &monitor).run(
            working_runtime,
            || {
                assert_eq!(driver.calls(), 1);
                Err(AppError::Signal("already installed".to_string()))
            },
            &mut buf,
        );

        assert!(matches!(result, Err(AppError::Signal(_))));
        assert_eq!(monitor.calls(), 0);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("All tests PASSED!"));
    }
}
