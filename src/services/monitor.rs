//! Monitor loop
//!
//! Polls the driver at a fixed interval and prints one summary line per
//! cycle until the stop flag is raised.

use crate::cli::output::print_section;
use crate::domain::{MonitorSample, MONITOR_QUERY_FIELDS};
use crate::error::Result;
use crate::smi::DriverQuery;

use chrono::Local;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Longest single sleep between stop-flag checks
const STOP_POLL: Duration = Duration::from_millis(100);

/// Telemetry monitor loop
pub struct Monitor<Q> {
    query: Q,
    interval: Duration,
}

impl<Q: DriverQuery> Monitor<Q> {
    /// Create a new monitor
    pub fn new(query: Q, interval: Duration) -> Self {
        Self { query, interval }
    }

    /// Run until `stop` is set
    ///
    /// Each cycle sleeps for the interval first, then samples. Query and
    /// parse failures skip the cycle. Returns the number of lines printed.
    pub fn run(&self, stop: &AtomicBool, out: &mut dyn Write) -> Result<u64> {
        print_section(out, "Continuous Monitoring Mode")?;
        writeln!(
            out,
            "GPU stats every {} seconds...",
            self.interval.as_secs_f64()
        )?;
        writeln!(out, "Press Ctrl+C to stop")?;
        out.flush()?;

        let mut iteration: u64 = 0;
        let mut printed: u64 = 0;

        loop {
            iteration += 1;
            if !sleep_unless_stopped(self.interval, stop) {
                break;
            }

            if self.tick(iteration, out)? {
                printed += 1;
            }

            if stop.load(Ordering::SeqCst) {
                break;
            }
        }

        writeln!(out, "\nStopping monitoring...")?;
        log::info!("Monitor stopped after {} cycle(s)", iteration);
        Ok(printed)
    }

    /// Take one sample; returns whether a line was printed
    pub fn tick(&self, iteration: u64, out: &mut dyn Write) -> Result<bool> {
        let stdout = match self.query.query(MONITOR_QUERY_FIELDS) {
            Ok(stdout) => stdout,
            Err(e) => {
                log::debug!("Monitor query failed: {}", e);
                return Ok(false);
            }
        };

        let Some(sample) = MonitorSample::from_csv(&stdout) else {
            log::debug!("Unparseable monitor output: {:?}", stdout.trim());
            return Ok(false);
        };

        let timestamp = Local::now().format("%H:%M:%S");
        writeln!(out, "[{}] Iteration {}: {}", timestamp, iteration, sample)?;
        out.flush()?;
        Ok(true)
    }
}

/// Sleep for `duration`; returns false as soon as `stop` is observed
fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) -> bool {
    let deadline = Instant::now() + duration;

    loop {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockQuery;
    use std::sync::Arc;

    const FAST: Duration = Duration::from_millis(1);

    fn run(query: &MockQuery, stop: &AtomicBool) -> (u64, String) {
        let mut buf = Vec::new();
        let printed = Monitor::new(query, FAST).run(stop, &mut buf).unwrap();
        (printed, String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_one_line_per_cycle() {
        let stop = Arc::new(AtomicBool::new(false));
        let query =
            MockQuery::with_output("37 %, 1024 MiB, 8192 MiB, 51\n").stop_after(3, stop.clone());

        let (printed, text) = run(&query, &stop);
        assert_eq!(printed, 3);
        assert_eq!(query.calls(), 3);
        assert!(text.contains("Iteration 1: GPU 37 %, Mem 1024 MiB/8192 MiB, Temp 51"));
        assert!(text.contains("Iteration 3:"));
        assert!(text.ends_with("Stopping monitoring...\n"));
    }

    #[test]
    fn test_malformed_output_skipped() {
        let stop = Arc::new(AtomicBool::new(false));
        let query = MockQuery::sequence(vec![
            MockQuery::output("garbage"),
            MockQuery::output("5 %, 1 MiB, 2 MiB, 40"),
        ])
        .stop_after(2, stop.clone());

        let (printed, text) = run(&query, &stop);
        assert_eq!(printed, 1);
        assert!(!text.contains("Iteration 1:"));
        assert!(text.contains("Iteration 2: GPU 5 %"));
    }

    #[test]
    fn test_query_errors_swallowed() {
        let stop = Arc::new(AtomicBool::new(false));
        let query = MockQuery::timing_out().stop_after(2, stop.clone());

        let (printed, text) = run(&query, &stop);
        assert_eq!(printed, 0);
        assert_eq!(query.calls(), 2);
        assert!(text.contains("Stopping monitoring..."));
    }

    #[test]
    fn test_already_stopped() {
        let stop = AtomicBool::new(true);
        let query = MockQuery::with_output("1 %, 1 MiB, 2 MiB, 30");

        let (printed, _) = run(&query, &stop);
        assert_eq!(printed, 0);
        assert_eq!(query.calls(), 0);
    }

    #[test]
    fn test_sleep_unless_stopped() {
        let stop = AtomicBool::new(false);
        assert!(sleep_unless_stopped(Duration::from_millis(5), &stop));
        stop.store(true, Ordering::SeqCst);
        assert!(!sleep_unless_stopped(Duration::from_secs(60), &stop));
    }
}
