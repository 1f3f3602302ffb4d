//! Benchmark result domain type

use std::time::Duration;

/// Timing of a repeated matrix multiplication
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkResult {
    /// Square matrix dimension
    pub size: usize,
    /// Number of timed iterations
    pub iterations: u32,
    /// Wall-clock time for all timed iterations
    pub elapsed: Duration,
}

impl BenchmarkResult {
    /// Create a new benchmark result
    pub fn new(size: usize, iterations: u32, elapsed: Duration) -> Self {
        Self {
            size,
            iterations,
            elapsed,
        }
    }

    /// Elapsed time in seconds
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Iterations per second, or `None` if no measurable time elapsed
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.seconds();
        if secs > 0.0 {
            Some(self.iterations as f64 / secs)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput() {
        let result = BenchmarkResult::new(1000, 5, Duration::from_millis(500));
        assert!((result.throughput().unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_throughput_zero_elapsed() {
        let result = BenchmarkResult::new(1000, 5, Duration::ZERO);
        assert!(result.throughput().is_none());
    }
}
