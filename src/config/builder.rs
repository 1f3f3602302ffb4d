//! Configuration builder
//!
//! Merges configuration from files and CLI arguments.

use crate::config::{Config, ConfigFile};
use crate::error::ConfigError;

/// Builder for merging configuration sources
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Load configuration from a file
    ///
    /// An explicit path must exist and parse; the default locations are
    /// searched best-effort.
    pub fn with_file(mut self, path: Option<&str>) -> Result<Self, ConfigError> {
        let file_config = match path {
            Some(path) => Some(ConfigFile::load(path)?),
            None => ConfigFile::load_default(),
        };

        if let Some(cfg) = file_config {
            self.config = cfg;
        }

        Ok(self)
    }

    /// Override the driver query timeout (applies to the monitor loop too)
    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        if let Some(t) = timeout_secs {
            self.config.driver.timeout_secs = t;
            self.config.monitor.timeout_secs = t;
        }
        self
    }

    /// Override the monitor interval
    pub fn with_interval(mut self, interval_secs: Option<u64>) -> Self {
        if let Some(i) = interval_secs {
            self.config.monitor.interval_secs = i;
        }
        self
    }

    /// Override the benchmark matrix size
    pub fn with_matrix_size(mut self, size: Option<usize>) -> Self {
        if let Some(s) = size {
            self.config.compute.matrix_size = s;
        }
        self
    }

    /// Override the benchmark iteration count
    pub fn with_iterations(mut self, iterations: Option<u32>) -> Self {
        if let Some(i) = iterations {
            self.config.compute.benchmark_iterations = i;
        }
        self
    }

    /// Disable the monitor loop
    pub fn with_no_monitor(mut self, no_monitor: bool) -> Self {
        if no_monitor {
            self.config.monitor.enabled = false;
        }
        self
    }

    /// Validate and build the final configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
