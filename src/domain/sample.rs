//! Monitor sample domain type
//!
//! One utilization/memory/temperature reading taken by the monitor loop.

use std::fmt;

/// Fields requested from the driver query tool by the monitor loop
pub const MONITOR_QUERY_FIELDS: &[&str] = &[
    "utilization.gpu",
    "memory.used",
    "memory.total",
    "temperature.gpu",
];

/// GPU telemetry snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSample {
    /// GPU utilization (e.g. "37 %")
    pub utilization: String,
    /// Memory in use (e.g. "1024 MiB")
    pub memory_used: String,
    /// Total memory
    pub memory_total: String,
    /// Temperature in Celsius
    pub temperature: String,
}

impl MonitorSample {
    /// Parse query output
    ///
    /// Only the first non-empty line is considered. Returns `None` if it has
    /// fewer than four fields.
    pub fn from_csv(output: &str) -> Option<Self> {
        let line = output.lines().map(str::trim).find(|l| !l.is_empty())?;
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < MONITOR_QUERY_FIELDS.len() {
            return None;
        }

        Some(Self {
            utilization: parts[0].to_string(),
            memory_used: parts[1].to_string(),
            memory_total: parts[2].to_string(),
            temperature: parts[3].to_string(),
        })
    }
}

impl fmt::Display for MonitorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GPU {}, Mem {}/{}, Temp {}",
            self.utilization, self.memory_used, self.memory_total, self.temperature
        )
    }
}
