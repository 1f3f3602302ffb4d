//! Device record domain type
//!
//! A per-GPU record parsed from one line of driver query output.

use std::fmt;

/// Fields requested from the driver query tool for the device check
pub const DEVICE_QUERY_FIELDS: &[&str] = &[
    "index",
    "name",
    "driver_version",
    "memory.total",
    "temperature.gpu",
];

/// One GPU as reported by the driver query tool
///
/// Values are kept as the tool printed them (including units), since they
/// are only ever displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// GPU index as reported by the driver
    pub index: String,
    /// Product name
    pub name: String,
    /// Driver version
    pub driver_version: String,
    /// Total memory (e.g. "8192 MiB")
    pub memory_total: String,
    /// Current temperature in Celsius
    pub temperature: String,
}

impl DeviceRecord {
    /// Parse one CSV line
    ///
    /// Returns `None` if the line has fewer than five fields. Extra fields
    /// are ignored.
    pub fn from_csv_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < DEVICE_QUERY_FIELDS.len() {
            return None;
        }

        Some(Self {
            index: parts[0].to_string(),
            name: parts[1].to_string(),
            driver_version: parts[2].to_string(),
            memory_total: parts[3].to_string(),
            temperature: parts[4].to_string(),
        })
    }

    /// Parse every well-formed line of query output, skipping the rest
    pub fn parse_all(output: &str) -> Vec<Self> {
        output
            .trim()
            .lines()
            .filter_map(Self::from_csv_line)
            .collect()
    }
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let record = DeviceRecord::from_csv_line("0, Test GPU, 525.60.13, 8192 MiB, 45").unwrap();
        assert_eq!(record.index, "0");
        assert_eq!(record.name, "Test GPU");
        assert_eq!(record.driver_version, "525.60.13");
        assert_eq!(record.memory_total, "8192 MiB");
        assert_eq!(record.temperature, "45");
    }

    #[test]
    fn test_parse_short_line() {
        assert!(DeviceRecord::from_csv_line("0, Test GPU, 525.60.13, 8192 MiB").is_none());
        assert!(DeviceRecord::from_csv_line("").is_none());
    }

    #[test]
    fn test_parse_all_skips_malformed_lines() {
        let output = "0, GPU A, 535.1, 24576 MiB, 40\ngarbage\n1, GPU B, 535.1, 16384 MiB, 52\n";
        let records = DeviceRecord::parse_all(output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "GPU B");
        assert_eq!(records[1].temperature, "52");
    }

    #[test]
    fn test_display() {
        let record = DeviceRecord::from_csv_line("1, RTX 4090, 550.2, 24564 MiB, 38").unwrap();
        assert_eq!(record.to_string(), "[1] RTX 4090");
    }
}
