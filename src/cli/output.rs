//! Output formatting utilities
//!
//! Section headers, status markers and text renderings for check results.

use crate::domain::{DeviceRecord, EnvironmentReport};
use std::fmt;
use std::io::{self, Write};

/// Width of the `=` rules around headers
pub const RULE_WIDTH: usize = 60;

/// Status marker prefixed to result lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Pass,
    Fail,
    Warn,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "✅"),
            Self::Fail => write!(f, "❌"),
            Self::Warn => write!(f, "⚠️ "),
        }
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Print the program banner
pub fn print_banner(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out, "{}", rule())?;
    writeln!(out, " {}", title)?;
    writeln!(out, "{}", rule())
}

/// Print a section header preceded by a blank line
pub fn print_section(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    print_banner(out, title)
}

/// Print a renderable value
pub fn print_output<T: TableDisplay>(out: &mut dyn Write, data: &T) -> io::Result<()> {
    writeln!(out, "{}", data.to_table())
}

/// Trait for types that can be displayed as a text block
pub trait TableDisplay {
    /// Format as a multi-line block
    fn to_table(&self) -> String;
}

impl TableDisplay for DeviceRecord {
    fn to_table(&self) -> String {
        format!(
            "\nGPU {}:\n  Name: {}\n  Driver: {}\n  Memory: {}\n  Temperature: {}",
            self.index, self.name, self.driver_version, self.memory_total, self.temperature
        )
    }
}

impl TableDisplay for EnvironmentReport {
    fn to_table(&self) -> String {
        let unknown = || "unknown".to_string();
        let mut output = format!("Tool: {}\n", self.tool);
        output.push_str(&format!(
            "Executable: {}\n",
            self.executable
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(unknown)
        ));
        output.push_str(&format!(
            "Working Directory: {}\n",
            self.working_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(unknown)
        ));
        output.push_str(&format!("Timestamp: {}\n", self.timestamp.to_rfc3339()));
        output.push_str(&format!("Platform: {}/{}\n", self.platform.0, self.platform.1));

        if let Some((var, value)) = &self.isolated_env {
            output.push_str(&format!("Isolated Environment ({}): {}\n", var, value));
        }

        if let Some(driver) = &self.driver {
            output.push_str(&format!("Driver Version: {}\n", driver.driver_version));
            if let Some(nvml) = &driver.nvml_version {
                output.push_str(&format!("NVML Version: {}\n", nvml));
            }
            if let Some(cuda) = driver.cuda_version {
                output.push_str(&format!("CUDA Driver Version: {}\n", cuda));
            }
        }

        output.push_str("\nSystem Resources:\n");
        output.push_str(&format!("  CPU Count: {}\n", self.resources.cpu_count));
        output.push_str(&format!("  Total RAM: {:.2} GB\n", self.resources.total_gib()));
        output.push_str(&format!(
            "  Available RAM: {:.2} GB",
            self.resources.available_gib()
        ));

        output
    }
}
