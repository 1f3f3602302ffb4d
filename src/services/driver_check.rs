//! Driver checker
//!
//! Queries the driver tool once and prints a block per GPU.

use crate::cli::output::{print_output, print_section, Mark};
use crate::domain::{DeviceRecord, DEVICE_QUERY_FIELDS};
use crate::error::{Result, SmiError};
use crate::smi::DriverQuery;

use std::io::Write;

/// Checks that the NVIDIA driver answers queries
pub struct DriverChecker<Q> {
    query: Q,
}

impl<Q: DriverQuery> DriverChecker<Q> {
    /// Create a checker over the given driver query
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Run the check
    ///
    /// Returns `Ok(false)` when the query fails or times out; `Err` only for
    /// output errors. Lines with fewer than five fields are skipped.
    pub fn run(&self, out: &mut dyn Write) -> Result<bool> {
        print_section(out, "NVIDIA Driver Check")?;

        let stdout = match self.query.query(DEVICE_QUERY_FIELDS) {
            Ok(stdout) => stdout,
            Err(SmiError::Failed { stderr, .. }) => {
                writeln!(out, "{} Driver query failed: {}", Mark::Fail, stderr)?;
                return Ok(false);
            }
            Err(e) => {
                log::warn!("Driver query error: {}", e);
                writeln!(out, "{} Error running driver query: {}", Mark::Fail, e)?;
                return Ok(false);
            }
        };

        writeln!(out, "{} NVIDIA drivers detected", Mark::Pass)?;

        let records = DeviceRecord::parse_all(&stdout);
        log::debug!("Parsed {} device record(s)", records.len());
        for record in &records {
            log::debug!("Found GPU {}", record);
            print_output(out, record)?;
        }

        Ok(true)
    }
}
