//! Trait definitions for driver queries

use crate::error::SmiError;

/// Runs a CSV query against the GPU driver
///
/// Implementations request the given fields without a header row and
/// return the raw standard output.
pub trait DriverQuery {
    /// Query the given fields for every GPU
    fn query(&self, fields: &[&str]) -> Result<String, SmiError>;
}

impl<T: DriverQuery + ?Sized> DriverQuery for &T {
    fn query(&self, fields: &[&str]) -> Result<String, SmiError> {
        (**self).query(fields)
    }
}
