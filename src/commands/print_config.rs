//! Print-config command implementation

use crate::config::Config;
use crate::error::Result;

/// Print the effective configuration as TOML
pub fn run_print_config(config: &Config) -> Result<i32> {
    print!("{}", config.to_toml()?);
    Ok(0)
}
