//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// GPU availability and CUDA compute verification
///
/// Checks the NVIDIA driver and CUDA compute inside a container, then keeps
/// reporting GPU telemetry until interrupted.
#[derive(Parser, Debug)]
#[command(name = "gpucheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GPUCHECK_CONFIG")]
    pub config: Option<String>,

    /// Driver query timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Seconds between monitor samples
    #[arg(long, global = true)]
    pub interval: Option<u64>,

    /// Matrix dimension for the compute tests
    #[arg(long, global = true)]
    pub matrix_size: Option<usize>,

    /// Timed matrix multiplication iterations
    #[arg(long, global = true)]
    pub iterations: Option<u32>,

    /// Exit after the checks instead of monitoring
    #[arg(long, global = true)]
    pub no_monitor: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Selected command, defaulting to a full run
    pub fn selected_command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Run)
    }

    /// Default log filter for the `--verbose` setting
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every check, then monitor on success (default)
    Run,

    /// Show environment information
    Env,

    /// Check the NVIDIA driver
    Driver,

    /// Verify CUDA compute
    Compute,

    /// Monitor GPU utilization until interrupted
    Monitor,

    /// Print the effective configuration
    PrintConfig,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}
