//! gpucheck - GPU diagnostics for containers
//!
//! Verifies the NVIDIA driver and CUDA compute, then reports GPU telemetry
//! until interrupted.

use clap::Parser;
use gpucheck::cli::args::{generate_completions, Cli, Commands};
use gpucheck::commands::{
    run_all, run_compute, run_driver, run_env, run_monitor, run_print_config,
};
use gpucheck::config::{Config, ConfigBuilder, MAX_MATRIX_SIZE};
use gpucheck::error::{AppError, ConfigError};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still takes precedence
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            log::error!("{}", e);
            print_error(&e);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32, AppError> {
    if let Commands::Completions { shell } = cli.selected_command() {
        generate_completions(*shell);
        return Ok(0);
    }

    let config = load_config(cli)?;

    match cli.selected_command() {
        Commands::Run => run_all(&config),

        Commands::Env => run_env(&config),

        Commands::Driver => run_driver(&config),

        Commands::Compute => run_compute(&config),

        Commands::Monitor => run_monitor(&config),

        Commands::PrintConfig => run_print_config(&config),

        Commands::Completions { .. } => Ok(0),
    }
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_timeout(cli.timeout)
        .with_interval(cli.interval)
        .with_matrix_size(cli.matrix_size)
        .with_iterations(cli.iterations)
        .with_no_monitor(cli.no_monitor)
        .build()
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Pass an existing file with --config, or omit it to use");
            eprintln!("      /etc/gpucheck/config.toml or ./gpucheck.toml when present.");
        }
        AppError::Config(ConfigError::InvalidValue { .. }) => {
            eprintln!();
            eprintln!("Hint: Timeouts, sizes, iteration counts and intervals must be positive,");
            eprintln!("      and the matrix size at most {}.", MAX_MATRIX_SIZE);
        }
        _ => {}
    }
}
