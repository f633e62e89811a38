// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `bootwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bootwatch",
    version,
    about = "Launch a bundled backend server, wait until it is ready and stop it cleanly.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Bootwatch.toml` in the current working directory; built-in
    /// defaults are used if that file does not exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Resolve the backend from the packaged resources directory instead of
    /// the development build output.
    #[arg(long)]
    pub packaged: bool,

    /// Override `[launch].startup_timeout` (e.g. "15s", "500ms").
    #[arg(long, value_name = "DURATION")]
    pub startup_timeout: Option<String>,

    /// Override `[launch].grace_period` (e.g. "3s").
    #[arg(long, value_name = "DURATION")]
    pub grace_period: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BOOTWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve paths and print them, but don't launch anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Launch, wait for readiness, then shut the backend down and exit.
    #[arg(long)]
    pub check: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
