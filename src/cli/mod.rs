//! CLI module for the testbridge host
//!
//! A thin host over the [`crate::driver::Driver`], loading test modules from the reference framework catalog.
//!
//! ## Commands
//!
//! - `count` - Count the test cases selected by a filter
//! - `explore` - Print the combined exploration document
//! - `run` - Run the selected tests and print the combined result document
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::process;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand};
use testbridge_core::Value;
use testbridge_framework::catalog;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const ALL_TESTS: &str = "<filter />";

// ============================================================================
// Clap CLI definition
// ============================================================================

/// testbridge host CLI
#[derive(Parser, Debug)]
#[command(name = "testbridge")]
#[command(version = VERSION)]
#[command(about = "Drive externally supplied test modules through their framework's controller", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Which framework and modules to load.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Framework module providing the controller
    #[arg(long, default_value = "current", value_parser = PossibleValuesParser::new(catalog::FRAMEWORKS))]
    pub framework: String,

    /// Test module to load; repeat to load several (the same name twice loads it twice)
    #[arg(short, long = "module", value_name = "NAME", default_value = catalog::MOCK_MODULE)]
    pub modules: Vec<String>,

    /// Id prefixed to every test id as `<id>-`
    #[arg(long)]
    pub id: Option<String>,

    /// Controller setting; the value is parsed as JSON when possible
    #[arg(long = "setting", value_name = "KEY=VALUE", value_parser = commands::parse_setting)]
    pub settings: Vec<(String, Value)>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Count the test cases selected by the filter
    Count {
        #[command(flatten)]
        load: LoadArgs,
        /// Filter handed to the controller
        #[arg(long, default_value = ALL_TESTS)]
        filter: String,
    },

    /// Print the combined exploration document
    Explore {
        #[command(flatten)]
        load: LoadArgs,
        /// Filter handed to the controller
        #[arg(long, default_value = ALL_TESTS)]
        filter: String,
    },

    /// Run the selected tests and print the combined result document
    Run {
        #[command(flatten)]
        load: LoadArgs,
        /// Filter handed to the controller
        #[arg(long, default_value = ALL_TESTS)]
        filter: String,
        /// Print progress notices to stderr
        #[arg(short, long)]
        progress: bool,
        /// Dispatch each module's run on its own thread, then wait for all of them
        #[arg(long = "async")]
        background: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
pub fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Count { load, filter } => commands::count(&load, &filter),
        Command::Explore { load, filter } => commands::explore(&load, &filter),
        Command::Run {
            load,
            filter,
            progress,
            background,
        } => commands::run(&load, &filter, progress, background),
    }
}

// ============================================================================
// Tests
// ============================================================================
