//! Library interface for the `food-lookup` CLI.
//!
//! Exposes the argument parser, the command implementations and the HTTP and
//! MCP surfaces so they can be tested without spawning the binary. The entry
//! point is in `main.rs`.
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations
//! - [`http`] - The axum router behind `serve`
//! - [`observability`] - Tracing subscriber setup

pub mod commands;
pub mod http;
pub mod observability;

#[cfg(feature = "mcp")]
pub mod server;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                   Log filter (e.g., debug, food_lookup_core=trace)
    FOOD_LOOKUP_LOG_PATH       Explicit log file path
    FOOD_LOOKUP_LOG_DIR        Log directory
    FOOD_LOOKUP_DATA_DIR       Data directory (also AIP_DATA_FOLDER)
    FOOD_LOOKUP_ACCESS_TOKEN   Bearer token required by /search and /suggest
";
/// Command-line interface definition for food-lookup.
#[derive(Parser)]
#[command(name = "food-lookup")]
#[command(about = "Typo-tolerant allowed/disallowed food lookup service", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Catalog data directory (overrides configuration)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Look up a food in the catalog
    Lookup(commands::lookup::LookupArgs),

    /// Suggest a food that is missing from the catalog
    Suggest(commands::suggest::SuggestArgs),

    /// Load the data directory and report what was found
    Stats(commands::stats::StatsArgs),

    /// Show package information
    Info(commands::info::InfoArgs),

    /// Serve the HTTP API
    Serve(commands::serve::ServeArgs),

    /// Start MCP (Model Context Protocol) server on stdio
    #[cfg(feature = "mcp")]
    Mcp(commands::mcp::McpArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}
