//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ThemeScope - export and share survey analysis results
///
/// Loads a classified survey result (a JSON file or a share link), filters
/// themes by a minimum comment count, and writes a CSV, HTML or JSON export
/// or prints a share link.
///
/// Examples:
///   themescope --input analysis.json
///   themescope --input analysis.json --format csv --min-total 5
///   themescope --input analysis.json --format share
///   themescope --link "http://localhost:3000/#eJy..." --format html
///   themescope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Analysis result JSON file to load
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present_any = ["link", "init_config"],
        conflicts_with = "link"
    )]
    pub input: Option<PathBuf>,

    /// Share link or bare share token to load instead of a file
    #[arg(short, long, visible_alias = "token", value_name = "URL")]
    pub link: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "html", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path
    ///
    /// Defaults to the conventional file name for the format, inside the
    /// configured output directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Only show themes with at least this many comments
    #[arg(short, long, value_name = "COUNT")]
    pub min_total: Option<u64>,

    /// Base URL that share links point at
    #[arg(long, value_name = "URL", env = "THEMESCOPE_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .themescope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Warn when theme tallies disagree with per-comment labels
    #[arg(long)]
    pub check: bool,

    /// Generate a default .themescope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Standalone HTML report (default)
    #[default]
    Html,
    /// Summary CSV
    Csv,
    /// One CSV row per categorized comment
    DetailCsv,
    /// Pretty-printed result JSON
    Json,
    /// Print a share link
    Share,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.input.is_none() && self.link.is_none() {
            return Err("Either --input or --link is required".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        if let Some(ref link) = self.link {
            if link.trim().is_empty() {
                return Err("Share link must not be empty".to_string());
            }
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }
}
