//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.themescope.toml` files.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use themescope::report::generator::DEFAULT_CHART_SCRIPT_URL;
use themescope::report::DocumentOptions;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".themescope.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Theme filter settings.
    #[serde(default)]
    pub filter: FilterConfig,

    /// HTML report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Share link settings.
    #[serde(default)]
    pub share: ShareConfig,
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory exports are written to when no output file is given.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    ".".to_string()
}

/// Theme filter settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Minimum comments a theme needs to be shown.
    #[serde(default)]
    pub min_total: u64,
}

/// HTML report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,

    /// Charting library script URL.
    #[serde(default = "default_chart_script_url")]
    pub chart_script_url: String,

    /// Footer line.
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            chart_script_url: default_chart_script_url(),
            footer: default_footer(),
        }
    }
}

fn default_title() -> String {
    DocumentOptions::default().title
}

fn default_chart_script_url() -> String {
    DEFAULT_CHART_SCRIPT_URL.to_string()
}

fn default_footer() -> String {
    DocumentOptions::default().footer
}

/// Share link settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Page that share links open.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000/".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(min_total) = args.min_total {
            self.filter.min_total = min_total;
        }
        if let Some(ref base_url) = args.base_url {
            self.share.base_url = base_url.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level after merging: `--quiet` wins, then `verbose` from either
    /// the file or `--verbose`.
    pub fn log_level(&self, args: &crate::cli::Args) -> tracing::Level {
        if args.quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// HTML document options for a report generated at `generated_at`.
    pub fn document_options(&self, generated_at: DateTime<Utc>) -> DocumentOptions {
        DocumentOptions {
            title: self.report.title.clone(),
            chart_script_url: self.report.chart_script_url.clone(),
            footer: self.report.footer.clone(),
            generated_at: Some(generated_at),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
