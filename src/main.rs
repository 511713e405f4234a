//! ThemeScope - export and share survey analysis results
//!
//! A CLI tool that loads a classified survey result from a JSON file or a
//! share link and turns it into CSV, HTML or JSON exports, or a share link.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad arguments, unreadable input, write failure, etc.)
//!   3 - The share link is invalid or corrupted

mod cli;
mod config;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use std::path::{Path, PathBuf};
use themescope::analysis::{self, FilteredView};
use themescope::models::AnalysisResult;
use themescope::report;
use themescope::share;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code for a share link that cannot be decoded.
const EXIT_CORRUPT_LINK: i32 = 3;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so it can set the level
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(&args));

    info!("ThemeScope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    log_config_source(&source);

    match run(args, config) {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<themescope::Error>() {
                if err.is_corrupt_share_token() {
                    error!("Share link rejected: {}", err);
                    eprintln!("\n❌ {}", err.user_message());
                    std::process::exit(EXIT_CORRUPT_LINK);
                }
            }
            error!("Export failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .themescope.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize the threshold, report title, share URL, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Load, filter and export one analysis result.
fn run(args: Args, config: Config) -> Result<()> {
    let result = load_result(&args)?;
    info!(
        "Loaded {} themes, {} insights ({} mode)",
        result.themes.len(),
        result.insights.len(),
        result.analysis_mode
    );

    if args.check {
        let issues = analysis::check_consistency(&result);
        if issues.is_empty() {
            info!("Theme tallies match the per-comment labels");
        }
        for issue in &issues {
            warn!("{}", issue);
        }
    }

    let view = analysis::filter_and_rank(&result, config.filter.min_total);

    let generated_at = Utc::now();
    let (content, default_name) = match args.format {
        OutputFormat::Share => {
            let url = share::share_url(&config.share.base_url, &result)?;
            println!("{}", url);
            return Ok(());
        }
        OutputFormat::Csv => (
            report::to_delimited_text(&result, &view),
            report::SUMMARY_CSV_FILE.to_string(),
        ),
        OutputFormat::DetailCsv => {
            let content = report::to_detail_text(&result)
                .context("This result has no per-comment labels to export")?;
            (content, report::DETAIL_CSV_FILE.to_string())
        }
        OutputFormat::Json => (
            report::to_json_export(&result)?,
            report::JSON_FILE.to_string(),
        ),
        OutputFormat::Html => (
            report::to_document_with(&result, &view, &config.document_options(generated_at)),
            report::document_file_name(generated_at.date_naive()),
        ),
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| Path::new(&config.general.output).join(default_name));
    report::write_artifact(&output, &content)?;

    if !args.quiet {
        print_summary(&view, &output);
    }

    Ok(())
}

/// Load the result from the input file or the share link.
fn load_result(args: &Args) -> Result<AnalysisResult> {
    if let Some(ref input) = args.input {
        info!("Reading analysis from: {}", input.display());
        let json = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        return Ok(AnalysisResult::from_json(&json)?);
    }

    let link = args.link.as_deref().unwrap_or_default();
    info!("Decoding shared analysis link");
    Ok(share::decode(share::token_from_link(link))?)
}

/// Where the configuration came from.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    BuiltIn,
    Unreadable(anyhow::Error),
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is initialized, so the outcome is returned and logged
/// afterwards by `log_config_source`.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::BuiltIn)),
        Err(e) => Ok((Config::default(), ConfigSource::Unreadable(e))),
    }
}

fn log_config_source(source: &ConfigSource) {
    match source {
        ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
        ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
        ConfigSource::BuiltIn => debug!("No config file found, using defaults"),
        ConfigSource::Unreadable(e) => warn!("Failed to load config: {:#}", e),
    }
}

fn print_summary(view: &FilteredView, output: &Path) {
    println!("\n📊 Analysis Summary:");
    println!("   Themes shown: {}", view.themes.len());
    if view.min_total > 0 {
        println!("   Threshold: {} or more comments", view.min_total);
    }
    println!(
        "   Comments: {} visible of {} total",
        view.visible_total(),
        view.grand_total
    );
    println!("\n✅ Export saved to: {}", output.display());
}
