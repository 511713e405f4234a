//! Report exporters.
//!
//! Turns an analysis result and its filtered view into downloadable
//! artifacts: summary and detail CSV, a standalone HTML document, or
//! pretty-printed JSON.

pub mod charts;
pub mod csv;
pub mod generator;

pub use csv::{to_delimited_text, to_detail_text};
pub use generator::{to_document, to_document_with, DocumentOptions};

use crate::error::{Error, Result};
use crate::models::AnalysisResult;
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Suggested file name for the summary CSV.
pub const SUMMARY_CSV_FILE: &str = "survey_analysis_results.csv";

/// Suggested file name for the per-comment CSV.
pub const DETAIL_CSV_FILE: &str = "survey_comment_details.csv";

/// Suggested file name for the JSON export.
pub const JSON_FILE: &str = "survey_analysis_results.json";

/// Suggested file name for the HTML report generated on `date`.
pub fn document_file_name(date: NaiveDate) -> String {
    format!("survey-analysis-report-{}.html", date.format("%Y-%m-%d"))
}

/// Pretty-printed JSON of the full result, loadable again as input.
pub fn to_json_export(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(Error::MalformedResult)
}

/// Write an artifact to disk.
pub fn write_artifact(path: &Path, content: &str) -> Result<()> {
    let to_failure = |source| Error::ExportWriteFailure {
        path: path.to_path_buf(),
        source,
    };

    let mut file = std::fs::File::create(path).map_err(to_failure)?;
    file.write_all(content.as_bytes()).map_err(to_failure)?;

    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
