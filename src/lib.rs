//! ThemeScope - survey analysis results, shareable and exportable.
//!
//! Takes the structured output of a survey-comment classification run
//! (themes with sentiment tallies, insights, optional per-comment labels)
//! and derives everything a reader needs from it:
//!
//! - [`analysis`]: threshold-filtered, ranked views of the themes
//! - [`share`]: compact URL-safe share tokens and links
//! - [`report`]: CSV, HTML and JSON exports

pub mod analysis;
pub mod error;
pub mod models;
pub mod report;
pub mod share;

pub use analysis::{filter_and_rank, FilteredView};
pub use error::{Error, Result};
pub use models::{AnalysisMode, AnalysisResult, Insight, Sentiment, SentimentCounts, Theme};
