//! Data models for survey analysis results.
//!
//! These types mirror the JSON shape produced by the upstream classification
//! service and carried inside share tokens, so field names on the wire are
//! camelCase and the theme name is serialized as `theme`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;

/// One of the four sentiment buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

impl Sentiment {
    /// All buckets in column order (Positive, Neutral, Negative, Mixed).
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
        Sentiment::Mixed,
    ];

    /// Capitalized label used for column headers and chart legends.
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
            Sentiment::Mixed => "Mixed",
        }
    }

    /// Chart color for this bucket.
    pub fn color(&self) -> &'static str {
        match self {
            Sentiment::Positive => "#22c55e",
            Sentiment::Neutral => "#64748b",
            Sentiment::Negative => "#ef4444",
            Sentiment::Mixed => "#eab308",
        }
    }

    /// CSS class used for this bucket in the HTML report.
    pub fn css_class(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Wire value, as written in per-comment exports.
        f.write_str(self.css_class())
    }
}

/// Per-bucket comment counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
    pub mixed: u64,
}

impl SentimentCounts {
    pub fn new(positive: u64, neutral: u64, negative: u64, mixed: u64) -> Self {
        Self {
            positive,
            neutral,
            negative,
            mixed,
        }
    }

    /// Sum of all four buckets, saturating at `u64::MAX`.
    ///
    /// Counts may come from an untrusted share link.
    pub fn total(&self) -> u64 {
        self.positive
            .saturating_add(self.neutral)
            .saturating_add(self.negative)
            .saturating_add(self.mixed)
    }

    pub fn get(&self, sentiment: Sentiment) -> u64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
            Sentiment::Mixed => self.mixed,
        }
    }

    fn get_mut(&mut self, sentiment: Sentiment) -> &mut u64 {
        match sentiment {
            Sentiment::Positive => &mut self.positive,
            Sentiment::Neutral => &mut self.neutral,
            Sentiment::Negative => &mut self.negative,
            Sentiment::Mixed => &mut self.mixed,
        }
    }

    /// Count one more comment in the given bucket.
    pub fn record(&mut self, sentiment: Sentiment) {
        let count = self.get_mut(sentiment);
        *count = count.saturating_add(1);
    }
}

impl AddAssign<&SentimentCounts> for SentimentCounts {
    fn add_assign(&mut self, other: &SentimentCounts) {
        self.positive = self.positive.saturating_add(other.positive);
        self.neutral = self.neutral.saturating_add(other.neutral);
        self.negative = self.negative.saturating_add(other.negative);
        self.mixed = self.mixed.saturating_add(other.mixed);
    }
}

impl<'a> Sum<&'a SentimentCounts> for SentimentCounts {
    fn sum<I: Iterator<Item = &'a SentimentCounts>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, counts| {
            acc += counts;
            acc
        })
    }
}

/// A named cluster of comments with its sentiment breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme name (a sentiment bucket label in sentiment-only results).
    #[serde(rename = "theme")]
    pub name: String,
    pub sentiment: SentimentCounts,
}

impl Theme {
    pub fn new(name: impl Into<String>, sentiment: SentimentCounts) -> Self {
        Self {
            name: name.into(),
            sentiment,
        }
    }

    /// Total comments in this theme; the ranking key.
    pub fn total(&self) -> u64 {
        self.sentiment.total()
    }
}

/// An actionable finding with supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub insight: String,
    pub recommendation: String,
    /// Verbatim quotes backing the insight.
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_theme: Option<String>,
}

/// A single input comment with its assigned labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedComment {
    pub text: String,
    pub theme: String,
    pub sentiment: Sentiment,
}

/// Which dimensions of the result carry meaning.
///
/// Theme-only results store each theme's total in `neutral`; sentiment-only
/// results use the four bucket names as theme names. Call sites should go
/// through the accessors here rather than reading those fields directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisMode {
    /// Themes with a full sentiment breakdown.
    #[default]
    Both,
    /// Themes with volume only.
    ThemeOnly,
    /// Four synthetic themes, one per sentiment bucket.
    SentimentOnly,
}

impl AnalysisMode {
    /// The count that matters for a theme in this mode.
    pub fn headline_count(&self, theme: &Theme) -> u64 {
        match self {
            AnalysisMode::ThemeOnly => theme.sentiment.neutral,
            AnalysisMode::Both | AnalysisMode::SentimentOnly => theme.total(),
        }
    }

    /// Heading for the themes section.
    pub fn section_title(&self) -> &'static str {
        match self {
            AnalysisMode::Both => "Key Themes & Sentiment",
            AnalysisMode::ThemeOnly => "Key Themes",
            AnalysisMode::SentimentOnly => "Sentiment",
        }
    }

    /// Heading for the theme bar chart.
    pub fn bar_chart_title(&self) -> &'static str {
        match self {
            AnalysisMode::Both => "Themes Sentiment Breakdown",
            AnalysisMode::ThemeOnly => "Themes Volume",
            AnalysisMode::SentimentOnly => "Sentiment",
        }
    }

    /// Whether the overall sentiment donut is meaningful.
    pub fn shows_overall_sentiment(&self) -> bool {
        !matches!(self, AnalysisMode::ThemeOnly)
    }

    /// Whether a per-theme table is rendered.
    pub fn shows_theme_table(&self) -> bool {
        !matches!(self, AnalysisMode::SentimentOnly)
    }

    /// Whether per-theme detail cards are rendered.
    pub fn shows_theme_cards(&self) -> bool {
        matches!(self, AnalysisMode::Both)
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Both => write!(f, "both"),
            AnalysisMode::ThemeOnly => write!(f, "theme-only"),
            AnalysisMode::SentimentOnly => write!(f, "sentiment-only"),
        }
    }
}

/// The complete output of one classification run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Question or topic the comments answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_question: Option<String>,
    pub themes: Vec<Theme>,
    pub insights: Vec<Insight>,
    /// Per-comment labels, absent in older results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CategorizedComment>>,
    /// Defaults to `both` when absent, for results stored before modes existed.
    #[serde(rename = "analysisType", alias = "analysisMode", default)]
    pub analysis_mode: AnalysisMode,
}

impl AnalysisResult {
    /// Parse a result from upstream JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::MalformedResult)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::MalformedResult)
    }

    /// Per-comment labels, or an empty slice when absent.
    pub fn comments(&self) -> &[CategorizedComment] {
        self.comments.as_deref().unwrap_or_default()
    }
}

/// A disagreement between theme tallies and per-comment labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// The comments labelled with a theme do not add up to its tallies.
    CountMismatch {
        theme: String,
        tallied: SentimentCounts,
        labelled: SentimentCounts,
    },
    /// Comments reference a theme that is not in the theme list.
    UnknownTheme { theme: String, comments: u64 },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::CountMismatch {
                theme,
                tallied,
                labelled,
            } => write!(
                f,
                "theme '{}' tallies {}/{}/{}/{} but comments give {}/{}/{}/{} (positive/neutral/negative/mixed)",
                theme,
                tallied.positive,
                tallied.neutral,
                tallied.negative,
                tallied.mixed,
                labelled.positive,
                labelled.neutral,
                labelled.negative,
                labelled.mixed
            ),
            Inconsistency::UnknownTheme { theme, comments } => write!(
                f,
                "{} comment(s) reference unknown theme '{}'",
                comments, theme
            ),
        }
    }
}
