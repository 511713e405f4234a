//! Theme filtering, ranking and sentiment aggregation.
//!
//! Everything here is a pure function of its inputs; the view is rebuilt on
//! every threshold change rather than patched.

use crate::models::{
    AnalysisMode, AnalysisResult, CategorizedComment, Inconsistency, SentimentCounts, Theme,
};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Themes meeting a threshold, ranked by total, with recomputed aggregates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredView {
    /// Visible themes, largest total first.
    pub themes: Vec<Theme>,
    /// Componentwise sum over the visible themes only.
    pub overall_sentiment: SentimentCounts,
    /// Sum over every theme in the result, visible or not.
    pub grand_total: u64,
    /// Threshold the view was built with.
    pub min_total: u64,
}

impl FilteredView {
    /// Total comments across the visible themes.
    pub fn visible_total(&self) -> u64 {
        self.overall_sentiment.total()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// Keep themes whose total is at least `min_total` and rank them.
///
/// Ties keep the order of `result.themes`. `grand_total` ignores the filter so
/// it can serve as a stable denominator for percentages.
pub fn filter_and_rank(result: &AnalysisResult, min_total: u64) -> FilteredView {
    let mut themes: Vec<Theme> = result
        .themes
        .iter()
        .filter(|theme| theme.total() >= min_total)
        .cloned()
        .collect();

    // sort_by_key is stable
    themes.sort_by_key(|theme| std::cmp::Reverse(theme.total()));

    let overall_sentiment = overall_sentiment(&themes);
    let grand_total = grand_total(&result.themes);

    debug!(
        "Filtered {} of {} themes at min_total={}",
        themes.len(),
        result.themes.len(),
        min_total
    );

    FilteredView {
        themes,
        overall_sentiment,
        grand_total,
        min_total,
    }
}

/// Componentwise sum of the given themes' counts.
pub fn overall_sentiment(themes: &[Theme]) -> SentimentCounts {
    themes.iter().map(|theme| &theme.sentiment).sum()
}

/// Sum of every theme's total, saturating at `u64::MAX`.
pub fn grand_total(themes: &[Theme]) -> u64 {
    themes
        .iter()
        .map(Theme::total)
        .fold(0, u64::saturating_add)
}

/// Tally per-comment labels by theme name.
pub fn group_by_theme(comments: &[CategorizedComment]) -> BTreeMap<String, SentimentCounts> {
    let mut grouped: BTreeMap<String, SentimentCounts> = BTreeMap::new();

    for comment in comments {
        grouped
            .entry(comment.theme.clone())
            .or_default()
            .record(comment.sentiment);
    }

    grouped
}

/// Compare theme tallies with per-comment labels.
///
/// Only `both` results carry independent tallies, and only results with
/// comments can be checked; anything else yields no findings.
pub fn check_consistency(result: &AnalysisResult) -> Vec<Inconsistency> {
    if result.analysis_mode != AnalysisMode::Both {
        return Vec::new();
    }
    let Some(comments) = result.comments.as_deref() else {
        return Vec::new();
    };

    let mut labelled = group_by_theme(comments);
    let mut findings = Vec::new();

    for theme in &result.themes {
        let from_comments = labelled.remove(&theme.name).unwrap_or_default();
        if from_comments != theme.sentiment {
            findings.push(Inconsistency::CountMismatch {
                theme: theme.name.clone(),
                tallied: theme.sentiment,
                labelled: from_comments,
            });
        }
    }

    for (theme, counts) in labelled {
        findings.push(Inconsistency::UnknownTheme {
            theme,
            comments: counts.total(),
        });
    }

    findings
}
