//! Declarative chart specifications.
//!
//! Specs follow the Chart.js configuration shape (`type`, `data.labels`,
//! `data.datasets[]`, `options`) so a report can hand them straight to the
//! charting library without any application code.

use crate::analysis::FilteredView;
use crate::models::{AnalysisMode, Sentiment, SentimentCounts, Theme};
use serde::Serialize;
use serde_json::{json, Value};

/// Color of the single volume series in theme-only charts.
pub const TOTAL_COLOR: &str = "#06b6d4";

/// Canvas id of the theme bar chart.
pub const THEMES_CANVAS: &str = "themesChart";

/// Canvas id of the overall sentiment donut.
pub const OVERALL_CANVAS: &str = "overallChart";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Doughnut,
}

/// Fill color for a dataset, either one color or one per data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Fill {
    Single(String),
    PerPoint(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<u64>,
    pub background_color: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// One chart, bound to a canvas element in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    /// Id of the `<canvas>` the chart renders into.
    pub canvas: String,
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: Value,
    /// Ask the renderer to show each value's share of its stack in tooltips.
    pub percent_tooltips: bool,
}

/// Horizontal bar chart of the visible themes.
///
/// Theme-only results get one volume series; the other modes get four
/// stacked sentiment series.
pub fn theme_bar_chart(mode: AnalysisMode, view: &FilteredView) -> ChartSpec {
    let labels = view.themes.iter().map(|t| t.name.clone()).collect();

    let (datasets, stacked) = match mode {
        AnalysisMode::ThemeOnly => (
            vec![Dataset {
                label: Some("Count".to_string()),
                data: view.themes.iter().map(|t| mode.headline_count(t)).collect(),
                background_color: Fill::Single(TOTAL_COLOR.to_string()),
                border_width: None,
            }],
            false,
        ),
        AnalysisMode::Both | AnalysisMode::SentimentOnly => (
            Sentiment::ALL
                .iter()
                .map(|sentiment| Dataset {
                    label: Some(sentiment.label().to_string()),
                    data: view.themes.iter().map(|t| t.sentiment.get(*sentiment)).collect(),
                    background_color: Fill::Single(sentiment.color().to_string()),
                    border_width: None,
                })
                .collect(),
            true,
        ),
    };

    ChartSpec {
        canvas: THEMES_CANVAS.to_string(),
        kind: ChartKind::Bar,
        data: ChartData { labels, datasets },
        options: json!({
            "indexAxis": "y",
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": {
                "x": { "stacked": stacked },
                "y": { "stacked": stacked }
            },
            "plugins": {
                "legend": { "position": "bottom", "display": stacked }
            }
        }),
        percent_tooltips: stacked,
    }
}

/// Donut of overall sentiment; zero-valued buckets are left out.
pub fn overall_donut(counts: &SentimentCounts) -> ChartSpec {
    let buckets: Vec<Sentiment> = Sentiment::ALL
        .into_iter()
        .filter(|sentiment| counts.get(*sentiment) > 0)
        .collect();

    ChartSpec {
        canvas: OVERALL_CANVAS.to_string(),
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: buckets.iter().map(|s| s.label().to_string()).collect(),
            datasets: vec![Dataset {
                label: None,
                data: buckets.iter().map(|s| counts.get(*s)).collect(),
                background_color: Fill::PerPoint(
                    buckets.iter().map(|s| s.color().to_string()).collect(),
                ),
                border_width: Some(0),
            }],
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "position": "bottom" } }
        }),
        percent_tooltips: false,
    }
}

/// Small per-theme bar chart used on a detail card.
pub fn theme_detail_chart(canvas: impl Into<String>, theme: &Theme) -> ChartSpec {
    // Card order puts negative next to positive.
    let order = [
        Sentiment::Positive,
        Sentiment::Negative,
        Sentiment::Neutral,
        Sentiment::Mixed,
    ];

    ChartSpec {
        canvas: canvas.into(),
        kind: ChartKind::Bar,
        data: ChartData {
            labels: order.iter().map(|s| s.label().to_string()).collect(),
            datasets: vec![Dataset {
                label: Some(theme.name.clone()),
                data: order.iter().map(|s| theme.sentiment.get(*s)).collect(),
                background_color: Fill::PerPoint(
                    order.iter().map(|s| s.color().to_string()).collect(),
                ),
                border_width: None,
            }],
        },
        options: json!({
            "indexAxis": "y",
            "responsive": true,
            "maintainAspectRatio": false,
            "scales": { "x": { "display": false } },
            "plugins": { "legend": { "display": false } }
        }),
        percent_tooltips: false,
    }
}

/// Canvas id for the detail card at `index`.
pub fn card_canvas(index: usize) -> String {
    format!("themeCard{}", index)
}

/// Every chart the document renders for this mode and view.
pub fn document_charts(mode: AnalysisMode, view: &FilteredView) -> Vec<ChartSpec> {
    if view.is_empty() {
        return Vec::new();
    }

    let mut charts = vec![theme_bar_chart(mode, view)];

    if mode.shows_overall_sentiment() {
        charts.push(overall_donut(&view.overall_sentiment));
    }

    if mode.shows_theme_cards() {
        charts.extend(
            view.themes
                .iter()
                .enumerate()
                .map(|(i, theme)| theme_detail_chart(card_canvas(i), theme)),
        );
    }

    charts
}
