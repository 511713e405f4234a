//! Delimited-text (CSV) exports.

use crate::analysis::FilteredView;
use crate::models::{AnalysisMode, AnalysisResult, Insight, Sentiment};
use std::borrow::Cow;

/// Quote a field when it contains a comma, a double quote or a newline.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Append one escaped row.
fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let row: Vec<Cow<'_, str>> = fields.iter().map(|f| escape_field(f.as_ref())).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Summary CSV: optional question, the theme table for the mode, the grand
/// total and the insights table.
pub fn to_delimited_text(result: &AnalysisResult, view: &FilteredView) -> String {
    let mut output = String::new();

    if let Some(question) = result.survey_question.as_deref() {
        push_row(&mut output, &["Survey Question", question]);
        output.push('\n');
    }

    output.push_str(&theme_section(result.analysis_mode, view));

    output.push('\n');
    push_row(
        &mut output,
        &[
            "Overall Total Comments Analyzed".to_string(),
            view.grand_total.to_string(),
        ],
    );
    output.push('\n');

    output.push_str(&insights_section(&result.insights));

    output
}

/// Theme table, with columns chosen by the analysis mode.
fn theme_section(mode: AnalysisMode, view: &FilteredView) -> String {
    let mut section = String::new();

    match mode {
        AnalysisMode::ThemeOnly => {
            push_row(&mut section, &["Themes Volume"]);
            push_row(&mut section, &["Theme", "Total Count"]);
            for theme in &view.themes {
                push_row(
                    &mut section,
                    &[theme.name.clone(), mode.headline_count(theme).to_string()],
                );
            }
        }
        AnalysisMode::SentimentOnly => {
            push_row(&mut section, &["Sentiment Distribution"]);
            push_row(&mut section, &["Sentiment", "Count"]);
            for theme in &view.themes {
                push_row(
                    &mut section,
                    &[theme.name.clone(), mode.headline_count(theme).to_string()],
                );
            }
        }
        AnalysisMode::Both => {
            push_row(&mut section, &["Themes & Sentiment"]);
            let mut headers = vec!["Theme"];
            headers.extend(Sentiment::ALL.iter().map(Sentiment::label));
            headers.push("Total");
            push_row(&mut section, &headers);

            for theme in &view.themes {
                let mut row = vec![theme.name.clone()];
                row.extend(
                    Sentiment::ALL
                        .iter()
                        .map(|s| theme.sentiment.get(*s).to_string()),
                );
                row.push(theme.total().to_string());
                push_row(&mut section, &row);
            }
        }
    }

    section
}

fn insights_section(insights: &[Insight]) -> String {
    let mut section = String::new();

    push_row(&mut section, &["Actionable Insights & Recommendations"]);
    push_row(
        &mut section,
        &["Insight", "Category/Theme", "Recommendation", "Evidence/Quotes"],
    );

    for item in insights {
        let quotes = item.quotes.join("; ");
        push_row(
            &mut section,
            &[
                item.insight.as_str(),
                item.related_theme.as_deref().unwrap_or(""),
                item.recommendation.as_str(),
                quotes.as_str(),
            ],
        );
    }

    section
}

/// One row per categorized comment, or `None` when the result has no
/// per-comment labels.
pub fn to_detail_text(result: &AnalysisResult) -> Option<String> {
    let comments = result.comments.as_deref()?;
    let mut output = String::new();

    match result.analysis_mode {
        AnalysisMode::ThemeOnly => {
            push_row(&mut output, &["Comment", "Theme"]);
            for c in comments {
                push_row(&mut output, &[c.text.as_str(), c.theme.as_str()]);
            }
        }
        AnalysisMode::SentimentOnly => {
            push_row(&mut output, &["Comment", "Sentiment"]);
            for c in comments {
                push_row(&mut output, &[c.text.clone(), c.sentiment.to_string()]);
            }
        }
        AnalysisMode::Both => {
            push_row(&mut output, &["Comment", "Theme", "Sentiment"]);
            for c in comments {
                push_row(
                    &mut output,
                    &[c.text.clone(), c.theme.clone(), c.sentiment.to_string()],
                );
            }
        }
    }

    Some(output)
}
