//! HTML report generation.
//!
//! Produces a single self-contained HTML document: inline styles, the theme
//! and insight sections for the result's mode, and the chart specs as inline
//! JSON. The only external reference is the charting library script.

use crate::analysis::FilteredView;
use crate::models::{AnalysisMode, AnalysisResult, Insight, Sentiment, Theme};
use crate::report::charts::{self, ChartSpec};
use chrono::{DateTime, Utc};
use std::borrow::Cow;

/// Default charting library, loaded from a CDN.
pub const DEFAULT_CHART_SCRIPT_URL: &str = "https://cdn.jsdelivr.net/npm/chart.js";

/// Presentation settings for the HTML report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentOptions {
    pub title: String,
    pub chart_script_url: String,
    pub footer: String,
    /// Shown in the metadata block when set.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            title: "Survey Analysis Report".to_string(),
            chart_script_url: DEFAULT_CHART_SCRIPT_URL.to_string(),
            footer: "Generated by ThemeScope".to_string(),
            generated_at: None,
        }
    }
}

/// Generate the HTML report with default options.
pub fn to_document(result: &AnalysisResult, view: &FilteredView) -> String {
    to_document_with(result, view, &DocumentOptions::default())
}

/// Generate the HTML report.
pub fn to_document_with(
    result: &AnalysisResult,
    view: &FilteredView,
    options: &DocumentOptions,
) -> String {
    let mode = result.analysis_mode;
    let mut output = String::new();

    output.push_str(&generate_head(options));
    output.push_str("<body>\n<div class=\"container\">\n");
    output.push_str(&format!(
        "<div class=\"header\"><h1>{}</h1></div>\n",
        escape_html(&options.title)
    ));

    output.push_str(&generate_metadata_section(result, view, options));

    if view.is_empty() {
        output.push_str(
            "<p class=\"empty-note\">No themes match the current filter criteria. Try lowering the threshold.</p>\n",
        );
    } else {
        output.push_str(&generate_charts_section(mode, view));
        if mode.shows_theme_table() {
            output.push_str(&generate_theme_table_section(mode, view));
        }
        if mode.shows_theme_cards() {
            output.push_str(&generate_theme_cards_section(view));
        }
    }

    output.push_str(&generate_insights_section(&result.insights));

    output.push_str(&format!(
        "<div class=\"footer\">{}</div>\n",
        escape_html(&options.footer)
    ));
    output.push_str("</div>\n");

    output.push_str(&generate_chart_scripts(&charts::document_charts(mode, view)));
    output.push_str("</body>\n</html>\n");

    output
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// Share of `part` in `total`, one decimal place.
fn percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", part as f64 / total as f64 * 100.0)
}

fn generate_head(options: &DocumentOptions) -> String {
    let mut head = String::new();

    head.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    head.push_str("<meta charset=\"UTF-8\">\n");
    head.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    head.push_str(&format!("<title>{}</title>\n", escape_html(&options.title)));
    head.push_str(&format!(
        "<script src=\"{}\"></script>\n",
        escape_html(&options.chart_script_url)
    ));
    head.push_str("<style>\n");
    head.push_str(STYLES);
    head.push_str("</style>\n</head>\n");

    head
}

fn generate_metadata_section(
    result: &AnalysisResult,
    view: &FilteredView,
    options: &DocumentOptions,
) -> String {
    let mut section = String::new();

    section.push_str("<div class=\"meta\">\n");
    if let Some(generated_at) = options.generated_at {
        section.push_str(&format!(
            "<div class=\"meta-item\"><span class=\"meta-label\">Date:</span> {}</div>\n",
            generated_at.format("%Y-%m-%d at %H:%M:%S UTC")
        ));
    }
    if let Some(question) = result.survey_question.as_deref() {
        section.push_str(&format!(
            "<div class=\"meta-item\"><span class=\"meta-label\">Question/Context:</span> {}</div>\n",
            escape_html(question)
        ));
    }
    section.push_str(&format!(
        "<div class=\"meta-item\"><span class=\"meta-label\">Total Comments:</span> {}</div>\n",
        view.grand_total
    ));
    section.push_str("</div>\n");

    section
}

fn generate_charts_section(mode: AnalysisMode, view: &FilteredView) -> String {
    let mut section = String::new();

    section.push_str("<h2>Visual Analysis</h2>\n<div class=\"charts-container\">\n");

    let bar_height = std::cmp::max(300, view.themes.len() * 40);
    section.push_str(&format!(
        "<div class=\"chart-box\"><h3>{}</h3><div style=\"height: {}px; position: relative;\"><canvas id=\"{}\"></canvas></div></div>\n",
        escape_html(mode.bar_chart_title()),
        bar_height,
        charts::THEMES_CANVAS
    ));

    if mode.shows_overall_sentiment() {
        section.push_str(&format!(
            "<div class=\"chart-box\"><h3>Overall Sentiment</h3><div style=\"height: 300px; position: relative;\"><canvas id=\"{}\"></canvas></div></div>\n",
            charts::OVERALL_CANVAS
        ));
    }

    section.push_str("</div>\n");

    section
}

fn generate_theme_table_section(mode: AnalysisMode, view: &FilteredView) -> String {
    let mut section = String::new();

    section.push_str(&format!("<h2>{}</h2>\n", escape_html(mode.section_title())));
    if view.min_total > 0 {
        section.push_str(&format!(
            "<div class=\"filter-note\">Filtered to show themes with {} or more comments.</div>\n",
            view.min_total
        ));
    }

    let with_breakdown = mode == AnalysisMode::Both;

    section.push_str("<table>\n<thead><tr><th>Theme</th>");
    if with_breakdown {
        for sentiment in Sentiment::ALL {
            section.push_str(&format!("<th class=\"num\">{}</th>", sentiment.label()));
        }
        section.push_str("<th class=\"num\">Total</th>");
    } else {
        section.push_str("<th class=\"num\">Count</th>");
    }
    section.push_str("</tr></thead>\n<tbody>\n");

    for theme in &view.themes {
        section.push_str(&format!("<tr><td>{}</td>", escape_html(&theme.name)));
        if with_breakdown {
            for sentiment in Sentiment::ALL {
                section.push_str(&format!(
                    "<td class=\"num {}\">{}</td>",
                    sentiment.css_class(),
                    theme.sentiment.get(sentiment)
                ));
            }
        }
        section.push_str(&format!(
            "<td class=\"num font-bold\">{}</td></tr>\n",
            mode.headline_count(theme)
        ));
    }
    section.push_str("</tbody>\n");

    let label_span = if with_breakdown { 5 } else { 1 };
    section.push_str(&format!(
        "<tfoot><tr><th colspan=\"{}\">Total (Visible)</th><td class=\"num font-bold\">{}</td></tr></tfoot>\n",
        label_span,
        view.visible_total()
    ));
    section.push_str("</table>\n");

    section
}

fn generate_theme_cards_section(view: &FilteredView) -> String {
    let mut section = String::new();

    section.push_str("<h2>Theme Details</h2>\n<div class=\"theme-cards\" id=\"theme-details\">\n");
    for (index, theme) in view.themes.iter().enumerate() {
        section.push_str(&generate_theme_card(index, theme));
    }
    section.push_str("</div>\n");

    section
}

/// Generate the detail card for one theme.
fn generate_theme_card(index: usize, theme: &Theme) -> String {
    let mut card = String::new();
    let total = theme.total();

    card.push_str("<div class=\"theme-card\">\n");
    card.push_str(&format!("<h3>{}</h3>\n", escape_html(&theme.name)));
    card.push_str(&format!(
        "<div style=\"height: 160px; position: relative;\"><canvas id=\"{}\"></canvas></div>\n",
        charts::card_canvas(index)
    ));

    card.push_str("<ul class=\"breakdown\">\n");
    for sentiment in Sentiment::ALL {
        let count = theme.sentiment.get(sentiment);
        card.push_str(&format!(
            "<li class=\"{}\">{}: {} ({})</li>\n",
            sentiment.css_class(),
            sentiment.label(),
            count,
            percent(count, total)
        ));
    }
    card.push_str("</ul>\n</div>\n");

    card
}

fn generate_insights_section(insights: &[Insight]) -> String {
    let mut section = String::new();

    section.push_str("<h2>Insights &amp; Recommendations</h2>\n<div class=\"insights-container\">\n");
    for insight in insights {
        section.push_str(&generate_insight_card(insight));
    }
    section.push_str("</div>\n");

    section
}

/// Generate a single insight card.
fn generate_insight_card(item: &Insight) -> String {
    let mut card = String::new();

    card.push_str("<div class=\"insight-card\">\n");
    if let Some(theme) = item.related_theme.as_deref() {
        card.push_str(&format!("<div class=\"theme-tag\">{}</div>\n", escape_html(theme)));
    }
    card.push_str("<div class=\"insight-title\">Insight</div>\n");
    card.push_str(&format!(
        "<div class=\"insight-text\">{}</div>\n",
        escape_html(&item.insight)
    ));
    card.push_str("<div class=\"recommendation-title\">Recommendation</div>\n");
    card.push_str(&format!(
        "<div class=\"recommendation-text\">{}</div>\n",
        escape_html(&item.recommendation)
    ));

    if !item.quotes.is_empty() {
        card.push_str("<div class=\"quotes-section\">\n<div class=\"quotes-title\">Voice of the Customer</div>\n<ul>\n");
        for quote in &item.quotes {
            card.push_str(&format!("<li>&quot;{}&quot;</li>\n", escape_html(quote)));
        }
        card.push_str("</ul>\n</div>\n");
    }

    card.push_str("</div>\n");

    card
}

/// Inline chart specs plus the loader that hands them to Chart.js.
fn generate_chart_scripts(specs: &[ChartSpec]) -> String {
    let json = serde_json::to_string(specs).unwrap_or_else(|_| "[]".to_string());

    let mut scripts = String::new();
    scripts.push_str("<script type=\"application/json\" id=\"chart-specs\">");
    scripts.push_str(&escape_inline_json(&json));
    scripts.push_str("</script>\n");
    scripts.push_str("<script>\n");
    scripts.push_str(CHART_LOADER);
    scripts.push_str("</script>\n");

    scripts
}

/// Make JSON safe to embed in a `<script>` element.
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\uXXXX` forms
/// parse back to the same text. No markup (`</script>`, `<!--`) can survive.
fn escape_inline_json(json: &str) -> String {
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            other => escaped.push(other),
        }
    }
    escaped
}

const CHART_LOADER: &str = r#"const specs = JSON.parse(document.getElementById('chart-specs').textContent);
for (const spec of specs) {
  const canvas = document.getElementById(spec.canvas);
  if (!canvas || typeof Chart === 'undefined') continue;
  const options = spec.options || {};
  if (spec.percentTooltips) {
    options.plugins = options.plugins || {};
    options.plugins.tooltip = {
      callbacks: {
        label: function (context) {
          const label = context.dataset.label || '';
          const value = context.parsed.x;
          let total = 0;
          for (const dataset of context.chart.data.datasets) {
            total += dataset.data[context.dataIndex];
          }
          const share = total > 0 ? ((value / total) * 100).toFixed(1) + '%' : '0%';
          return label + ': ' + value + ' (' + share + ')';
        }
      }
    };
  }
  new Chart(canvas, { type: spec.type, data: spec.data, options: options });
}
"#;

const STYLES: &str = r#"body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; color: #334155; max-width: 960px; margin: 0 auto; padding: 40px 20px; background-color: #f8fafc; }
.container { background-color: #ffffff; padding: 40px; border-radius: 8px; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); }
.header { border-bottom: 2px solid #e2e8f0; padding-bottom: 16px; margin-bottom: 24px; }
h1 { color: #0f172a; margin: 0; font-size: 2.2em; }
h2 { color: #1e293b; margin-top: 40px; margin-bottom: 20px; font-size: 1.5em; border-left: 4px solid #06b6d4; padding-left: 12px; }
.meta { margin-bottom: 32px; background-color: #f1f5f9; padding: 16px; border-radius: 6px; }
.meta-item { margin-bottom: 8px; }
.meta-label { font-weight: 600; color: #475569; width: 150px; display: inline-block; }
table { width: 100%; border-collapse: collapse; margin-top: 16px; font-size: 0.95em; }
th { background-color: #f8fafc; color: #475569; font-weight: 600; text-align: left; padding: 12px; border-bottom: 2px solid #e2e8f0; }
td { padding: 12px; border-bottom: 1px solid #e2e8f0; }
tfoot th, tfoot td { border-top: 2px solid #e2e8f0; border-bottom: none; }
.num { text-align: right; font-family: ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, monospace; }
.positive { color: #16a34a; }
.negative { color: #dc2626; }
.neutral { color: #64748b; }
.mixed { color: #ca8a04; }
.font-bold { font-weight: 700; }
.charts-container { display: flex; flex-direction: column; gap: 20px; margin-bottom: 30px; }
.chart-box { width: 100%; border: 1px solid #e2e8f0; border-radius: 8px; padding: 16px; box-sizing: border-box; }
.chart-box h3 { margin-top: 0; font-size: 1em; color: #475569; text-align: center; }
.theme-cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 20px; }
.theme-card { border: 1px solid #e2e8f0; border-radius: 8px; padding: 16px; }
.theme-card h3 { margin-top: 0; }
.breakdown { list-style: none; padding: 0; margin: 8px 0 0; font-size: 0.9em; }
.insight-card { border: 1px solid #e2e8f0; border-radius: 8px; padding: 20px; margin-bottom: 20px; }
.insight-title, .recommendation-title, .quotes-title { text-transform: uppercase; font-size: 0.75em; font-weight: 700; letter-spacing: 0.05em; margin-bottom: 4px; }
.insight-title { color: #06b6d4; }
.recommendation-title { color: #16a34a; }
.quotes-title { color: #64748b; }
.insight-text { font-size: 1.1em; font-weight: 600; color: #1e293b; margin-bottom: 16px; }
.recommendation-text { color: #475569; margin-bottom: 16px; }
.quotes-section { background-color: #f8fafc; border-left: 3px solid #cbd5e1; padding: 12px 16px; }
.quotes-section li { font-style: italic; font-size: 0.9em; }
.theme-tag { display: inline-block; background: #ecfeff; color: #0e7490; font-size: 0.75em; padding: 2px 8px; border-radius: 4px; font-weight: 600; margin-bottom: 8px; }
.filter-note, .empty-note { font-style: italic; font-size: 0.9em; color: #64748b; }
.footer { margin-top: 60px; text-align: center; font-size: 0.85em; color: #94a3b8; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::filter_and_rank;
    use crate::models::SentimentCounts;
    use chrono::TimeZone;

    fn fixture(json: &str) -> AnalysisResult {
        AnalysisResult::from_json(json).unwrap()
    }

    fn both() -> AnalysisResult {
        fixture(include_str!("../../fixtures/analysis_both.json"))
    }

    /// Extract the inline chart specs from a generated document.
    fn chart_specs(html: &str) -> serde_json::Value {
        let start_tag = "<script type=\"application/json\" id=\"chart-specs\">";
        let start = html.find(start_tag).unwrap() + start_tag.len();
        let end = start + html[start..].find("</script>").unwrap();
        serde_json::from_str(&html[start..end]).unwrap()
    }

    #[test]
    fn test_both_mode_document() {
        let result = both();
        let view = filter_and_rank(&result, 0);
        let html = to_document(&result, &view);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Survey Analysis Report</title>"));
        assert!(html.contains("<h2>Key Themes &amp; Sentiment</h2>"));
        assert!(html.contains("<th class=\"num\">Positive</th>"));
        assert!(html.contains("canvas id=\"overallChart\""));
        assert!(html.contains("class=\"theme-card\""));
        assert!(html.contains("<td>Pricing, Plans</td>"));
        assert!(html.contains("Total Comments:</span> 20"));
        assert!(html.contains("<li class=\"negative\">Negative: 8 (80.0%)</li>"));
        assert!(!html.contains("filter-note\">"));

        let specs = chart_specs(&html);
        // bar + donut + three cards
        assert_eq!(specs.as_array().unwrap().len(), 5);
        assert_eq!(specs[0]["type"], "bar");
        assert_eq!(specs[1]["type"], "doughnut");
    }

    #[test]
    fn test_theme_only_document_omits_donut_and_breakdown() {
        let result = fixture(include_str!("../../fixtures/analysis_theme_only.json"));
        let view = filter_and_rank(&result, 0);
        let html = to_document(&result, &view);

        assert!(html.contains("<h3>Themes Volume</h3>"));
        assert!(html.contains("<h2>Key Themes</h2>"));
        assert!(html.contains("<th class=\"num\">Count</th>"));
        assert!(html.contains("<tr><td>Checkout</td><td class=\"num font-bold\">14</td></tr>"));
        assert!(!html.contains("<th class=\"num\">Positive</th>"));
        assert!(!html.contains("<th class=\"num\">Negative</th>"));
        assert!(!html.contains("<th class=\"num\">Mixed</th>"));
        assert!(!html.contains("canvas id=\"overallChart\""));
        assert!(!html.contains("class=\"theme-card\""));

        let specs = chart_specs(&html);
        assert_eq!(specs.as_array().unwrap().len(), 1);
        assert_eq!(specs[0]["data"]["datasets"][0]["label"], "Count");
    }

    #[test]
    fn test_sentiment_only_document_omits_table_and_cards() {
        let result = fixture(include_str!("../../fixtures/analysis_sentiment_only.json"));
        let view = filter_and_rank(&result, 0);
        let html = to_document(&result, &view);

        assert!(html.contains("<h3>Sentiment</h3>"));
        assert!(html.contains("canvas id=\"overallChart\""));
        assert!(!html.contains("<table>"));
        assert!(!html.contains("class=\"theme-card\""));
        assert!(!html.contains("id=\"theme-details\""));

        let specs = chart_specs(&html);
        assert_eq!(specs.as_array().unwrap().len(), 2);
        assert_eq!(specs[0]["data"]["labels"][0], "Positive Feedback");
    }

    #[test]
    fn test_filter_note_and_visible_total() {
        let result = both();
        let view = filter_and_rank(&result, 3);
        let html = to_document(&result, &view);

        assert!(html.contains("Filtered to show themes with 3 or more comments."));
        assert!(html.contains("Total (Visible)</th><td class=\"num font-bold\">18</td>"));
        assert!(!html.contains("<td>Pricing, Plans</td>"));
        assert!(html.contains("Total Comments:</span> 20"));
    }

    #[test]
    fn test_empty_view_shows_placeholder() {
        let result = both();
        let view = filter_and_rank(&result, 100);
        let html = to_document(&result, &view);

        assert!(html.contains("No themes match the current filter criteria."));
        assert!(!html.contains("<table>"));
        assert_eq!(chart_specs(&html), serde_json::json!([]));
        // Insights are independent of the theme filter.
        assert!(html.contains("Slow ticket replies"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let result = AnalysisResult {
            survey_question: Some("<b>Rate us</b> & \"why\"".to_string()),
            themes: vec![Theme::new(
                "</script><script>alert(1)</script>",
                SentimentCounts::new(1, 0, 0, 0),
            )],
            insights: vec![Insight {
                insight: "Tom's <i>favourite</i>".to_string(),
                recommendation: "Keep it".to_string(),
                quotes: vec!["a < b".to_string()],
                related_theme: None,
            }],
            ..Default::default()
        };
        let view = filter_and_rank(&result, 0);
        let html = to_document(&result, &view);

        assert!(html.contains("&lt;b&gt;Rate us&lt;/b&gt; &amp; &quot;why&quot;"));
        assert!(html.contains("Tom&#39;s &lt;i&gt;favourite&lt;/i&gt;"));
        assert!(html.contains("<li>&quot;a &lt; b&quot;</li>"));
        assert!(!html.contains("</script><script>alert(1)"));

        let specs = chart_specs(&html);
        assert_eq!(
            specs[0]["data"]["labels"][0],
            "</script><script>alert(1)</script>"
        );
    }

    #[test]
    fn test_comment_opener_in_theme_name_stays_inert() {
        let result = AnalysisResult {
            themes: vec![Theme::new("<!--<script>", SentimentCounts::new(2, 0, 1, 0))],
            ..Default::default()
        };
        let view = filter_and_rank(&result, 0);
        let html = to_document(&result, &view);

        let start = html.find("id=\"chart-specs\">").unwrap();
        let payload = &html[start..];
        let payload = &payload[..payload.find("</script>").unwrap()];
        assert!(!payload.contains("<!--"));
        assert!(!payload.contains("<script"));
        assert!(html.contains("const specs = JSON.parse"));

        let specs = chart_specs(&html);
        assert_eq!(specs[0]["data"]["labels"][0], "<!--<script>");
    }

    #[test]
    fn test_escape_inline_json() {
        assert_eq!(
            escape_inline_json(r#"{"a":"</script> & <b>"}"#),
            r#"{"a":"\u003c/script\u003e \u0026 \u003cb\u003e"}"#
        );
    }

    #[test]
    fn test_options_are_applied() {
        let result = both();
        let view = filter_and_rank(&result, 0);
        let options = DocumentOptions {
            title: "Q3 Pulse".to_string(),
            chart_script_url: "https://cdn.example/chart.umd.js".to_string(),
            footer: "Internal use only".to_string(),
            generated_at: Some(Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap()),
        };
        let html = to_document_with(&result, &view, &options);

        assert!(html.contains("<title>Q3 Pulse</title>"));
        assert!(html.contains("<script src=\"https://cdn.example/chart.umd.js\"></script>"));
        assert!(html.contains("Internal use only"));
        assert!(html.contains("2026-10-18 at 09:30:00 UTC"));
        assert_eq!(html.matches("<script src=").count(), 1);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 8), "12.5%");
        assert_eq!(percent(0, 0), "0%");
    }

    #[test]
    fn test_escape_html_borrows_plain_text() {
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }
}
