//! HTML review page generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizflow_core::results::{ResultsPayload, ResultsSource};
use quizflow_core::scoring::{Classification, GradedQuestion};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Score band used for the badge colour.
pub fn score_band(percentage: f64) -> &'static str {
    if percentage >= 80.0 {
        "excellent"
    } else if percentage >= 60.0 {
        "good"
    } else {
        "poor"
    }
}

/// Generate the HTML review page for a finished quiz.
pub fn generate_html(results: &ResultsPayload) -> String {
    let summary = results.summary();
    let percentage = results.display_percentage();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Quiz Results</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Quiz Results</h1>\n");
    let quiz = match &results.quiz_id {
        Some(id) => format!("Quiz <strong>{}</strong>", html_escape(id.as_str())),
        None => "Local quiz".to_string(),
    };
    let source = match results.source {
        ResultsSource::Server => "graded by server",
        ResultsSource::Local => "graded locally",
    };
    html.push_str(&format!(
        "<p class=\"meta\">{quiz} | {source} | {}</p>\n",
        results.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score badge
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<div class=\"badge {}\"><span class=\"pct\">{:.0}%</span><span class=\"count\">{} of {} correct</span></div>\n",
        score_band(percentage),
        percentage,
        summary.correct_count,
        summary.total_count
    ));
    html.push_str("</section>\n");

    // Per-question review
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Review</h2>\n");
    for graded in results.graded() {
        html.push_str(&question_card(&graded));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(results).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn question_card(graded: &GradedQuestion) -> String {
    let q = &graded.question;
    let class = match graded.classification {
        Classification::Correct => "correct",
        Classification::Partial => "partial",
        Classification::Incorrect => "incorrect",
        Classification::Unanswered => "unanswered",
    };

    let mut card = format!("<article class=\"question {class}\">\n");
    card.push_str(&format!(
        "<h3>Question {}: {}</h3>\n",
        graded.index + 1,
        html_escape(q.prompt())
    ));
    card.push_str(&format!("<p class=\"status\">{}</p>\n", graded.classification));

    card.push_str("<ul class=\"options\">\n");
    for option in q.options() {
        let picked = graded.user_answer.contains(option);
        let right = q.correct_answers().iter().any(|c| c == option);
        let mut classes = Vec::new();
        if picked {
            classes.push("picked");
        }
        if right && graded.classification != Classification::Correct {
            classes.push("answer");
        }
        card.push_str(&format!(
            "<li class=\"{}\">{}</li>\n",
            classes.join(" "),
            html_escape(option)
        ));
    }
    card.push_str("</ul>\n");

    if graded.classification != Classification::Correct {
        card.push_str(&format!(
            "<p class=\"correct-answer\">Correct answer: {}</p>\n",
            html_escape(&q.correct_answers().join(", "))
        ));
    }
    card.push_str(&format!(
        "<p class=\"explanation\">{}</p>\n",
        html_escape(q.explanation().unwrap_or("No explanation available."))
    ));
    card.push_str("</article>\n");
    card
}

/// Write the HTML review page to a file.
pub fn write_html_report(results: &ResultsPayload, path: &Path) -> Result<()> {
    let html = generate_html(results);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --warn: #fef9c3; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --warn: #713f12; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 900px; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.badge { display: inline-flex; flex-direction: column; align-items: center; padding: 1.5rem 2.5rem; border-radius: 12px; }
.badge .pct { font-size: 2.5rem; font-weight: bold; }
.badge.excellent { background: var(--pass); }
.badge.good { background: var(--warn); }
.badge.poor { background: var(--fail); }
.question { border: 1px solid var(--border); border-left-width: 6px; border-radius: 8px; padding: 0.5rem 1.5rem; margin: 1rem 0; }
.question.correct { border-left-color: #22c55e; }
.question.partial { border-left-color: #eab308; }
.question.incorrect, .question.unanswered { border-left-color: #ef4444; }
.status { text-transform: capitalize; font-weight: bold; }
.options li.picked { font-weight: bold; }
.options li.answer { text-decoration: underline; }
.explanation { color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
