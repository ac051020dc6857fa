//! The `quizflow review` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizflow_client::{create_backend, load_config_from};
use quizflow_core::model::RemoteId;
use quizflow_core::results::ResultsPayload;
use quizflow_core::traits::QuizBackend;
use quizflow_report::html::{generate_html, write_html_report};

pub async fn execute(
    file: Option<PathBuf>,
    quiz_id: Option<String>,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let results = match (file, quiz_id) {
        (Some(path), _) => ResultsPayload::load_json(&path)?,
        (None, Some(id)) => fetch_from_history(RemoteId::new(id), config_path).await?,
        (None, None) => anyhow::bail!("either --file or --quiz-id is required"),
    };

    let rendered = match format.as_str() {
        "text" => {
            let mut buf = Vec::new();
            write_text(&results, &mut buf)?;
            String::from_utf8(buf)?
        }
        "markdown" | "md" => results.to_markdown(),
        "html" => {
            if let Some(path) = &output {
                write_html_report(&results, path)?;
                eprintln!("HTML report: {}", path.display());
                return Ok(());
            }
            generate_html(&results)
        }
        other => anyhow::bail!("unknown format: {other} (expected text, markdown or html)"),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write review to {}", path.display()))?;
            eprintln!("Review written to: {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

async fn fetch_from_history(id: RemoteId, config_path: Option<PathBuf>) -> Result<ResultsPayload> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = create_backend(&config)?;

    let entry = backend
        .history()
        .await?
        .into_iter()
        .find(|e| e.id == id)
        .with_context(|| format!("quiz {id} not found in history"))?;

    entry
        .review()
        .with_context(|| format!("quiz {id} is not completed or has no stored answers"))
}

/// Per-question results table.
pub fn results_table(results: &ResultsPayload) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "Result"]);

    for graded in results.graded() {
        let q = &graded.question;
        let answer = graded.user_answer.ordered_by(q.options());
        let answer = if answer.is_empty() {
            "-".to_string()
        } else {
            answer.join(", ")
        };
        table.add_row(vec![
            Cell::new(graded.index + 1),
            Cell::new(q.prompt()),
            Cell::new(answer),
            Cell::new(q.correct_answers().join(", ")),
            Cell::new(graded.classification),
        ]);
    }

    table
}

/// Plain-text review: score line, results table and explanations.
pub fn write_text<W: Write>(results: &ResultsPayload, out: &mut W) -> Result<()> {
    let summary = results.summary();

    writeln!(out)?;
    writeln!(
        out,
        "Score: {:.0}% ({} of {} correct)",
        results.display_percentage(),
        summary.correct_count,
        summary.total_count
    )?;
    writeln!(out, "{}", results_table(results))?;

    let explained: Vec<_> = results
        .graded()
        .into_iter()
        .filter_map(|g| g.question.explanation().map(|e| (g.index, e.to_string())))
        .collect();
    if !explained.is_empty() {
        writeln!(out, "\nExplanations:")?;
        for (index, explanation) in explained {
            writeln!(out, "  {}. {explanation}", index + 1)?;
        }
    }

    Ok(())
}
