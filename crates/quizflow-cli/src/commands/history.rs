//! The `quizflow history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizflow_client::{create_backend, load_config_from};
use quizflow_core::traits::{HistoryEntry, QuizBackend};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let backend = create_backend(&config)?;

    let entries = backend.history().await?;
    if entries.is_empty() {
        println!("No quiz history yet. Start one with `quizflow take`.");
        return Ok(());
    }

    println!("{}", history_table(&entries));
    Ok(())
}

fn history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Topic", "Status", "Score", "Progress", "Created"]);

    for e in entries {
        let status = if e.is_completed() {
            "completed"
        } else {
            "in progress"
        };
        let score = e
            .score
            .map(|s| format!("{s:.0}%"))
            .unwrap_or_else(|| "-".to_string());
        let progress = match (&e.questions, &e.user_answers) {
            (Some(q), Some(a)) => format!("{}/{}", a.answered_count().min(q.len()), q.len()),
            (Some(q), None) => format!("0/{}", q.len()),
            _ => "-".to_string(),
        };

        table.add_row(vec![
            Cell::new(&e.id),
            Cell::new(format!("{} / {}", e.domain, e.sub_domain)),
            Cell::new(status),
            Cell::new(score),
            Cell::new(progress),
            Cell::new(e.created_at.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_shows_status_and_progress() {
        let entries: Vec<HistoryEntry> = serde_json::from_value(serde_json::json!([
            {
                "id": 3,
                "domain": "Math",
                "sub_domain": "Primes",
                "completed": false,
                "questions": [
                    {"question": "a", "options": ["x"], "correct_answers": ["x"]},
                    {"question": "b", "options": ["x"], "correct_answers": ["x"]}
                ],
                "user_answers": [["x"], []]
            },
            {"id": 4, "domain": "Art", "sub_domain": "Cubism", "status": "completed", "score": 75.0}
        ]))
        .unwrap();

        let rendered = history_table(&entries).to_string();
        assert!(rendered.contains("Math / Primes"));
        assert!(rendered.contains("in progress"));
        assert!(rendered.contains("1/2"));
        assert!(rendered.contains("75%"));
    }
}
