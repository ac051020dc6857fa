//! The `quizflow validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizflow_core::quiz_file::{load_quiz_directory, load_quiz_file, validate_questions};

pub fn execute(path: PathBuf) -> Result<()> {
    let quizzes = if path.is_dir() {
        load_quiz_directory(&path)?
    } else {
        vec![load_quiz_file(&path)?]
    };

    let mut total_warnings = 0;

    for quiz in &quizzes {
        println!("Quiz: {} ({} questions)", quiz.name(), quiz.questions.len());

        let warnings = validate_questions(&quiz.questions);
        for w in &warnings {
            let prefix = w
                .question_index
                .map(|i| format!("  [Q{}]", i + 1))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quizzes valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
