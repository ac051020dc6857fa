//! The `quizflow init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizflow.toml
    if Path::new("quizflow.toml").exists() {
        println!("quizflow.toml already exists, skipping.");
    } else {
        std::fs::write("quizflow.toml", SAMPLE_CONFIG)?;
        println!("Created quizflow.toml");
    }

    // Create example quiz
    std::fs::create_dir_all("quizzes")?;
    let example_path = Path::new("quizzes/example.json");
    if example_path.exists() {
        println!("quizzes/example.json already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizflow.toml with your backend URL and token");
    println!("  2. Run: quizflow take --file quizzes/example.json");
    println!("  3. Run: quizflow take --domain Science --sub-domain Astronomy");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizflow configuration

base_url = "http://localhost:8000"
token = "${QUIZFLOW_TOKEN}"
timeout_secs = 60

# Quiet interval before progress is saved
autosave_debounce_ms = 700

default_level = "medium"
default_questions = 5
"#;

const EXAMPLE_QUIZ: &str = r#"{
  "title": "Example Quiz",
  "questions": [
    {
      "question": "Which planet is closest to the Sun?",
      "options": ["Venus", "Mercury", "Mars", "Earth"],
      "correct_answers": ["Mercury"],
      "explanation": "Mercury orbits at about 0.39 AU from the Sun."
    },
    {
      "question": "Which of these are gas giants?",
      "options": ["Jupiter", "Mars", "Saturn", "Venus"],
      "correct_answers": ["Jupiter", "Saturn"],
      "explanation": "Jupiter and Saturn are composed mostly of hydrogen and helium."
    },
    {
      "question": "How many moons does Earth have?",
      "options": ["0", "1", "2"],
      "correct_answers": ["1"]
    }
  ]
}
"#;
