//! CLI integration tests using assert_cmd.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn quizflow(home: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizflow").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("QUIZFLOW_BASE_URL")
        .env_remove("QUIZFLOW_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

fn quiz_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../quizzes")
        .join(name)
}

#[test]
fn validate_quiz_file() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("validate")
        .arg("--file")
        .arg(quiz_path("geography.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("World Geography (3 questions)"))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("validate")
        .arg("--file")
        .arg(quiz_path(""))
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz: arithmetic (2 questions)"))
        .stdout(predicate::str::contains("World Geography"));
}

#[test]
fn validate_reports_warnings() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.json");
    std::fs::write(
        &path,
        r#"[{"question": "Pick one", "options": ["A", "B"], "correct_answers": ["C"]}]"#,
    )
    .unwrap();

    quizflow(&home)
        .arg("validate")
        .arg("--file")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[Q1] WARNING: correct answer 'C'"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_nonexistent_file() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("validate")
        .arg("--file")
        .arg("nonexistent.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn take_local_quiz_and_review_saved_results() {
    let home = TempDir::new().unwrap();
    let results_path = home.path().join("results.json");

    quizflow(&home)
        .arg("take")
        .arg("--file")
        .arg(quiz_path("geography.json"))
        .arg("--save")
        .arg(&results_path)
        .write_stdin("1\nn\n1\n2\n4\nn\n3\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 3 of 3"))
        .stdout(predicate::str::contains("Score: 100% (3 of 3 correct)"));

    assert!(results_path.exists());

    quizflow(&home)
        .arg("review")
        .arg("--file")
        .arg(&results_path)
        .arg("--format")
        .arg("markdown")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Score:** 100% (3 of 3 correct)"));

    let html_path = home.path().join("review.html");
    quizflow(&home)
        .arg("review")
        .arg("--file")
        .arg(&results_path)
        .arg("--format")
        .arg("html")
        .arg("--output")
        .arg(&html_path)
        .assert()
        .success();
    let html = std::fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("badge excellent"));
}

#[test]
fn take_local_quiz_blocks_and_quits() {
    let home = TempDir::new().unwrap();

    quizflow(&home)
        .arg("take")
        .arg("--file")
        .arg(quiz_path("arithmetic.json"))
        .write_stdin("n\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Select an answer before continuing."))
        .stdout(predicate::str::contains("Quiz left unfinished."))
        .stdout(predicate::str::contains("--resume-id").not());
}

#[test]
fn take_empty_quiz_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("empty.json");
    std::fs::write(&path, "[]").unwrap();

    quizflow(&home)
        .arg("take")
        .arg("--file")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no questions available"));
}

#[test]
fn take_rejects_too_many_questions() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("take")
        .arg("--domain")
        .arg("Math")
        .arg("--sub-domain")
        .arg("Primes")
        .arg("--count")
        .arg("21")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "number of questions must be between 1 and 20",
        ));
}

#[test]
fn review_unknown_format() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("results.json");

    quizflow(&home)
        .arg("take")
        .arg("--file")
        .arg(quiz_path("arithmetic.json"))
        .arg("--save")
        .arg(&path)
        .write_stdin("2\nn\n1\nn\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 50% (1 of 2 correct)"));

    quizflow(&home)
        .arg("review")
        .arg("--file")
        .arg(&path)
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format: pdf"));
}

#[test]
fn init_creates_files() {
    let home = TempDir::new().unwrap();

    quizflow(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizflow.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.json"));

    assert!(home.path().join("quizflow.toml").exists());

    // The generated example quiz is itself valid.
    quizflow(&home)
        .arg("validate")
        .arg("--file")
        .arg("quizzes/example.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn init_skips_existing() {
    let home = TempDir::new().unwrap();

    quizflow(&home).arg("init").assert().success();

    quizflow(&home)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Interactive quiz sessions with autosave"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    quizflow(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizflow"));
}
