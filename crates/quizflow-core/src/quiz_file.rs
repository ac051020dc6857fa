//! Local quiz files.
//!
//! A quiz file is JSON: either a bare array of questions or an object with a
//! `questions` array and an optional `title`. Sessions started from a file
//! have no remote id and never synchronize.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::answers::normalize;
use crate::model::{null_as_default, WireQuestion};
use crate::session::SessionSeed;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuizFileRepr {
    Bare(Vec<WireQuestion>),
    Object {
        #[serde(default)]
        title: Option<String>,
        #[serde(deserialize_with = "null_as_default")]
        questions: Vec<WireQuestion>,
    },
}

/// A quiz loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalQuiz {
    pub title: Option<String>,
    pub questions: Vec<WireQuestion>,
    pub source: PathBuf,
}

impl From<LocalQuiz> for SessionSeed {
    fn from(quiz: LocalQuiz) -> Self {
        SessionSeed {
            questions: quiz.questions,
            ..Default::default()
        }
    }
}

/// Load a quiz file from disk.
pub fn load_quiz_file(path: &Path) -> Result<LocalQuiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse quiz JSON (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<LocalQuiz> {
    let parsed: QuizFileRepr = serde_json::from_str(content)
        .with_context(|| format!("failed to parse quiz JSON: {}", source_path.display()))?;

    let (title, questions) = match parsed {
        QuizFileRepr::Bare(questions) => (None, questions),
        QuizFileRepr::Object { title, questions } => (title, questions),
    };

    Ok(LocalQuiz {
        title,
        questions,
        source: source_path.to_path_buf(),
    })
}

/// Recursively load all `.json` quiz files from a directory. Files that fail
/// to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<LocalQuiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "json") {
            match load_quiz_file(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

impl LocalQuiz {
    /// Title, falling back to the file stem.
    pub fn name(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            self.source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "quiz".to_string())
        })
    }
}

/// A warning from quiz validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Zero-based question index, if the warning concerns one question.
    pub question_index: Option<usize>,
    pub message: String,
}

impl ValidationWarning {
    fn at(index: usize, message: impl Into<String>) -> Self {
        Self {
            question_index: Some(index),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.question_index {
            Some(i) => write!(f, "question {}: {}", i + 1, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Check questions for problems that would make a quiz unplayable or
/// impossible to score correctly.
pub fn validate_questions(questions: &[WireQuestion]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if questions.is_empty() {
        warnings.push(ValidationWarning {
            question_index: None,
            message: "quiz has no questions".into(),
        });
    }

    for (i, q) in questions.iter().enumerate() {
        if let Some(reason) = &q.decode_error {
            warnings.push(ValidationWarning::at(i, format!("malformed question: {reason}")));
            continue;
        }
        if q.question.as_deref().is_none_or(|p| p.trim().is_empty()) {
            warnings.push(ValidationWarning::at(i, "prompt is empty"));
        }

        let options = q.options.as_deref().unwrap_or_default();
        if options.is_empty() {
            warnings.push(ValidationWarning::at(i, "no options"));
        }

        let mut seen = HashSet::new();
        for option in options {
            if !seen.insert(option.trim().to_lowercase()) {
                warnings.push(ValidationWarning::at(i, format!("duplicate option: {option}")));
            }
        }

        let correct: Vec<&str> = match (&q.correct_answers, &q.correct_answer) {
            (Some(many), _) => many.iter().map(String::as_str).collect(),
            (None, Some(one)) => vec![one.as_str()],
            (None, None) => Vec::new(),
        };
        if correct.is_empty() {
            warnings.push(ValidationWarning::at(
                i,
                "no correct answers; the question can never be answered correctly",
            ));
        }

        let known = normalize(options);
        for answer in correct {
            if !known.contains(&answer.trim().to_lowercase()) {
                warnings.push(ValidationWarning::at(
                    i,
                    format!("correct answer '{answer}' is not among the options"),
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT_FILE: &str = r#"{
        "title": "Geography",
        "questions": [
            {
                "question": "Capital of France?",
                "options": ["Paris", "Rome", "Oslo"],
                "correct_answers": ["Paris"],
                "explanation": "Paris has been the capital since 987."
            },
            {
                "question": "Which are in Scandinavia?",
                "options": ["Norway", "Sweden", "Spain"],
                "correct_answers": ["Norway", "Sweden"]
            }
        ]
    }"#;

    #[test]
    fn parse_object_file() {
        let quiz = parse_quiz_str(OBJECT_FILE, Path::new("geo.json")).unwrap();
        assert_eq!(quiz.title.as_deref(), Some("Geography"));
        assert_eq!(quiz.questions.len(), 2);
        assert!(validate_questions(&quiz.questions).is_empty());
    }

    #[test]
    fn parse_bare_array_with_legacy_answer() {
        let json = r#"[{"question": "2+2?", "options": ["3", "4"], "correct_answer": "4"}]"#;
        let quiz = parse_quiz_str(json, Path::new("math.json")).unwrap();
        assert!(quiz.title.is_none());
        assert_eq!(quiz.questions[0].correct_answer.as_deref(), Some("4"));
        assert!(validate_questions(&quiz.questions).is_empty());

        let seed = SessionSeed::from(quiz);
        assert!(seed.quiz_id.is_none());
        assert_eq!(seed.questions.len(), 1);
    }

    #[test]
    fn parse_malformed_json() {
        let result = parse_quiz_str("{ not json", Path::new("bad.json"));
        let err = format!("{:#}", result.unwrap_err());
        assert!(err.contains("bad.json"));
    }

    #[test]
    fn validate_flags_problems() {
        let json = r#"[
            {"question": " ", "options": ["A", "a", "B"], "correct_answers": ["C"]},
            {"question": "No answers", "options": ["X"]}
        ]"#;
        let quiz = parse_quiz_str(json, Path::new("q.json")).unwrap();
        let warnings = validate_questions(&quiz.questions);

        let messages: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        assert!(messages.iter().any(|m| m == "question 1: prompt is empty"));
        assert!(messages.iter().any(|m| m.contains("duplicate option: a")));
        assert!(messages.iter().any(|m| m.contains("'C' is not among the options")));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("question 2: no correct answers")));
    }

    #[test]
    fn malformed_entry_is_reported_not_fatal() {
        let json = r#"{"title": null, "questions": [
            {"question": "Pick", "options": ["A", "B"], "correct_answers": ["A"]},
            {"question": "Numbers", "options": [1, 2], "correct_answers": ["1"]}
        ]}"#;
        let quiz = parse_quiz_str(json, Path::new("mixed.json")).unwrap();
        assert_eq!(quiz.questions.len(), 2);

        let warnings = validate_questions(&quiz.questions);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].question_index, Some(1));
        assert!(warnings[0].message.starts_with("malformed question"));
    }

    #[test]
    fn validate_empty_quiz() {
        let warnings = validate_questions(&[]);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_index.is_none());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), OBJECT_FILE).unwrap();
        std::fs::write(dir.path().join("b.json"), "not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/c.json"), "[]").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 2);
        assert_eq!(quizzes[0].name(), "Geography");
        assert_eq!(quizzes[1].name(), "c");
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.json");
        std::fs::write(&path, OBJECT_FILE).unwrap();

        let quiz = load_quiz_file(&path).unwrap();
        assert_eq!(quiz.source, path);
        assert!(load_quiz_file(&dir.path().join("missing.json")).is_err());
    }
}
