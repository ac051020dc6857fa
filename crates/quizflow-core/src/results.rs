//! Results payload handed to the review view, with JSON persistence and a
//! markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{decode_questions, Question, RemoteId, UserAnswers};
use crate::scoring::{grade, score, Classification, GradedQuestion, ScoreSummary};
use crate::traits::CompletionResponse;

/// Where a results payload was graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsSource {
    /// The backend accepted the completion and returned the permanent record.
    Server,
    /// Graded locally because the session was ephemeral or the handshake
    /// failed.
    Local,
}

/// Everything the review view needs for a finished quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPayload {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub quiz_id: Option<RemoteId>,
    pub source: ResultsSource,
    pub questions: Vec<Question>,
    pub user_answers: UserAnswers,
    /// Percentage score; authoritative when it came from the server.
    #[serde(default)]
    pub score: Option<f64>,
}

impl ResultsPayload {
    /// Build a payload from in-memory session state, graded locally.
    pub fn local(quiz_id: Option<RemoteId>, questions: Vec<Question>, answers: UserAnswers) -> Self {
        let user_answers = answers.fit(questions.len());
        let summary = score(&questions, &user_answers);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz_id,
            source: ResultsSource::Local,
            questions,
            user_answers,
            score: Some(f64::from(summary.percentage)),
        }
    }

    /// Build a payload from a completion response. Returns `None` when the
    /// response lacks questions or answers, or any question is malformed.
    pub fn from_server(quiz_id: Option<RemoteId>, response: CompletionResponse) -> Option<Self> {
        let wire_questions = response.questions?;
        let answers = response.user_answers?;
        let questions = match decode_questions(wire_questions) {
            Ok(questions) => questions,
            Err((index, err)) => {
                tracing::warn!("server returned malformed question {index}: {err}");
                return None;
            }
        };

        Some(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz_id,
            source: ResultsSource::Server,
            user_answers: answers.fit(questions.len()),
            questions,
            score: response.score,
        })
    }

    /// Locally computed score summary.
    pub fn summary(&self) -> ScoreSummary {
        score(&self.questions, &self.user_answers)
    }

    /// Per-question grading for review.
    pub fn graded(&self) -> Vec<GradedQuestion> {
        grade(&self.questions, &self.user_answers)
    }

    /// Percentage to display: the server's score when present, otherwise the
    /// local one.
    pub fn display_percentage(&self) -> f64 {
        self.score
            .unwrap_or_else(|| f64::from(self.summary().percentage))
    }

    /// Save the payload as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize results")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write results to {}", path.display()))?;
        Ok(())
    }

    /// Load a payload from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read results from {}", path.display()))?;
        let payload: ResultsPayload =
            serde_json::from_str(&content).context("failed to parse results JSON")?;
        Ok(payload)
    }

    /// Format the review as markdown.
    pub fn to_markdown(&self) -> String {
        let summary = self.summary();
        let mut md = String::new();

        md.push_str("## Quiz Results\n\n");
        md.push_str(&format!(
            "**Score:** {:.0}% ({} of {} correct)\n\n",
            self.display_percentage(),
            summary.correct_count,
            summary.total_count
        ));

        for graded in self.graded() {
            let q = &graded.question;
            md.push_str(&format!(
                "### Question {}: {}\n\n",
                graded.index + 1,
                q.prompt()
            ));

            let answer = graded.user_answer.ordered_by(q.options());
            let answer = if answer.is_empty() {
                "Not answered".to_string()
            } else {
                answer.join(", ")
            };
            md.push_str(&format!(
                "- Your answer: {answer} ({})\n",
                graded.classification
            ));

            if graded.classification != Classification::Correct {
                md.push_str(&format!(
                    "- Correct answer: {}\n",
                    q.correct_answers().join(", ")
                ));
            }
            md.push_str(&format!(
                "- Explanation: {}\n\n",
                q.explanation().unwrap_or("No explanation available.")
            ));
        }

        md
    }
}
