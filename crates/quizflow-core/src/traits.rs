//! The backend contract consumed by the session engine.
//!
//! [`QuizBackend`] is implemented over HTTP by `quizflow-client` and in
//! memory by [`crate::mock::MockBackend`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::BackendError;
use crate::model::{null_as_default, ProgressSnapshot, RemoteId, UserAnswers, WireQuestion};
use crate::results::ResultsPayload;

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Remote quiz store: generation, resume, autosave, completion and history.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// Generate a fresh quiz.
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, BackendError>;

    /// Fetch a saved, in-progress quiz.
    async fn resume(&self, request: &ResumeRequest) -> Result<ResumedQuiz, BackendError>;

    /// Overwrite the stored progress for a quiz. The response body is ignored.
    async fn save_progress(
        &self,
        quiz_id: &RemoteId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), BackendError>;

    /// Mark a quiz as complete with its final answers.
    async fn mark_complete(
        &self,
        quiz_id: &RemoteId,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError>;

    /// List the user's past and in-progress quizzes.
    async fn history(&self) -> Result<Vec<HistoryEntry>, BackendError>;
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Maximum number of questions a single generation request may ask for.
pub const MAX_QUESTIONS: u32 = 20;

/// Maximum length of the domain and sub-domain fields.
pub const MAX_TOPIC_LEN: usize = 100;

/// Difficulty level of a generated quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Easy => write!(f, "easy"),
            Level::Medium => write!(f, "medium"),
            Level::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Level::Easy),
            "medium" => Ok(Level::Medium),
            "hard" => Ok(Level::Hard),
            other => Err(format!("unknown level: {other} (expected easy, medium or hard)")),
        }
    }
}

/// Invalid generation parameters, reported before any session exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("number of questions must be between 1 and {max}, got {requested}")]
    QuestionCount { requested: u32, max: u32 },
}

/// Request to generate a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub domain: String,
    pub sub_domain: String,
    pub number_of_questions: u32,
    pub level: Level,
}

impl GenerateRequest {
    /// Check the request against the limits the backend enforces.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("domain", &self.domain), ("sub_domain", &self.sub_domain)] {
            if value.trim().is_empty() {
                return Err(ValidationError::Missing(field));
            }
            if value.chars().count() > MAX_TOPIC_LEN {
                return Err(ValidationError::TooLong {
                    field,
                    max: MAX_TOPIC_LEN,
                });
            }
        }
        if !(1..=MAX_QUESTIONS).contains(&self.number_of_questions) {
            return Err(ValidationError::QuestionCount {
                requested: self.number_of_questions,
                max: MAX_QUESTIONS,
            });
        }
        Ok(())
    }
}

/// A freshly generated quiz.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedQuiz {
    /// Absent when the backend did not persist the quiz.
    pub quiz_id: Option<RemoteId>,
    pub questions: Vec<WireQuestion>,
}

impl GeneratedQuiz {
    /// Decode a generation response.
    ///
    /// Accepts a bare question array, or an object carrying the questions
    /// under `questions`, `question_list` or `questions_list` and the id
    /// under `quiz_id` or `id`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, BackendError> {
        match value {
            serde_json::Value::Array(items) => Ok(Self {
                quiz_id: None,
                questions: decode_wire_questions(items)?,
            }),
            serde_json::Value::Object(mut map) => {
                let questions = ["questions", "question_list", "questions_list"]
                    .iter()
                    .find_map(|key| map.remove(*key))
                    .unwrap_or(serde_json::Value::Array(Vec::new()));
                let questions = match questions {
                    serde_json::Value::Array(items) => decode_wire_questions(items)?,
                    serde_json::Value::Null => Vec::new(),
                    other => {
                        return Err(BackendError::Malformed(format!(
                            "expected a question array, got {other}"
                        )))
                    }
                };

                let quiz_id = ["quiz_id", "id"]
                    .iter()
                    .filter_map(|key| map.remove(*key))
                    .find(|v| !v.is_null())
                    .map(serde_json::from_value::<RemoteId>)
                    .transpose()
                    .map_err(|e| BackendError::Malformed(format!("invalid quiz id: {e}")))?;

                Ok(Self { quiz_id, questions })
            }
            other => Err(BackendError::Malformed(format!(
                "unexpected generation response: {other}"
            ))),
        }
    }
}

fn decode_wire_questions(items: Vec<serde_json::Value>) -> Result<Vec<WireQuestion>, BackendError> {
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item)
                .map_err(|e| BackendError::Malformed(format!("invalid question: {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Resume
// ---------------------------------------------------------------------------

/// Which saved quiz to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResumeRequest {
    ByQuiz { quiz_id: RemoteId },
    ByTopic { domain: String, sub_domain: String },
}

/// A saved quiz returned by the resume endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResumedQuiz {
    #[serde(default, alias = "id")]
    pub quiz_id: Option<RemoteId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<WireQuestion>,
    /// Raw index as stored; clamped when the session starts.
    #[serde(default)]
    pub current_question_index: Option<i64>,
    #[serde(default)]
    pub user_answers: UserAnswers,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Body of the mark-complete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionRequest {
    pub user_answers: UserAnswers,
}

/// Body of the mark-complete response. Every field is optional; a response
/// missing questions or answers is treated as a failed handshake.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub questions: Option<Vec<WireQuestion>>,
    #[serde(default)]
    pub user_answers: Option<UserAnswers>,
    #[serde(default)]
    pub score: Option<f64>,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// One entry of the user's quiz history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryEntry {
    pub id: RemoteId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_domain: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub questions: Option<Vec<WireQuestion>>,
    #[serde(default)]
    pub user_answers: Option<UserAnswers>,
    #[serde(default)]
    pub current_question_index: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl HistoryEntry {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
            || self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("completed"))
    }

    /// Request that resumes this quiz.
    pub fn resume_request(&self) -> ResumeRequest {
        ResumeRequest::ByQuiz {
            quiz_id: self.id.clone(),
        }
    }

    /// Review payload for a completed entry that carries its questions and
    /// answers.
    pub fn review(&self) -> Option<ResultsPayload> {
        if !self.is_completed() {
            return None;
        }
        ResultsPayload::from_server(
            Some(self.id.clone()),
            CompletionResponse {
                questions: self.questions.clone(),
                user_answers: self.user_answers.clone(),
                score: self.score,
            },
        )
    }
}
