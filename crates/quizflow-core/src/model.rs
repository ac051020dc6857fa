//! Core data model types for quizflow.
//!
//! Questions are decoded from the lenient wire shape ([`WireQuestion`]) into
//! the immutable [`Question`] used by the session engine. Answer selections
//! are sets of option strings; a session's answers are kept in a fixed-length
//! [`UserAnswers`] table where an empty selection means "unanswered".

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::answers::normalize;

// ---------------------------------------------------------------------------
// Remote identifiers
// ---------------------------------------------------------------------------

/// Identifier assigned by the backend to a quiz or a question.
///
/// The backend emits numeric ids, older payloads emit strings; both are
/// accepted and numeric ids are written back as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RemoteId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for RemoteId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<i64>() {
            Ok(n) => serializer.serialize_i64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Str(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => RemoteId::from(n),
            Raw::Str(s) => RemoteId(s),
        })
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// A question exactly as the backend sends it. Every field is optional so
/// that one malformed question can be reported instead of failing the whole
/// response.
///
/// Decoding never fails: an entry that does not have the expected shape
/// (for example numeric options) is kept with `decode_error` set and turns
/// into [`QuestionError::Malformed`] when converted to a [`Question`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WireQuestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RemoteId>,
    pub question: Option<String>,
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<Vec<String>>,
    /// Legacy single-answer field, used when `correct_answers` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_topic: Option<String>,
    #[serde(skip)]
    pub decode_error: Option<String>,
}

#[derive(Deserialize)]
#[serde(remote = "WireQuestion")]
struct WireQuestionDef {
    #[serde(default)]
    id: Option<RemoteId>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    correct_answers: Option<Vec<String>>,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    sub_topic: Option<String>,
    #[serde(skip)]
    decode_error: Option<String>,
}

impl<'de> Deserialize<'de> for WireQuestion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(
            WireQuestionDef::deserialize(value).unwrap_or_else(|e| WireQuestion {
                decode_error: Some(e.to_string()),
                ..Default::default()
            }),
        )
    }
}

/// Deserialize a field, reading an explicit `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Structural problems that make a wire question unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("question text is missing")]
    MissingPrompt,
    #[error("options array is missing")]
    MissingOptions,
    #[error("options array is empty")]
    NoOptions,
    #[error("malformed question: {0}")]
    Malformed(String),
}

/// Whether a question accepts one or several options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleSelect,
    MultiSelect,
}

impl QuestionKind {
    /// Derive the kind from the number of canonical correct answers.
    pub fn from_correct_count(count: usize) -> Self {
        if count > 1 {
            QuestionKind::MultiSelect
        } else {
            QuestionKind::SingleSelect
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleSelect => write!(f, "single correct"),
            QuestionKind::MultiSelect => write!(f, "multiple correct"),
        }
    }
}

/// An immutable quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireQuestion", into = "WireQuestion")]
pub struct Question {
    id: Option<RemoteId>,
    prompt: String,
    options: Vec<String>,
    correct_answers: Vec<String>,
    explanation: Option<String>,
    sub_topic: Option<String>,
    kind: QuestionKind,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answers: Vec<String>,
    ) -> Self {
        let kind = QuestionKind::from_correct_count(normalize(&correct_answers).len());
        Self {
            id: None,
            prompt: prompt.into(),
            options,
            correct_answers,
            explanation: None,
            sub_topic: None,
            kind,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn id(&self) -> Option<&RemoteId> {
        self.id.as_ref()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_answers(&self) -> &[String] {
        &self.correct_answers
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn sub_topic(&self) -> Option<&str> {
        self.sub_topic.as_deref()
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn is_multi_select(&self) -> bool {
        self.kind == QuestionKind::MultiSelect
    }

    /// Look up an option by its exact text.
    pub fn option(&self, text: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.as_str() == text)
            .map(String::as_str)
    }
}

impl TryFrom<WireQuestion> for Question {
    type Error = QuestionError;

    fn try_from(wire: WireQuestion) -> Result<Self, Self::Error> {
        if let Some(reason) = wire.decode_error {
            return Err(QuestionError::Malformed(reason));
        }
        let prompt = wire.question.ok_or(QuestionError::MissingPrompt)?;
        let options = wire.options.ok_or(QuestionError::MissingOptions)?;
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }

        let correct_answers = match wire.correct_answers {
            Some(answers) if !answers.is_empty() => answers,
            _ => wire.correct_answer.into_iter().collect(),
        };

        let mut question = Question::new(prompt, options, correct_answers);
        question.id = wire.id;
        question.explanation = wire.explanation;
        question.sub_topic = wire.sub_topic;
        Ok(question)
    }
}

impl From<Question> for WireQuestion {
    fn from(q: Question) -> Self {
        WireQuestion {
            id: q.id,
            question: Some(q.prompt),
            options: Some(q.options),
            correct_answers: Some(q.correct_answers),
            correct_answer: None,
            explanation: q.explanation,
            sub_topic: q.sub_topic,
            decode_error: None,
        }
    }
}

/// Decode a list of wire questions, stopping at the first malformed one.
pub fn decode_questions(wire: Vec<WireQuestion>) -> Result<Vec<Question>, (usize, QuestionError)> {
    wire.into_iter()
        .enumerate()
        .map(|(i, q)| Question::try_from(q).map_err(|e| (i, e)))
        .collect()
}

// ---------------------------------------------------------------------------
// Answer selections
// ---------------------------------------------------------------------------

/// The options a user picked for one question. Empty means unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSelection(BTreeSet<String>);

static UNANSWERED: AnswerSelection = AnswerSelection(BTreeSet::new());

impl AnswerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, option: &str) -> bool {
        self.0.contains(option)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Apply the toggle rule for the given question kind.
    ///
    /// Multi-select flips membership of `option`; single-select replaces the
    /// whole selection with `option`.
    pub fn toggle(&mut self, kind: QuestionKind, option: &str) {
        match kind {
            QuestionKind::MultiSelect => {
                if !self.0.remove(option) {
                    self.0.insert(option.to_string());
                }
            }
            QuestionKind::SingleSelect => {
                self.0.clear();
                self.0.insert(option.to_string());
            }
        }
    }

    /// Selected options in the order the question lists them, followed by
    /// any selected text that is not one of the question's options.
    pub fn ordered_by<'a>(&'a self, options: &'a [String]) -> Vec<&'a str> {
        let mut ordered: Vec<&str> = options
            .iter()
            .filter(|o| self.0.contains(o.as_str()))
            .map(String::as_str)
            .collect();
        ordered.extend(
            self.0
                .iter()
                .filter(|s| !options.iter().any(|o| o == *s))
                .map(String::as_str),
        );
        ordered
    }
}

impl<S: Into<String>> FromIterator<S> for AnswerSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One answer entry as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireAnswer {
    Many(Vec<String>),
    /// Legacy payloads store single-select answers as a bare string.
    One(String),
}

/// Per-question answers for a whole session, indexed by question position.
///
/// Serialized densely as `[[...], [], ...]`, the shape the progress and
/// completion endpoints expect. A `null` table decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Vec<Option<WireAnswer>>>")]
pub struct UserAnswers(Vec<AnswerSelection>);

impl UserAnswers {
    /// An answer table for `len` questions, all unanswered.
    pub fn with_len(len: usize) -> Self {
        Self(vec![AnswerSelection::default(); len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selection for question `index`; unanswered or out-of-range indices
    /// yield an empty selection.
    pub fn get(&self, index: usize) -> &AnswerSelection {
        self.0.get(index).unwrap_or(&UNANSWERED)
    }

    /// Mutable selection for question `index`, or `None` when out of range.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut AnswerSelection> {
        self.0.get_mut(index)
    }

    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|s| !s.is_empty()).count()
    }

    /// Resize to exactly `len` questions, dropping answers for indices past
    /// the end and padding with unanswered entries.
    pub fn fit(mut self, len: usize) -> Self {
        self.0.resize_with(len, AnswerSelection::default);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnswerSelection> {
        self.0.iter()
    }
}

impl From<Option<Vec<Option<WireAnswer>>>> for UserAnswers {
    fn from(wire: Option<Vec<Option<WireAnswer>>>) -> Self {
        Self(
            wire.unwrap_or_default()
                .into_iter()
                .map(|entry| match entry {
                    Some(WireAnswer::Many(items)) => items.into_iter().collect(),
                    Some(WireAnswer::One(item)) => std::iter::once(item).collect(),
                    None => AnswerSelection::default(),
                })
                .collect(),
        )
    }
}

impl FromIterator<AnswerSelection> for UserAnswers {
    fn from_iter<I: IntoIterator<Item = AnswerSelection>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Point-in-time projection of a session, sent to the progress store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub user_answers: UserAnswers,
    pub current_question_index: usize,
}
