//! Quiz session state machine.
//!
//! A [`QuizSession`] owns question navigation and answer selection for one
//! attempt. Every answer toggle and every navigation step schedules a
//! debounced autosave; reaching the end of the quiz moves the session into
//! [`SessionState::Finishing`], from which [`QuizSession::complete`] runs the
//! completion handshake exactly once.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::completion;
use crate::model::{
    decode_questions, AnswerSelection, ProgressSnapshot, Question, QuestionError, RemoteId,
    UserAnswers, WireQuestion,
};
use crate::results::ResultsPayload;
use crate::scoring::{grade, score, GradedQuestion, ScoreSummary};
use crate::sync::{ProgressSynchronizer, RemoteLink, DEFAULT_DEBOUNCE};
use crate::traits::{GeneratedQuiz, QuizBackend, ResumedQuiz};

/// Configuration for a quiz session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet interval before progress is pushed.
    pub autosave_debounce: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_debounce: DEFAULT_DEBOUNCE,
        }
    }
}

/// Why a session could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The quiz has no questions.
    NoQuestions,
    /// A question could not be decoded.
    MalformedQuestion { index: usize, reason: QuestionError },
}

impl std::fmt::Display for Unavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unavailable::NoQuestions => write!(f, "no questions available"),
            Unavailable::MalformedQuestion { index, reason } => {
                write!(f, "question {} is malformed: {reason}", index + 1)
            }
        }
    }
}

/// Where the session currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Showing question `i`.
    Answering(usize),
    /// The last question was confirmed; waiting for [`QuizSession::complete`].
    Finishing,
    /// Results were handed off. Terminal.
    Completed,
    /// The quiz data was unusable. Terminal.
    Unavailable(Unavailable),
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Now showing this question.
    Moved(usize),
    /// The current question is unanswered; forward navigation refused.
    Blocked,
    /// Entered [`SessionState::Finishing`].
    Finishing,
    /// Nothing to do (first question, or not answering).
    Stayed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the session is not on a question")]
    NotAnswering,
    #[error("'{0}' is not an option of the current question")]
    UnknownOption(String),
    #[error("option {} is out of range (question has {len} options)", .position + 1)]
    OptionOutOfRange { position: usize, len: usize },
    #[error("the quiz is not ready to be completed")]
    NotFinishing,
    #[error("the quiz has already been completed")]
    AlreadyCompleted,
}

/// Everything needed to start a session, fresh or resumed.
#[derive(Debug, Clone, Default)]
pub struct SessionSeed {
    pub quiz_id: Option<RemoteId>,
    pub questions: Vec<WireQuestion>,
    pub current_question_index: Option<i64>,
    pub user_answers: UserAnswers,
}

impl From<GeneratedQuiz> for SessionSeed {
    fn from(quiz: GeneratedQuiz) -> Self {
        Self {
            quiz_id: quiz.quiz_id,
            questions: quiz.questions,
            current_question_index: None,
            user_answers: UserAnswers::default(),
        }
    }
}

impl From<ResumedQuiz> for SessionSeed {
    fn from(quiz: ResumedQuiz) -> Self {
        Self {
            quiz_id: quiz.quiz_id,
            questions: quiz.questions,
            current_question_index: quiz.current_question_index,
            user_answers: quiz.user_answers,
        }
    }
}

/// Clamp a stored question index into `[0, len - 1]`.
fn clamp_index(raw: Option<i64>, len: usize) -> usize {
    let last = len.saturating_sub(1);
    match raw {
        Some(i) if i > 0 => usize::try_from(i).map_or(last, |i| i.min(last)),
        _ => 0,
    }
}

/// One user's attempt at a quiz.
#[derive(Debug)]
pub struct QuizSession {
    quiz_id: Option<RemoteId>,
    questions: Vec<Question>,
    answers: UserAnswers,
    state: SessionState,
    remote: Option<RemoteLink>,
    sync: ProgressSynchronizer,
}

impl QuizSession {
    /// Start a session. Autosave and the completion handshake are enabled
    /// only when both a backend and a quiz id are present.
    pub fn start(
        seed: SessionSeed,
        backend: Option<Arc<dyn QuizBackend>>,
        config: &SessionConfig,
    ) -> Self {
        let remote = match (backend, seed.quiz_id.clone()) {
            (Some(backend), Some(quiz_id)) => Some(RemoteLink::new(backend, quiz_id)),
            _ => None,
        };
        let sync = ProgressSynchronizer::new(remote.clone(), config.autosave_debounce);

        let (questions, state) = match decode_questions(seed.questions) {
            Ok(questions) if questions.is_empty() => {
                (questions, SessionState::Unavailable(Unavailable::NoQuestions))
            }
            Ok(questions) => {
                let index = clamp_index(seed.current_question_index, questions.len());
                (questions, SessionState::Answering(index))
            }
            Err((index, reason)) => (
                Vec::new(),
                SessionState::Unavailable(Unavailable::MalformedQuestion { index, reason }),
            ),
        };

        let answers = seed.user_answers.fit(questions.len());
        debug!(
            quiz_id = ?seed.quiz_id,
            questions = questions.len(),
            answered = answers.answered_count(),
            "session started in state {state:?}"
        );

        Self {
            quiz_id: seed.quiz_id,
            questions,
            answers,
            state,
            remote,
            sync,
        }
    }

    /// Start a local-only session with no backend.
    pub fn local(questions: Vec<WireQuestion>) -> Self {
        let seed = SessionSeed {
            questions,
            ..Default::default()
        };
        Self::start(seed, None, &SessionConfig::default())
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn quiz_id(&self) -> Option<&RemoteId> {
        self.quiz_id.as_ref()
    }

    /// True when progress is synchronized with a backend.
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &UserAnswers {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the question being shown, if any.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Answering(i) => Some(i),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.questions.get(i))
    }

    pub fn current_selection(&self) -> Option<&AnswerSelection> {
        self.current_index().map(|i| self.answers.get(i))
    }

    /// Toggle `option` on the current question.
    pub fn select_answer(&mut self, option: &str) -> Result<&AnswerSelection, SessionError> {
        let index = self.current_index().ok_or(SessionError::NotAnswering)?;
        let question = &self.questions[index];
        if question.option(option).is_none() {
            return Err(SessionError::UnknownOption(option.to_string()));
        }
        let kind = question.kind();

        self.answers
            .get_mut(index)
            .ok_or(SessionError::NotAnswering)?
            .toggle(kind, option);
        self.schedule_sync();
        Ok(self.answers.get(index))
    }

    /// Toggle the option at zero-based `position` on the current question.
    pub fn select_option(&mut self, position: usize) -> Result<&AnswerSelection, SessionError> {
        let question = self.current_question().ok_or(SessionError::NotAnswering)?;
        let option = question
            .options()
            .get(position)
            .cloned()
            .ok_or(SessionError::OptionOutOfRange {
                position,
                len: question.options().len(),
            })?;
        self.select_answer(&option)
    }

    /// Move forward. Refused while the current question is unanswered; from
    /// the last question this enters [`SessionState::Finishing`].
    pub fn next(&mut self) -> Transition {
        let Some(index) = self.current_index() else {
            return Transition::Stayed;
        };
        if self.answers.get(index).is_empty() {
            return Transition::Blocked;
        }

        let transition = if index + 1 < self.questions.len() {
            self.state = SessionState::Answering(index + 1);
            Transition::Moved(index + 1)
        } else {
            self.state = SessionState::Finishing;
            Transition::Finishing
        };
        self.schedule_sync();
        transition
    }

    /// Move back one question. Never blocked by answer state.
    pub fn previous(&mut self) -> Transition {
        match self.current_index() {
            Some(index) if index > 0 => {
                self.state = SessionState::Answering(index - 1);
                self.schedule_sync();
                Transition::Moved(index - 1)
            }
            _ => Transition::Stayed,
        }
    }

    /// Current progress as sent to the backend.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let current_question_index = match self.state {
            SessionState::Answering(i) => i,
            _ => self.questions.len().saturating_sub(1),
        };
        ProgressSnapshot {
            user_answers: self.answers.clone(),
            current_question_index,
        }
    }

    pub fn score(&self) -> ScoreSummary {
        score(&self.questions, &self.answers)
    }

    pub fn graded(&self) -> Vec<GradedQuestion> {
        grade(&self.questions, &self.answers)
    }

    /// Run the completion handshake and hand off the results.
    ///
    /// Only valid in [`SessionState::Finishing`]; afterwards the session is
    /// [`SessionState::Completed`] and accepts no further changes.
    pub async fn complete(&mut self) -> Result<ResultsPayload, SessionError> {
        match self.state {
            SessionState::Finishing => {}
            SessionState::Completed => return Err(SessionError::AlreadyCompleted),
            _ => return Err(SessionError::NotFinishing),
        }

        // The completion request carries the full answer table, so a later
        // autosave would only overwrite the completed record.
        self.sync.cancel();
        let payload =
            completion::finish(self.remote.as_ref(), &self.questions, &self.answers).await;
        self.state = SessionState::Completed;
        Ok(payload)
    }

    /// Discard the session, cancelling any scheduled autosave.
    pub fn abandon(mut self) {
        self.sync.cancel();
        debug!(quiz_id = ?self.quiz_id, "session abandoned");
    }

    fn schedule_sync(&mut self) {
        if self.sync.is_enabled() {
            let snapshot = self.snapshot();
            self.sync.schedule(snapshot);
        }
    }
}
