//! In-memory backend for testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::model::{ProgressSnapshot, RemoteId};
use crate::traits::{
    CompletionRequest, CompletionResponse, GenerateRequest, GeneratedQuiz, HistoryEntry,
    QuizBackend, ResumeRequest, ResumedQuiz,
};

/// A mock quiz backend that records every call.
///
/// Generation and resume return canned quizzes; mark-complete either echoes
/// a canned response or fails with HTTP 500 when none is configured.
#[derive(Default)]
pub struct MockBackend {
    generated: Mutex<Option<GeneratedQuiz>>,
    resumed: Mutex<Option<ResumedQuiz>>,
    resume_requests: Mutex<Vec<ResumeRequest>>,
    completion: Mutex<Option<CompletionResponse>>,
    history: Mutex<Vec<HistoryEntry>>,
    fail_saves: AtomicBool,
    save_attempts: AtomicU32,
    saved: Mutex<Vec<(RemoteId, ProgressSnapshot)>>,
    completions: Mutex<Vec<(RemoteId, CompletionRequest)>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_generated(self, quiz: GeneratedQuiz) -> Self {
        *self.generated.lock().unwrap() = Some(quiz);
        self
    }

    pub fn with_resumed(self, quiz: ResumedQuiz) -> Self {
        *self.resumed.lock().unwrap() = Some(quiz);
        self
    }

    pub fn with_completion(self, response: CompletionResponse) -> Self {
        *self.completion.lock().unwrap() = Some(response);
        self
    }

    pub fn with_history(self, entries: Vec<HistoryEntry>) -> Self {
        *self.history.lock().unwrap() = entries;
        self
    }

    /// Make every save-progress call fail with a network error.
    pub fn failing_saves(self) -> Self {
        self.fail_saves.store(true, Ordering::Relaxed);
        self
    }

    /// Number of save-progress calls, successful or not.
    pub fn save_attempts(&self) -> u32 {
        self.save_attempts.load(Ordering::Relaxed)
    }

    /// Snapshots that were saved successfully, in arrival order.
    pub fn saved_snapshots(&self) -> Vec<(RemoteId, ProgressSnapshot)> {
        self.saved.lock().unwrap().clone()
    }

    /// Resume requests received, in arrival order.
    pub fn resume_requests(&self) -> Vec<ResumeRequest> {
        self.resume_requests.lock().unwrap().clone()
    }

    /// Mark-complete requests received, in arrival order.
    pub fn completions(&self) -> Vec<(RemoteId, CompletionRequest)> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizBackend for MockBackend {
    async fn generate(&self, _request: &GenerateRequest) -> Result<GeneratedQuiz, BackendError> {
        self.generated
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::ApiError {
                status: 500,
                message: "no generated quiz configured".into(),
            })
    }

    async fn resume(&self, request: &ResumeRequest) -> Result<ResumedQuiz, BackendError> {
        self.resume_requests.lock().unwrap().push(request.clone());
        self.resumed
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::NotFound(format!("{request:?}")))
    }

    async fn save_progress(
        &self,
        quiz_id: &RemoteId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), BackendError> {
        self.save_attempts.fetch_add(1, Ordering::Relaxed);
        if self.fail_saves.load(Ordering::Relaxed) {
            return Err(BackendError::NetworkError("connection reset".into()));
        }
        self.saved
            .lock()
            .unwrap()
            .push((quiz_id.clone(), snapshot.clone()));
        Ok(())
    }

    async fn mark_complete(
        &self,
        quiz_id: &RemoteId,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        self.completions
            .lock()
            .unwrap()
            .push((quiz_id.clone(), request.clone()));
        self.completion
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BackendError::ApiError {
                status: 500,
                message: "internal error".into(),
            })
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>, BackendError> {
        Ok(self.history.lock().unwrap().clone())
    }
}
