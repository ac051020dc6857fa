//! HTTP implementation of the quiz backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument};

use quizflow_core::error::BackendError;
use quizflow_core::model::{ProgressSnapshot, RemoteId};
use quizflow_core::traits::{
    CompletionRequest, CompletionResponse, GenerateRequest, GeneratedQuiz, HistoryEntry,
    QuizBackend, ResumeRequest, ResumedQuiz,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Quiz backend reached over HTTP with an optional bearer token.
pub struct HttpBackend {
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and return the response if its status is a success.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = self.authorize(req).send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.timeout_secs)
            } else {
                BackendError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status < 400 {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            401 | 403 => BackendError::Unauthorized(body),
            400 => BackendError::Rejected(body),
            404 => BackendError::NotFound(body),
            _ => BackendError::ApiError {
                status,
                message: body,
            },
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.client.post(self.url(path)).json(body)).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    response
        .json()
        .await
        .map_err(|e| BackendError::Malformed(format!("failed to parse response: {e}")))
}

/// History may come as a bare list or wrapped in a paginated object.
fn history_entries(value: serde_json::Value) -> Result<Vec<HistoryEntry>, BackendError> {
    let list = match value {
        serde_json::Value::Object(mut map) => ["results", "history", "quizzes"]
            .iter()
            .find_map(|key| map.remove(*key))
            .unwrap_or(serde_json::Value::Array(Vec::new())),
        other => other,
    };
    serde_json::from_value(list)
        .map_err(|e| BackendError::Malformed(format!("invalid history entry: {e}")))
}

#[async_trait]
impl QuizBackend for HttpBackend {
    #[instrument(skip(self, request), fields(domain = %request.domain, count = request.number_of_questions))]
    async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedQuiz, BackendError> {
        let value: serde_json::Value = self.post_json("/generate-quiz/", request).await?;
        let quiz = GeneratedQuiz::from_value(value)?;
        debug!(quiz_id = ?quiz.quiz_id, questions = quiz.questions.len(), "quiz generated");
        Ok(quiz)
    }

    #[instrument(skip(self))]
    async fn resume(&self, request: &ResumeRequest) -> Result<ResumedQuiz, BackendError> {
        self.post_json("/resume-quiz/", request).await
    }

    #[instrument(skip(self, snapshot), fields(index = snapshot.current_question_index))]
    async fn save_progress(
        &self,
        quiz_id: &RemoteId,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), BackendError> {
        let req = self
            .client
            .post(self.url(&format!("/save-progress/{quiz_id}")))
            .json(snapshot);
        self.send(req).await?;
        Ok(())
    }

    #[instrument(skip(self, request))]
    async fn mark_complete(
        &self,
        quiz_id: &RemoteId,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, BackendError> {
        self.post_json(&format!("/mark-complete/{quiz_id}"), request)
            .await
    }

    #[instrument(skip(self))]
    async fn history(&self) -> Result<Vec<HistoryEntry>, BackendError> {
        let response = self
            .send(self.client.get(self.url("/quiz-history/")))
            .await?;
        history_entries(decode(response).await?)
    }
}
