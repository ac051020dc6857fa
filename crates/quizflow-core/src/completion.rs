//! The one-time "mark complete" handshake.
//!
//! The server's record wins when it answers with questions and answers;
//! any failure falls back to local grading so the user always reaches a
//! results view.

use tracing::{info, warn};

use crate::model::{Question, UserAnswers};
use crate::results::ResultsPayload;
use crate::sync::RemoteLink;
use crate::traits::CompletionRequest;

/// Complete a quiz and produce its results payload.
pub async fn finish(
    remote: Option<&RemoteLink>,
    questions: &[Question],
    answers: &UserAnswers,
) -> ResultsPayload {
    let Some(remote) = remote else {
        return ResultsPayload::local(None, questions.to_vec(), answers.clone());
    };

    let quiz_id = remote.quiz_id().clone();
    let request = CompletionRequest {
        user_answers: answers.clone().fit(questions.len()),
    };

    match remote.backend().mark_complete(&quiz_id, &request).await {
        Ok(response) => {
            if let Some(payload) = ResultsPayload::from_server(Some(quiz_id.clone()), response) {
                info!(%quiz_id, "quiz marked complete");
                return payload;
            }
            warn!(%quiz_id, "completion response incomplete, grading locally");
        }
        Err(e) => {
            warn!(%quiz_id, "mark-complete failed, grading locally: {e}");
        }
    }

    ResultsPayload::local(Some(quiz_id), questions.to_vec(), answers.clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::MockBackend;
    use crate::model::{AnswerSelection, RemoteId, WireQuestion};
    use crate::results::ResultsSource;
    use crate::traits::CompletionResponse;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn questions() -> Vec<Question> {
        vec![
            Question::new("A?", strings(&["a", "b"]), strings(&["a"])),
            Question::new("B?", strings(&["a", "b"]), strings(&["b"])),
        ]
    }

    fn answers() -> UserAnswers {
        vec![
            ["a"].into_iter().collect::<AnswerSelection>(),
            AnswerSelection::new(),
        ]
        .into_iter()
        .collect()
    }

    fn link(backend: &Arc<MockBackend>) -> RemoteLink {
        RemoteLink::new(backend.clone(), RemoteId::from(11))
    }

    #[tokio::test]
    async fn ephemeral_session_grades_locally() {
        let payload = finish(None, &questions(), &answers()).await;
        assert_eq!(payload.source, ResultsSource::Local);
        assert!(payload.quiz_id.is_none());
        assert_eq!(payload.summary().percentage, 50);
    }

    #[tokio::test]
    async fn server_record_is_used_when_complete() {
        let wire: Vec<WireQuestion> = questions().into_iter().map(Into::into).collect();
        let backend = Arc::new(MockBackend::new().with_completion(CompletionResponse {
            questions: Some(wire),
            user_answers: Some(answers()),
            score: Some(50.0),
        }));

        let payload = finish(Some(&link(&backend)), &questions(), &answers()).await;

        assert_eq!(payload.source, ResultsSource::Server);
        assert_eq!(payload.score, Some(50.0));
        let sent = backend.completions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, RemoteId::from(11));
        assert_eq!(sent[0].1.user_answers, answers());
    }

    #[tokio::test]
    async fn server_error_falls_back_to_local() {
        let backend = Arc::new(MockBackend::new());
        let payload = finish(Some(&link(&backend)), &questions(), &answers()).await;

        assert_eq!(payload.source, ResultsSource::Local);
        assert_eq!(payload.quiz_id, Some(RemoteId::from(11)));
        assert_eq!(payload.score, Some(50.0));
        assert_eq!(backend.completions().len(), 1);
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_local() {
        let backend = Arc::new(MockBackend::new().with_completion(CompletionResponse {
            questions: None,
            user_answers: None,
            score: Some(100.0),
        }));
        let payload = finish(Some(&link(&backend)), &questions(), &answers()).await;
        assert_eq!(payload.source, ResultsSource::Local);
        assert_eq!(payload.score, Some(50.0));
    }
}
