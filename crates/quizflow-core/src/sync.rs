//! Debounced background autosave.
//!
//! Every session mutation hands the synchronizer a fresh
//! [`ProgressSnapshot`]. The synchronizer waits for a quiet interval and only
//! pushes the most recent snapshot; each new call cancels the pending push.
//! Pushes are fire-and-forget: failures are logged and dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::{ProgressSnapshot, RemoteId};
use crate::traits::QuizBackend;

/// Default quiet interval before a progress push.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(700);

/// A backend together with the quiz id it knows the session by.
#[derive(Clone)]
pub struct RemoteLink {
    backend: Arc<dyn QuizBackend>,
    quiz_id: RemoteId,
}

impl RemoteLink {
    pub fn new(backend: Arc<dyn QuizBackend>, quiz_id: RemoteId) -> Self {
        Self { backend, quiz_id }
    }

    pub fn backend(&self) -> &dyn QuizBackend {
        self.backend.as_ref()
    }

    pub fn quiz_id(&self) -> &RemoteId {
        &self.quiz_id
    }
}

impl std::fmt::Debug for RemoteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLink")
            .field("quiz_id", &self.quiz_id)
            .finish_non_exhaustive()
    }
}

/// Owns the debounce timer for one session.
#[derive(Debug)]
pub struct ProgressSynchronizer {
    remote: Option<RemoteLink>,
    debounce: Duration,
    pending: Option<JoinHandle<()>>,
}

impl ProgressSynchronizer {
    pub fn new(remote: Option<RemoteLink>, debounce: Duration) -> Self {
        Self {
            remote,
            debounce,
            pending: None,
        }
    }

    /// A synchronizer for an ephemeral session; every call is a no-op.
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_DEBOUNCE)
    }

    pub fn is_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// True while a push is scheduled but its quiet interval has not elapsed.
    pub fn has_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Replace any scheduled push with one carrying `snapshot`.
    pub fn schedule(&mut self, snapshot: ProgressSnapshot) {
        let Some(remote) = self.remote.clone() else {
            return;
        };

        self.cancel();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(quiz_id = %remote.quiz_id, "no async runtime, autosave skipped");
            return;
        };

        let delay = self.debounce;
        debug!(
            quiz_id = %remote.quiz_id,
            index = snapshot.current_question_index,
            "autosave scheduled in {}ms",
            delay.as_millis()
        );

        let push_runtime = runtime.clone();
        self.pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached: a later reschedule aborts the timer, never a request
            // already on the wire.
            push_runtime.spawn(push(remote, snapshot));
        }));
    }

    /// Cancel the scheduled push, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            if !handle.is_finished() {
                debug!("pending autosave cancelled");
            }
            handle.abort();
        }
    }
}

impl Drop for ProgressSynchronizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn push(remote: RemoteLink, snapshot: ProgressSnapshot) {
    match remote
        .backend
        .save_progress(&remote.quiz_id, &snapshot)
        .await
    {
        Ok(()) => debug!(
            quiz_id = %remote.quiz_id,
            index = snapshot.current_question_index,
            "progress saved"
        ),
        Err(e) => warn!(quiz_id = %remote.quiz_id, "autosave dropped: {e}"),
    }
}
