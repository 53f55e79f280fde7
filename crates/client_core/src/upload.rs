use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, TransportError},
    session::SessionController,
    transport::AudioServiceApi,
    types::AudioFile,
    ClientEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FileSelected,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSnapshot {
    pub phase: UploadPhase,
    pub selected_file: Option<String>,
    pub result_url: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct UploadState {
    phase: UploadPhase,
    selected_file: Option<Arc<AudioFile>>,
    result_url: Option<String>,
    last_error: Option<String>,
    // Bumped by reset so a request still in flight cannot write into the new cycle.
    generation: u64,
}

impl UploadState {
    fn snapshot(&self) -> UploadSnapshot {
        UploadSnapshot {
            phase: self.phase,
            selected_file: self
                .selected_file
                .as_ref()
                .map(|file| file.filename.clone()),
            result_url: self.result_url.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Owns one upload cycle at a time: select a file, submit it, keep the outcome.
///
/// `upload` only talks to the network while a file is selected and the paired
/// [`SessionController`] is authenticated; otherwise it returns the current
/// state untouched.
pub struct UploadController {
    api: Arc<dyn AudioServiceApi>,
    session: Arc<SessionController>,
    inner: Mutex<UploadState>,
    events: broadcast::Sender<ClientEvent>,
}

impl UploadController {
    /// Events are published on the session's channel, so one subscription
    /// observes both controllers.
    pub fn new(api: Arc<dyn AudioServiceApi>, session: Arc<SessionController>) -> Arc<Self> {
        let events = session.event_sender();
        Arc::new(Self {
            api,
            session,
            inner: Mutex::new(UploadState::default()),
            events,
        })
    }

    pub async fn snapshot(&self) -> UploadSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Replaces the selected file. The service only accepts WAV content
    /// (see [`AudioFile::has_accepted_extension`]); that is the caller's
    /// precondition and is not checked here.
    pub async fn select_file(&self, file: AudioFile) -> UploadSnapshot {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            info!(
                filename = %file.filename,
                size_bytes = file.size_bytes(),
                "upload: file selected"
            );
            guard.selected_file = Some(Arc::new(file));
            if guard.phase != UploadPhase::Uploading {
                guard.phase = UploadPhase::FileSelected;
            }
            guard.snapshot()
        };

        self.publish(&snapshot);
        snapshot
    }

    pub async fn upload(&self) -> UploadSnapshot {
        let Some(credentials) = self.session.credentials().await else {
            debug!("upload: skipped, session is anonymous");
            return self.snapshot().await;
        };

        let (file, generation, started) = {
            let mut guard = self.inner.lock().await;
            if guard.phase == UploadPhase::Uploading {
                debug!("upload: skipped, an upload is already in flight");
                return guard.snapshot();
            }
            let Some(file) = guard.selected_file.clone() else {
                debug!("upload: skipped, no file selected");
                return guard.snapshot();
            };
            guard.phase = UploadPhase::Uploading;
            guard.result_url = None;
            guard.last_error = None;
            (file, guard.generation, guard.snapshot())
        };
        self.publish(&started);

        info!(
            filename = %file.filename,
            user_id = %credentials.user_id,
            "upload: submitting"
        );
        let result = self
            .api
            .upload_audio(&file, &credentials)
            .await
            .and_then(|url| {
                if url.is_empty() {
                    Err(TransportError::IncompleteResponse("url"))
                } else {
                    Ok(url)
                }
            });

        let snapshot = {
            let mut guard = self.inner.lock().await;
            if guard.generation != generation {
                debug!(filename = %file.filename, "upload: discarding outcome after reset");
                return guard.snapshot();
            }
            match result {
                Ok(url) => {
                    info!(filename = %file.filename, url = %url, "upload: succeeded");
                    guard.phase = UploadPhase::Succeeded;
                    guard.result_url = Some(url);
                    guard.last_error = None;
                    let same_file = guard
                        .selected_file
                        .as_ref()
                        .is_some_and(|selected| Arc::ptr_eq(selected, &file));
                    if same_file {
                        guard.selected_file = None;
                    }
                }
                Err(err) => {
                    let failure = ControllerError::upload(&err);
                    warn!(filename = %file.filename, error = %err, "upload: failed");
                    guard.phase = UploadPhase::Failed;
                    guard.result_url = None;
                    guard.last_error = Some(failure.to_string());
                }
            }
            guard.snapshot()
        };

        self.publish(&snapshot);
        snapshot
    }

    /// Back to `Idle` with no file, result or error. Used when the session ends.
    pub async fn reset(&self) -> UploadSnapshot {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            let cleared = UploadSnapshot::default();
            if guard.snapshot() == cleared {
                return cleared;
            }
            let generation = guard.generation.wrapping_add(1);
            *guard = UploadState {
                generation,
                ..UploadState::default()
            };
            guard.snapshot()
        };

        self.publish(&snapshot);
        snapshot
    }

    fn publish(&self, snapshot: &UploadSnapshot) {
        let _ = self
            .events
            .send(ClientEvent::UploadChanged(snapshot.clone()));
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
