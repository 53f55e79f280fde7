use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use shared::domain::{AuthMode, Credentials, SessionToken, UserId};
use tokio::sync::{broadcast, Mutex, Notify};

use crate::{error::TransportError, transport::AudioServiceApi, types::AudioFile, ClientEvent};

pub(crate) fn credentials(user_id: &str, token: &str) -> Credentials {
    Credentials {
        user_id: UserId::new(user_id),
        token: SessionToken::new(token),
    }
}

pub(crate) fn status(code: u16, detail: &str) -> TransportError {
    TransportError::Status {
        status: code,
        detail: Some(detail.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub credentials: Credentials,
}

/// Scripted [`AudioServiceApi`] that records every call it receives.
pub(crate) struct RecordingApi {
    auth_replies: Mutex<VecDeque<Result<Credentials, TransportError>>>,
    upload_replies: Mutex<VecDeque<Result<String, TransportError>>>,
    pub auth_calls: Mutex<Vec<(AuthMode, String)>>,
    pub upload_calls: Mutex<Vec<RecordedUpload>>,
    upload_gate: Option<Arc<Notify>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            auth_replies: Mutex::new(VecDeque::new()),
            upload_replies: Mutex::new(VecDeque::new()),
            auth_calls: Mutex::new(Vec::new()),
            upload_calls: Mutex::new(Vec::new()),
            upload_gate: None,
        }
    }

    /// Upload replies are held until the returned handle is notified.
    pub fn with_upload_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.upload_gate = Some(gate.clone());
        (self, gate)
    }

    pub async fn push_auth(&self, reply: Result<Credentials, TransportError>) {
        self.auth_replies.lock().await.push_back(reply);
    }

    pub async fn push_upload(&self, reply: Result<String, TransportError>) {
        self.upload_replies.lock().await.push_back(reply);
    }

    pub async fn auth_call_count(&self) -> usize {
        self.auth_calls.lock().await.len()
    }

    pub async fn upload_call_count(&self) -> usize {
        self.upload_calls.lock().await.len()
    }
}

#[async_trait]
impl AudioServiceApi for RecordingApi {
    async fn authenticate(
        &self,
        mode: AuthMode,
        username: &str,
    ) -> Result<Credentials, TransportError> {
        self.auth_calls
            .lock()
            .await
            .push((mode, username.to_string()));
        self.auth_replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(status(503, "no scripted auth reply")))
    }

    async fn upload_audio(
        &self,
        file: &AudioFile,
        credentials: &Credentials,
    ) -> Result<String, TransportError> {
        self.upload_calls.lock().await.push(RecordedUpload {
            filename: file.filename.clone(),
            bytes: file.bytes.clone(),
            credentials: credentials.clone(),
        });
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        self.upload_replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(status(503, "no scripted upload reply")))
    }
}

pub(crate) fn drain_events(rx: &mut broadcast::Receiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
