use std::sync::Arc;

use shared::domain::{AuthMode, Credentials, SessionToken, UserId};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{ControllerError, TransportError},
    transport::AudioServiceApi,
    ClientEvent,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub credentials: Credentials,
}

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.credentials.user_id
    }

    pub fn token(&self) -> &SessionToken {
        &self.credentials.token
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(Session),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Anonymous => None,
        }
    }
}

/// Owns the identity state and mediates login/registration.
///
/// A session is either absent or complete. Every failed `authenticate` drops
/// back to `Anonymous` with the failure message stored for display.
pub struct SessionController {
    api: Arc<dyn AudioServiceApi>,
    inner: Mutex<SessionSnapshot>,
    events: broadcast::Sender<ClientEvent>,
}

impl SessionController {
    pub fn new(api: Arc<dyn AudioServiceApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            inner: Mutex::new(SessionSnapshot::default()),
            events,
        })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.clone()
    }

    pub async fn credentials(&self) -> Option<Credentials> {
        self.inner
            .lock()
            .await
            .session()
            .map(|session| session.credentials.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.is_authenticated()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<ClientEvent> {
        self.events.clone()
    }

    /// Issues exactly one login or registration request for a non-empty
    /// username. An empty username is rejected locally without a request.
    pub async fn authenticate(&self, username: &str, mode: AuthMode) -> SessionSnapshot {
        if username.is_empty() {
            debug!(%mode, "session: authenticate skipped, username is empty");
            return self.snapshot().await;
        }

        info!(%mode, username, "session: authenticating");
        let result = self
            .api
            .authenticate(mode, username)
            .await
            .and_then(|credentials| {
                if credentials.is_complete() {
                    Ok(credentials)
                } else {
                    Err(TransportError::IncompleteResponse("user_id or token"))
                }
            });

        let snapshot = {
            let mut guard = self.inner.lock().await;
            match result {
                Ok(credentials) => {
                    info!(
                        %mode,
                        username,
                        user_id = %credentials.user_id,
                        "session: authenticated"
                    );
                    guard.state = SessionState::Authenticated(Session {
                        username: username.to_string(),
                        credentials,
                    });
                    guard.last_error = None;
                }
                Err(err) => {
                    let failure = ControllerError::auth(mode, &err);
                    warn!(%mode, username, error = %err, "session: authentication failed");
                    guard.state = SessionState::Anonymous;
                    guard.last_error = Some(failure.to_string());
                }
            }
            guard.clone()
        };

        self.publish(&snapshot);
        snapshot
    }

    /// Returns to `Anonymous` and clears any stored error. Idempotent.
    pub async fn logout(&self) -> SessionSnapshot {
        let snapshot = {
            let mut guard = self.inner.lock().await;
            if *guard == SessionSnapshot::default() {
                return guard.clone();
            }
            if let Some(session) = guard.session() {
                info!(username = %session.username, "session: logged out");
            }
            *guard = SessionSnapshot::default();
            guard.clone()
        };

        self.publish(&snapshot);
        snapshot
    }

    fn publish(&self, snapshot: &SessionSnapshot) {
        let _ = self
            .events
            .send(ClientEvent::SessionChanged(snapshot.clone()));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
