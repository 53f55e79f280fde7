//! Client core for the audio service: session and upload state machines.
//!
//! [`SessionController`] resolves who the user is; [`UploadController`] moves a
//! single file through select → upload → outcome once a session exists. Both
//! publish [`ClientEvent`]s so a presentation layer can re-render on change.

pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

pub use error::{ControllerError, TransportError};
pub use session::{Session, SessionController, SessionSnapshot, SessionState};
pub use shared::domain::{AuthMode, Credentials, SessionToken, UserId};
pub use transport::{AudioServiceApi, HttpAudioService};
pub use types::AudioFile;
pub use upload::{UploadController, UploadPhase, UploadSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    SessionChanged(SessionSnapshot),
    UploadChanged(UploadSnapshot),
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
