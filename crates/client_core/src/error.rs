use shared::domain::AuthMode;
use thiserror::Error;

/// Failures of a single outbound request to the audio service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("server responded with status {}{}", .status, detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("server returned an incomplete response: missing {0}")]
    IncompleteResponse(&'static str),
    #[error("invalid service url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({detail})"),
        None => String::new(),
    }
}

/// The two failure kinds a controller stores for the presentation layer.
///
/// Only the rendered message is kept in controller state; the variant exists so
/// logs and tests can tell which boundary produced it.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Failed to {mode}: {reason}")]
    AuthFailure { mode: AuthMode, reason: String },
    #[error("Error uploading file: {reason}")]
    UploadFailure { reason: String },
}

impl ControllerError {
    pub fn auth(mode: AuthMode, source: &TransportError) -> Self {
        Self::AuthFailure {
            mode,
            reason: source.to_string(),
        }
    }

    pub fn upload(source: &TransportError) -> Self {
        Self::UploadFailure {
            reason: source.to_string(),
        }
    }
}
