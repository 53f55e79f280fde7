use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{AuthMode, Credentials},
    error::ErrorBody,
    protocol::{
        AuthResponse, UploadResponse, FIELD_FILE, FIELD_TOKEN, FIELD_USERNAME, FIELD_USER_ID,
        UPLOAD_PATH,
    },
};
use tracing::debug;

use crate::{config::normalize_api_url, error::TransportError, types::AudioFile};

/// The remote calls the controllers depend on. One call is one outbound request.
#[async_trait]
pub trait AudioServiceApi: Send + Sync {
    async fn authenticate(
        &self,
        mode: AuthMode,
        username: &str,
    ) -> Result<Credentials, TransportError>;

    /// Returns the download URL reported by the service.
    async fn upload_audio(
        &self,
        file: &AudioFile,
        credentials: &Credentials,
    ) -> Result<String, TransportError>;
}

pub struct HttpAudioService {
    http: Client,
    api_url: String,
}

impl HttpAudioService {
    pub fn new(api_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), api_url)
    }

    pub fn with_client(http: Client, api_url: &str) -> Result<Self, TransportError> {
        let api_url = normalize_api_url(api_url);
        let parsed = url::Url::parse(&api_url).map_err(|e| TransportError::InvalidUrl {
            url: api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                url: api_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self { http, api_url })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

#[async_trait]
impl AudioServiceApi for HttpAudioService {
    async fn authenticate(
        &self,
        mode: AuthMode,
        username: &str,
    ) -> Result<Credentials, TransportError> {
        let endpoint = self.endpoint(mode.endpoint());
        debug!(%mode, endpoint = %endpoint, "transport: posting auth form");
        let form = Form::new().text(FIELD_USERNAME, username.to_string());
        let response = self.http.post(endpoint).multipart(form).send().await?;
        let body: AuthResponse = read_json(response).await?;
        Ok(Credentials {
            user_id: body.user_id,
            token: body.token,
        })
    }

    async fn upload_audio(
        &self,
        file: &AudioFile,
        credentials: &Credentials,
    ) -> Result<String, TransportError> {
        let endpoint = self.endpoint(UPLOAD_PATH);
        debug!(
            endpoint = %endpoint,
            filename = %file.filename,
            size_bytes = file.bytes.len(),
            "transport: posting upload form"
        );
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type())?;
        let form = Form::new()
            .part(FIELD_FILE, part)
            .text(FIELD_USER_ID, credentials.user_id.as_str().to_string())
            .text(FIELD_TOKEN, credentials.token.expose().to_string());
        let response = self.http.post(endpoint).multipart(form).send().await?;
        let body: UploadResponse = read_json(response).await?;
        Ok(body.url)
    }
}

/// Any non-2xx status is a failure; the error body only feeds the message.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message());
        return Err(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
