use serde::{Deserialize, Serialize};

use crate::domain::{SessionToken, UserId};

pub const REGISTER_PATH: &str = "/users/";
pub const LOGIN_PATH: &str = "/login/";
pub const UPLOAD_PATH: &str = "/upload-audio/";

pub const FIELD_USERNAME: &str = "username";
pub const FIELD_FILE: &str = "file";
pub const FIELD_USER_ID: &str = "user_id";
pub const FIELD_TOKEN: &str = "token";

/// Body returned by both `/users/` and `/login/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub token: SessionToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}
