use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const SETTINGS_FILE: &str = "audio_client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Defaults, then the optional settings file, then the environment.
pub fn load_settings_from(path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_url") {
                settings.api_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("AUDIO_API_URL") {
        settings.api_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_URL") {
        settings.api_url = v;
    }

    settings.api_url = normalize_api_url(&settings.api_url);
    settings
}

pub fn normalize_api_url(raw_api_url: &str) -> String {
    let trimmed = raw_api_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_url;
    }
    trimmed.to_string()
}

pub fn parse_api_url(raw_api_url: &str) -> anyhow::Result<Url> {
    let normalized = normalize_api_url(raw_api_url);
    let url = Url::parse(&normalized)
        .with_context(|| format!("invalid audio service url '{normalized}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        anyhow::bail!(
            "audio service url '{normalized}' must use http or https, got '{}'",
            url.scheme()
        );
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
