use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

#[test]
fn normalizes_trailing_slashes_and_whitespace() {
    assert_eq!(
        normalize_api_url("  http://audio.local:8000/// "),
        "http://audio.local:8000"
    );
}

#[test]
fn empty_url_falls_back_to_default() {
    assert_eq!(normalize_api_url("   "), DEFAULT_API_URL);
}

#[test]
fn parse_accepts_http_and_https() {
    assert_eq!(
        parse_api_url("https://audio.example.com/api/")
            .expect("https url")
            .as_str(),
        "https://audio.example.com/api"
    );
    assert!(parse_api_url("http://localhost:8000").is_ok());
}

#[test]
fn parse_rejects_other_schemes_and_garbage() {
    let err = parse_api_url("ftp://audio.example.com").expect_err("ftp scheme");
    assert!(err.to_string().contains("must use http or https"));

    let err = parse_api_url("no scheme here").expect_err("garbage");
    assert!(err.to_string().contains("invalid audio service url"));
}

// Env overrides are process-global, so precedence is checked in one test.
#[test]
fn file_then_env_precedence() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("audio_client_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);

    env::remove_var("AUDIO_API_URL");
    env::remove_var("APP__API_URL");
    assert_eq!(load_settings_from(&path), Settings::default());

    fs::write(&path, "api_url = \"http://from-file:9000/\"\n").expect("write settings");
    assert_eq!(load_settings_from(&path).api_url, "http://from-file:9000");

    env::set_var("AUDIO_API_URL", "http://from-env:7000");
    assert_eq!(load_settings_from(&path).api_url, "http://from-env:7000");

    env::set_var("APP__API_URL", "http://from-app-env:6000/");
    assert_eq!(load_settings_from(&path).api_url, "http://from-app-env:6000");

    env::remove_var("AUDIO_API_URL");
    env::remove_var("APP__API_URL");
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn malformed_settings_file_is_ignored() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("audio_client_config_bad_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    fs::write(&path, "api_url = [not valid").expect("write settings");

    let settings = load_settings_from(&path);
    assert!(!settings.api_url.is_empty());

    fs::remove_dir_all(temp_root).expect("cleanup");
}
