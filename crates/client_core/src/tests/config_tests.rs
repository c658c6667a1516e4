use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| vars.get(key).cloned()
}

#[test]
fn appends_trailing_slash_to_base_url() {
    let url = normalize_base_url("https://auth.example.com").expect("url");
    assert_eq!(url.as_str(), "https://auth.example.com/");
    assert_eq!(
        url.join("auth/me").expect("join").as_str(),
        "https://auth.example.com/auth/me"
    );
}

#[test]
fn keeps_path_prefix_when_joining_endpoints() {
    let url = normalize_base_url("  http://127.0.0.1:4000/api?x=1  ").expect("url");
    assert_eq!(url.as_str(), "http://127.0.0.1:4000/api/");
    assert_eq!(
        url.join("auth/refresh").expect("join").as_str(),
        "http://127.0.0.1:4000/api/auth/refresh"
    );
}

#[test]
fn rejects_empty_and_non_http_base_urls() {
    assert!(normalize_base_url("   ").is_err());
    assert!(normalize_base_url("ftp://auth.example.com").is_err());
    assert!(normalize_base_url("not a url").is_err());
}

#[test]
fn file_settings_override_defaults() {
    let mut settings = ClientSettings::default();
    let file_cfg: FileSettings = toml::from_str(
        r#"
api_base_url = "http://localhost:3000"
redirect_delay_ms = 250
"#,
    )
    .expect("toml");

    apply_file_settings(&mut settings, file_cfg);

    assert_eq!(settings.api_base_url, "http://localhost:3000");
    assert_eq!(settings.redirect_delay(), Duration::from_millis(250));
    assert_eq!(settings.request_timeout(), None);
}

#[test]
fn loads_settings_file_from_explicit_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("auth_client_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("auth_client.toml");
    fs::write(&path, "request_timeout_secs = 7\n").expect("write config");

    let settings = load_settings_from(&path);
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(7)));

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_settings_file_falls_back_to_defaults() {
    let path = env::temp_dir().join("auth_client_config_does_not_exist.toml");
    let settings = load_settings_from(&path);
    assert_eq!(settings.redirect_delay_ms, ClientSettings::default().redirect_delay_ms);
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let mut settings = ClientSettings::default();
    let file_cfg: FileSettings = toml::from_str(
        r#"
api_base_url = "http://from-file:3000"
redirect_delay_ms = 250
"#,
    )
    .expect("toml");
    apply_file_settings(&mut settings, file_cfg);

    apply_env_settings(&mut settings, env_of(&[("AUTH_API_BASE_URL", "http://legacy:1")]));
    assert_eq!(settings.api_base_url, "http://legacy:1");

    apply_env_settings(
        &mut settings,
        env_of(&[
            ("AUTH_API_BASE_URL", "http://legacy:1"),
            ("APP__API_BASE_URL", "http://app:2"),
            ("APP__REQUEST_TIMEOUT_SECS", "5"),
        ]),
    );
    assert_eq!(settings.api_base_url, "http://app:2");
    assert_eq!(settings.request_timeout(), Some(Duration::from_secs(5)));
    assert_eq!(settings.redirect_delay(), Duration::from_millis(250));
}

#[test]
fn non_numeric_env_values_are_ignored() {
    let mut settings = ClientSettings::default();

    apply_env_settings(
        &mut settings,
        env_of(&[
            ("APP__REDIRECT_DELAY_MS", "soon"),
            ("APP__REQUEST_TIMEOUT_SECS", "-3"),
        ]),
    );

    assert_eq!(settings, ClientSettings::default());

    apply_env_settings(&mut settings, env_of(&[("APP__REDIRECT_DELAY_MS", "40")]));
    assert_eq!(settings.redirect_delay(), Duration::from_millis(40));
}
