use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use editor_core::transport::{Credentials, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = "site_editor.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub token: Option<String>,
    pub csrf_token: Option<String>,
    pub operator: Option<String>,
    pub timeout_secs: u64,
    pub snapshot_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            token: None,
            csrf_token: None,
            operator: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            snapshot_path: default_snapshot_path(),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            bearer_token: self.token.clone(),
            csrf_token: self.csrf_token.clone(),
            operator: self.operator.clone(),
        }
    }
}

/// Keys accepted in `site_editor.toml`; all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSettings {
    base_url: Option<String>,
    token: Option<String>,
    csrf_token: Option<String>,
    operator: Option<String>,
    timeout_secs: Option<u64>,
    snapshot_path: Option<PathBuf>,
    log_level: Option<String>,
}

fn default_snapshot_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| base.join("site_editor").join("snapshot.json"))
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path.unwrap_or_else(|| Path::new(SETTINGS_FILE));
    load_settings_with(path, |key| std::env::var(key).ok())
}

/// Defaults, then the settings file (if present), then the environment.
pub fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
        if let Some(v) = file_cfg.base_url {
            settings.base_url = v;
        }
        if file_cfg.token.is_some() {
            settings.token = file_cfg.token;
        }
        if file_cfg.csrf_token.is_some() {
            settings.csrf_token = file_cfg.csrf_token;
        }
        if file_cfg.operator.is_some() {
            settings.operator = file_cfg.operator;
        }
        if let Some(v) = file_cfg.timeout_secs {
            settings.timeout_secs = v;
        }
        if file_cfg.snapshot_path.is_some() {
            settings.snapshot_path = file_cfg.snapshot_path;
        }
        if let Some(v) = file_cfg.log_level {
            settings.log_level = v;
        }
    }

    if let Some(v) = env("SITE_EDITOR_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("SITE_EDITOR_TOKEN") {
        settings.token = Some(v);
    }
    if let Some(v) = env("SITE_EDITOR_CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Some(v) = env("SITE_EDITOR_OPERATOR") {
        settings.operator = Some(v);
    }

    if let Some(v) = env("APP__TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__SNAPSHOT_PATH") {
        settings.snapshot_path = if v.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(v))
        };
    }

    if let Some(v) = env("APP__LOG_LEVEL") {
        settings.log_level = v;
    }

    settings.base_url = normalize_base_url(&settings.base_url);
    Ok(settings)
}

fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn missing_file_and_empty_env_give_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings =
            load_settings_with(&dir.path().join(SETTINGS_FILE), env_from(&[])).expect("settings");
        assert_eq!(settings.base_url, "http://localhost:8000/api/");
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.token, None);
    }

    #[test]
    fn environment_overrides_file_and_app_prefix_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            "base_url = \"https://shop.example.com/api\"\ntoken = \"file-token\"\ntimeout_secs = 30\n",
        )
        .expect("write settings");

        let settings = load_settings_with(
            &path,
            env_from(&[
                ("SITE_EDITOR_BASE_URL", "https://staging.example.com/api"),
                ("APP__BASE_URL", "https://preview.example.com/api/"),
                ("SITE_EDITOR_CSRF_TOKEN", "csrf-env"),
            ]),
        )
        .expect("settings");

        assert_eq!(settings.base_url, "https://preview.example.com/api/");
        assert_eq!(settings.token.as_deref(), Some("file-token"));
        assert_eq!(settings.csrf_token.as_deref(), Some("csrf-env"));
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn file_base_url_gets_a_trailing_slash() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "base_url = \"https://shop.example.com/api\"\n").expect("write");

        let settings = load_settings_with(&path, env_from(&[])).expect("settings");
        assert_eq!(settings.base_url, "https://shop.example.com/api/");
    }

    #[test]
    fn empty_snapshot_path_disables_snapshots_and_bad_timeout_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = load_settings_with(
            &dir.path().join(SETTINGS_FILE),
            env_from(&[("APP__SNAPSHOT_PATH", ""), ("APP__TIMEOUT_SECS", "soon")]),
        )
        .expect("settings");
        assert_eq!(settings.snapshot_path, None);
        assert_eq!(settings.timeout_secs, 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "timeout_secs = \"ten\"").expect("write");

        let err = load_settings_with(&path, env_from(&[])).expect_err("must fail");
        assert!(err.to_string().contains("failed to parse settings file"));
    }
}
