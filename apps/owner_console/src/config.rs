use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::warn;
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "client.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub backend_url: String,
    pub app_id: String,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub page_size: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:1111".into(),
            app_id: "restaurant-owner".into(),
            probe_timeout_ms: 5_000,
            request_timeout_ms: 15_000,
            page_size: 100,
        }
    }
}

impl ClientSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn admin_panel_url(&self) -> anyhow::Result<String> {
        let base = self.backend_url.trim().trim_end_matches('/');
        let url = Url::parse(&format!("{base}/admin"))
            .with_context(|| format!("invalid backend url '{}'", self.backend_url))?;
        Ok(url.to_string())
    }
}

/// File settings first (explicit path, else `client.toml` when present),
/// then environment overrides.
pub fn load_settings(explicit_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = match explicit_path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                read_settings_file(&default_path)?
            } else {
                ClientSettings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<ClientSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    parse_settings(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn parse_settings(raw: &str) -> anyhow::Result<ClientSettings> {
    toml::from_str(raw).map_err(|err| anyhow!("{err}"))
}

fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = lookup("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = lookup("APP__APP_ID") {
        settings.app_id = v;
    }

    if let Some(v) = lookup("APP__PROBE_TIMEOUT_MS") {
        match v.parse() {
            Ok(parsed) => settings.probe_timeout_ms = parsed,
            Err(err) => warn!("ignoring APP__PROBE_TIMEOUT_MS={v}: {err}"),
        }
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_MS") {
        match v.parse() {
            Ok(parsed) => settings.request_timeout_ms = parsed,
            Err(err) => warn!("ignoring APP__REQUEST_TIMEOUT_MS={v}: {err}"),
        }
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        match v.parse() {
            Ok(parsed) => settings.page_size = parsed,
            Err(err) => warn!("ignoring APP__PAGE_SIZE={v}: {err}"),
        }
    }
}
