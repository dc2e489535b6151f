use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use marks_client::AutosaveSettings;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub debounce_ms: u64,
    pub saved_display_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        let autosave = AutosaveSettings::default();
        Self {
            server_url: "http://127.0.0.1:5000/api".into(),
            debounce_ms: autosave.debounce_window.as_millis() as u64,
            saved_display_ms: autosave.saved_display_window.as_millis() as u64,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    debounce_ms: Option<u64>,
    saved_display_ms: Option<u64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn autosave(&self) -> AutosaveSettings {
        AutosaveSettings {
            debounce_window: Duration::from_millis(self.debounce_ms),
            saved_display_window: Duration::from_millis(self.saved_display_ms),
        }
    }

    pub fn server_url(&self) -> anyhow::Result<Url> {
        Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url '{}'", self.server_url))
    }
}

/// Defaults, then the config file if it exists, then environment overrides.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.debounce_ms {
        settings.debounce_ms = v;
    }
    if let Some(v) = file_cfg.saved_display_ms {
        settings.saved_display_ms = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("EVALUATOR_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(parsed) = lookup("APP__DEBOUNCE_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.debounce_ms = parsed;
    }
    if let Some(parsed) = lookup("APP__SAVED_DISPLAY_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.saved_display_ms = parsed;
    }

    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
