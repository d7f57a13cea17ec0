use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5001";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub requires_auth: bool,
    pub dictation_command: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            requires_auth: true,
            dictation_command: None,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".adscribe")
        .join("config.toml")
}

pub fn load() -> AppConfig {
    let mut config = read_file(&config_path());
    config.apply_overrides(|key| std::env::var(key).ok());
    config
}

fn read_file(path: &Path) -> AppConfig {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return AppConfig::default(),
    };

    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(err) => {
            log::warn!("ignoring malformed config {}: {err}", path.display());
            AppConfig::default()
        }
    }
}

impl AppConfig {
    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(url) = get("ADSCRIBE_API_BASE_URL") {
            let url = url.trim();
            if !url.is_empty() {
                self.api_base_url = url.trim_end_matches('/').to_string();
            }
        }

        if let Some(raw) = get("ADSCRIBE_REQUIRES_AUTH") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.requires_auth = true,
                "0" | "false" | "no" => self.requires_auth = false,
                other => log::warn!("ignoring ADSCRIBE_REQUIRES_AUTH={other}"),
            }
        }

        if let Some(command) = get("ADSCRIBE_DICTATION_COMMAND") {
            if !command.trim().is_empty() {
                self.dictation_command = Some(command);
            }
        }
    }
}
