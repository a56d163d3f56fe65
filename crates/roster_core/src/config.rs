use std::{collections::HashMap, fs, num::NonZeroU32, path::Path};

use tracing::warn;

pub const DEFAULT_CHILDREN_PER_PAGE: u32 = 5;
pub const SETTINGS_FILE: &str = "roster.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub resource_path: String,
    pub children_per_page: NonZeroU32,
    pub start_page: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".into(),
            resource_path: "childs".into(),
            children_per_page: NonZeroU32::new(DEFAULT_CHILDREN_PER_PAGE)
                .unwrap_or(NonZeroU32::MIN),
            start_page: 1,
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

/// File values override defaults; environment values override the file.
pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("backend_url").and_then(toml::Value::as_str) {
                    settings.backend_url = v.to_string();
                }
                if let Some(v) = file_cfg.get("resource_path").and_then(toml::Value::as_str) {
                    settings.resource_path = v.to_string();
                }
                if let Some(v) = file_cfg.get("children_per_page") {
                    apply_page_size(&mut settings, &value_text(v));
                }
                if let Some(v) = file_cfg.get("start_page") {
                    apply_start_page(&mut settings, &value_text(v));
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    if let Some(v) = env("ROSTER_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = env("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = env("APP__RESOURCE_PATH") {
        settings.resource_path = v;
    }

    if let Some(v) = env("APP__CHILDREN_PER_PAGE") {
        apply_page_size(&mut settings, &v);
    }

    if let Some(v) = env("APP__START_PAGE") {
        apply_start_page(&mut settings, &v);
    }

    settings
}

fn value_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn apply_page_size(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<NonZeroU32>() {
        Ok(parsed) => settings.children_per_page = parsed,
        Err(_) => warn!(
            value = raw,
            "invalid children_per_page; keeping {}", settings.children_per_page
        ),
    }
}

fn apply_start_page(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u32>() {
        Ok(parsed) if parsed >= 1 => settings.start_page = parsed,
        _ => warn!(value = raw, "invalid start_page; keeping {}", settings.start_page),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
