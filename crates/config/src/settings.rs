// Application settings
// Loaded from ~/.config/scriptedit/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // API
    /// Overrides the API base saved with the credentials
    #[serde(rename = "api.baseUrl")]
    pub api_base_url: Option<String>,

    #[serde(rename = "api.timeoutSecs")]
    pub api_timeout_secs: u64,

    // Editor
    #[serde(rename = "editor.tabWidth")]
    pub tab_width: usize,

    #[serde(rename = "editor.showHelpText")]
    pub show_help_text: bool,

    // Session
    /// Ask the calling list view to reload after a successful save
    #[serde(rename = "session.refetchAfterSave")]
    pub refetch_after_save: bool,

    #[serde(rename = "session.pollIntervalMs")]
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_timeout_secs: 30,
            tab_width: 4,
            show_help_text: true,
            refetch_after_save: true,
            poll_interval_ms: 100,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // API ("api.baseUrl": null = use the URL saved by `scriptedit login`)
    "api.baseUrl": null,
    "api.timeoutSecs": 30,

    // Editor
    "editor.tabWidth": 4,
    "editor.showHelpText": true,

    // Session
    "session.refetchAfterSave": true,
    "session.pollIntervalMs": 100
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        crate::config_dir().join("settings.json")
    }

    /// Load settings from disk, falling back to defaults.
    /// Writes a commented default file on first run.
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            create_default_file(&path);
            return Self::default();
        }

        Self::load_from(&path)
    }

    /// Load settings from an explicit path. Never fails: unreadable or
    /// malformed files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                log::warn!("Error parsing {}: {} (using default settings)", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Serialize to `path`. Settings are user-edited; only tests write them.
    #[cfg(test)]
    fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.clamp(10, 1_000))
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }
    }

    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("Error writing default settings.json: {}", e);
    }
}
