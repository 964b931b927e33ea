use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ops::theme::ThemeMode;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// What "follow system" resolves to. Absent = ask the terminal.
    #[serde(default)]
    pub system_theme: Option<ThemeMode>,
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Per-mode hex color overrides
    #[serde(default)]
    pub colors: ThemeColors,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            system_theme: None,
            show_key_hints: true,
            colors: ThemeColors::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeColors {
    #[serde(default)]
    pub dark: HashMap<String, String>,
    #[serde(default)]
    pub light: HashMap<String, String>,
}

impl ThemeColors {
    pub fn for_mode(&self, mode: ThemeMode) -> &HashMap<String, String> {
        match mode {
            ThemeMode::Dark => &self.dark,
            ThemeMode::Light => &self.light,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default: info
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
