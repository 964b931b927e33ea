use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// File name of the optional config inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable overriding the default data directory
pub const DATA_DIR_ENV: &str = "TASKLIST_DIR";

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no data directory: pass -C, set TASKLIST_DIR, or set HOME")]
    NoDataDir,
}

/// Pick the data directory: explicit flag, then `$TASKLIST_DIR`, then
/// `$HOME/.tasklist`.
pub fn resolve_data_dir(explicit: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(|home| PathBuf::from(home).join(".tasklist"))
        .ok_or(ConfigError::NoDataDir)
}

/// Read config.toml from the data directory. A missing file yields defaults.
pub fn read_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    Ok(toml::from_str(&text)?)
}
