//! User settings, read from `palosheet.toml`.
//!
//! ```toml
//! splashing_allowed = true
//! error_descriptions = false
//! default_server = "localhost"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;

const MAX_SETTINGS_FILE_BYTES: u64 = 65_536; // 64 KiB

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// When false, writes never splash into consolidated cells.
    pub splashing_allowed: bool,
    /// Include descriptions in error values returned to the sheet.
    pub error_descriptions: bool,
    /// Server used when a connection argument names only a database.
    pub default_server: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            splashing_allowed: true,
            error_descriptions: false,
            default_server: None,
        }
    }
}

/// Load settings from `settings_file`, or from the user config directory.
///
/// Never fails: problems are reported as warnings and the defaults are used.
pub fn load_settings(settings_file: Option<&PathBuf>) -> (Settings, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = settings_file.cloned().or_else(user_settings_path) else {
        return (Settings::default(), warnings);
    };

    if !path.exists() {
        if settings_file.is_some() {
            warnings.push(format!("Settings file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    let settings = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_SETTINGS_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_SETTINGS_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Settings>(&content) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warnings.push(format!("Failed to parse {}: {}", path.display(), err));
                    None
                }
            },
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    let mut settings = settings.unwrap_or_default();
    if let Some(server) = settings.default_server.as_deref()
        && server.trim().is_empty()
    {
        warnings.push("Ignoring empty default_server".to_string());
        settings.default_server = None;
    }
    tracing::debug!(path = %path.display(), warnings = warnings.len(), "settings loaded");
    (settings, warnings)
}

/// Write settings as TOML, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}

pub fn user_settings_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "palosheet")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("palosheet.toml");
    Some(path)
}
