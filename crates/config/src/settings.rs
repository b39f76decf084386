// User settings
// Loaded from <config dir>/catcher/settings.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the settings file location.
pub const SETTINGS_ENV: &str = "CATCHER_SETTINGS";

#[derive(Debug)]
pub enum SettingsError {
    Read(PathBuf, String),
    Parse(PathBuf, String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Read(path, msg) => write!(f, "cannot read {}: {}", path.display(), msg),
            SettingsError::Parse(path, msg) => write!(f, "invalid settings in {}: {}", path.display(), msg),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Lowest-precedence defaults; command-line flags and environment
/// variables win over every value here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Collection management server base URL
    pub cdm_url: Option<String>,

    /// Transcription platform base URL
    pub ftp_url: Option<String>,

    /// Joins multiple values of one field
    pub separator: Option<String>,

    /// Table delimiter, a single character
    pub delimiter: Option<char>,

    /// Table encoding label
    pub encoding: Option<String>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catcher")
            .join("settings.toml")
    }

    /// Load settings from the default location. A missing file yields defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| SettingsError::Read(path.to_path_buf(), e.to_string()))?;
        Self::from_toml(&contents).map_err(|msg| SettingsError::Parse(path.to_path_buf(), msg))
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_known_keys() {
        let settings = Settings::from_toml(
            r#"
cdm_url = "https://cdm.example.org"
separator = " | "
delimiter = "\t"
"#,
        )
        .unwrap();
        assert_eq!(settings.cdm_url.as_deref(), Some("https://cdm.example.org"));
        assert_eq!(settings.separator.as_deref(), Some(" | "));
        assert_eq!(settings.delimiter, Some('\t'));
        assert_eq!(settings.ftp_url, None);
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Settings::from_toml("cdm_uri = \"x\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "cdm_url = [").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("settings.toml"));
    }
}
