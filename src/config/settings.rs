//! User settings for Tally
//!
//! Stored as `config.json` in the base directory. Every field has a serde
//! default so older or hand-written files keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::paths::TallyPaths;
use crate::error::TallyError;
use crate::models::DEFAULT_WARNING_THRESHOLD;

/// Environment variable overriding the ledger file
pub const LEDGER_FILE_ENV: &str = "TALLY_LEDGER_FILE";

/// User settings for Tally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Percentage of a budget at which it is flagged as a warning
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u8,

    /// Currency used for new items when none is given
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Plain-text ledger to read spending from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_file: Option<PathBuf>,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_warning_threshold() -> u8 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_currency() -> String {
    "CNY".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            warning_threshold: default_warning_threshold(),
            default_currency: default_currency(),
            ledger_file: None,
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &TallyPaths) -> Result<Self, TallyError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            // Don't save yet - let caller decide when to persist
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| TallyError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| TallyError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &TallyPaths) -> Result<(), TallyError> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| TallyError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| TallyError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), TallyError> {
        if !(1..=100).contains(&self.warning_threshold) {
            return Err(TallyError::Config(format!(
                "warning_threshold must be between 1 and 100, got {}",
                self.warning_threshold
            )));
        }
        if self.default_currency.trim().is_empty() {
            return Err(TallyError::Config("default_currency cannot be empty".into()));
        }
        Ok(())
    }

    /// Ledger file to use: explicit override, then the environment, then the
    /// configured path
    pub fn resolve_ledger_file(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        match std::env::var(LEDGER_FILE_ENV) {
            Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
            _ => self.ledger_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.warning_threshold, 80);
        assert_eq!(settings.default_currency, "CNY");
        assert!(settings.ledger_file.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            warning_threshold: 90,
            ledger_file: Some(PathBuf::from("/tmp/main.beancount")),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"warning_threshold": 75}"#).unwrap();
        assert_eq!(settings.warning_threshold, 75);
        assert_eq!(settings.default_currency, "CNY");
        assert_eq!(settings.schema_version, 1);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            warning_threshold: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.save(&paths), Err(TallyError::Config(_))));

        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"warning_threshold": 150}"#).unwrap();
        assert!(Settings::load_or_create(&paths).is_err());
    }

    #[test]
    fn test_explicit_ledger_wins() {
        let settings = Settings {
            ledger_file: Some(PathBuf::from("configured.beancount")),
            ..Settings::default()
        };
        let explicit = PathBuf::from("explicit.beancount");
        assert_eq!(
            settings.resolve_ledger_file(Some(&explicit)),
            Some(explicit.clone())
        );
    }
}
