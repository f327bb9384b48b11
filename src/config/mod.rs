//! Configuration management for the offjournal application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. Every store receives its paths from a `Config`
//! value at construction; nothing reads a process-wide path.
//!
//! # Environment Variables
//!
//! - `OFFJOURNAL_DIR`: Path to the data directory (defaults to ~/.offjournal)
//! - `OFFJOURNAL_LANG`: Language of the mood vocabulary, `pt` (default) or `en`
//! - `HOME`: Used for expanding the default data directory path

use crate::constants;
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Language of the fixed keyword vocabulary used for mood analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// Brazilian Portuguese, the store's original vocabulary.
    #[default]
    Portuguese,
    /// English.
    English,
}

impl FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" | "portuguese" => Ok(Language::Portuguese),
            "en" | "en-us" | "en_us" | "english" => Ok(Language::English),
            other => Err(AppError::Config(format!(
                "Unsupported language '{}'. Use 'pt' or 'en'",
                other
            ))),
        }
    }
}

/// Configuration for the offjournal application.
///
/// # Examples
///
/// Creating a configuration for an explicit root directory:
/// ```
/// use offjournal::Config;
/// use std::path::PathBuf;
///
/// let config = Config::with_root("/tmp/offjournal");
/// assert_eq!(config.planner_path(), PathBuf::from("/tmp/offjournal/planner.json"));
/// assert_eq!(config.entries_dir(), PathBuf::from("/tmp/offjournal/entries"));
/// ```
#[derive(Clone)]
pub struct Config {
    /// Root directory of the store (the planner document lives here).
    ///
    /// This is loaded from the OFFJOURNAL_DIR environment variable with a fallback
    /// to ~/.offjournal if not specified.
    pub data_dir: PathBuf,

    /// Language of the mood vocabulary.
    pub language: Language,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data_dir", &constants::REDACTED_PLACEHOLDER)
            .field("language", &self.language)
            .finish()
    }
}

impl Config {
    /// Creates a configuration rooted at `data_dir` with default settings.
    ///
    /// This is the constructor tests use to get isolated store instances.
    pub fn with_root(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            data_dir: data_dir.into(),
            language: Language::default(),
        }
    }

    /// Directory holding entry files.
    pub fn entries_dir(&self) -> PathBuf {
        self.data_dir.join(constants::ENTRIES_SUBDIR)
    }

    /// Directory holding per-entry attachment directories.
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir.join(constants::MEDIA_SUBDIR)
    }

    /// The planner JSON document.
    pub fn planner_path(&self) -> PathBuf {
        self.data_dir.join(constants::PLANNER_FILE_NAME)
    }

    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The data directory path is expanded using `shellexpand` to handle `~`
    /// and environment variable references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The data directory path expansion fails
    /// - The data directory path is empty
    /// - `OFFJOURNAL_LANG` names an unsupported language
    pub fn load() -> AppResult<Self> {
        let data_dir_str = env::var(constants::ENV_VAR_OFFJOURNAL_DIR).unwrap_or_else(|_| {
            let home = env::var(constants::ENV_VAR_HOME).unwrap_or_default();
            format!("{}/{}", home, constants::DEFAULT_DATA_SUBDIR)
        });

        let expanded_path = shellexpand::full(&data_dir_str)
            .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;

        let data_dir = PathBuf::from(expanded_path.into_owned());

        if data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        let language = match env::var(constants::ENV_VAR_OFFJOURNAL_LANG) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => Language::default(),
        };

        Ok(Config { data_dir, language })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Data directory path is empty" if the data directory path is empty
    /// - "Data directory must be an absolute path" if the path is relative
    ///
    /// # Examples
    ///
    /// ```
    /// use offjournal::Config;
    ///
    /// assert!(Config::with_root("/absolute/path").validate().is_ok());
    /// assert!(Config::with_root("relative/path").validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("Data directory path is empty".to_string()));
        }

        if !self.data_dir.is_absolute() {
            return Err(AppError::Config(
                "Data directory must be an absolute path".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn setup() {
        env::remove_var(constants::ENV_VAR_OFFJOURNAL_DIR);
        env::remove_var(constants::ENV_VAR_OFFJOURNAL_LANG);
    }

    #[test]
    fn test_debug_impl_redacts_paths() {
        let config = Config::with_root("/home/username/private/journal");

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("/home/username/private/journal"));
    }

    #[test]
    fn test_derived_paths() {
        let config = Config::with_root("/data");
        assert_eq!(config.entries_dir(), PathBuf::from("/data/entries"));
        assert_eq!(config.media_dir(), PathBuf::from("/data/media"));
        assert_eq!(config.planner_path(), PathBuf::from("/data/planner.json"));
        assert_eq!(config.data_dir(), Path::new("/data"));
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("pt".parse::<Language>().unwrap(), Language::Portuguese);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" english ".parse::<Language>().unwrap(), Language::English);
        match "fr".parse::<Language>() {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unsupported language 'fr'")),
            _ => panic!("Expected Config error for unsupported language"),
        }
    }

    #[test]
    #[serial]
    fn test_load_with_custom_dir() {
        setup();
        let orig_dir = env::var(constants::ENV_VAR_OFFJOURNAL_DIR).ok();

        let temp_dir = tempdir().unwrap();
        let dir_path = temp_dir.path().to_string_lossy().to_string();

        env::set_var(constants::ENV_VAR_OFFJOURNAL_DIR, &dir_path);
        let config = Config::load().unwrap();

        match orig_dir {
            Some(val) => env::set_var(constants::ENV_VAR_OFFJOURNAL_DIR, val),
            None => env::remove_var(constants::ENV_VAR_OFFJOURNAL_DIR),
        }

        assert_eq!(config.data_dir, PathBuf::from(dir_path));
        assert_eq!(config.language, Language::Portuguese);
    }

    #[test]
    #[serial]
    fn test_load_falls_back_to_home() {
        setup();
        let orig_home = env::var(constants::ENV_VAR_HOME).ok();

        let temp_dir = tempdir().unwrap();
        let home_path = temp_dir.path().to_string_lossy().to_string();
        env::set_var(constants::ENV_VAR_HOME, &home_path);

        let config = Config::load().unwrap();

        match orig_home {
            Some(val) => env::set_var(constants::ENV_VAR_HOME, val),
            None => env::remove_var(constants::ENV_VAR_HOME),
        }

        assert_eq!(
            config.data_dir,
            PathBuf::from(&home_path).join(".offjournal")
        );
    }

    #[test]
    #[serial]
    fn test_load_with_language() {
        setup();
        env::set_var(constants::ENV_VAR_OFFJOURNAL_DIR, "/tmp/offjournal-lang");

        env::set_var(constants::ENV_VAR_OFFJOURNAL_LANG, "en");
        assert_eq!(Config::load().unwrap().language, Language::English);

        env::set_var(constants::ENV_VAR_OFFJOURNAL_LANG, "klingon");
        assert!(matches!(Config::load(), Err(AppError::Config(_))));

        setup();
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let config = Config::with_root("");
        match config.validate() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("Data directory path is empty"))
            }
            _ => panic!("Expected Config error about empty data directory"),
        }
    }

    #[test]
    fn test_validate_relative_data_dir() {
        let config = Config::with_root("relative/path");
        match config.validate() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("must be an absolute path"))
            }
            _ => panic!("Expected Config error about relative path"),
        }
    }
}
