//! User configuration (`dly.yml`).
//!
//! # Responsibility
//! - Locate the configuration directory (`~/.config/dly` by default).
//! - Bootstrap a default file on first run.
//! - Parse and validate the YAML settings.
//!
//! # Invariants
//! - A freshly created default file is never used as-is: the caller must stop
//!   and let the user set `DailyNotesPath`.
//! - A `Config` returned by [`load_config`] has passed [`Config::validate`].
//!
//! # See also
//! - `crate::entry::EntryFormat` for how formatting options are consumed.

use crate::entry::{normalize_hashtag, EntryFormat};
use crate::note::is_valid_filename_pattern;
use crate::writer::BackupLocations;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "dly.yml";
/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "DLY_CONFIG_DIR";
/// Placeholder written to a fresh configuration file.
pub const NOTES_PATH_PLACEHOLDER: &str = "YOU MUST SET THIS to your journal folder";

const APP_DIR_NAME: &str = "dly";

static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s#]+$").expect("valid hashtag regex"));

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    /// Home directory could not be determined.
    HomeNotFound,
    /// Configuration file or directory I/O failure.
    Io { path: PathBuf, source: io::Error },
    /// YAML could not be parsed.
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// YAML could not be produced for the default file.
    Serialize(serde_yaml::Error),
    /// `DailyNotesPath` is empty or still the placeholder.
    NotesPathUnset,
    /// `FilenameFormat` is not a usable date pattern.
    InvalidFilenameFormat(String),
    /// Hashtag contains whitespace or `#`.
    InvalidHashtag(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HomeNotFound => write!(
                f,
                "home directory is not set, cannot locate the configuration"
            ),
            Self::Io { path, source } => {
                write!(f, "configuration I/O failed at {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse configuration {}: {source}", path.display())
            }
            Self::Serialize(err) => write!(f, "cannot serialize default configuration: {err}"),
            Self::NotesPathUnset => write!(
                f,
                "DailyNotesPath is not set, edit {CONFIG_FILE_NAME} to point at your journal folder"
            ),
            Self::InvalidFilenameFormat(value) => {
                write!(f, "invalid FilenameFormat: `{value}`")
            }
            Self::InvalidHashtag(value) => write!(f, "invalid hashtag: `{value}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

/// Settings read from `dly.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    /// Folder holding the daily notes.
    pub daily_notes_path: PathBuf,
    /// chrono strftime pattern for note file names (without extension).
    pub filename_format: String,
    pub add_timestamp: bool,
    /// Tag appended to every entry; empty disables it.
    pub append_hashtag: String,
    pub show_notification_on_success: bool,
    pub show_notification_on_new_version: bool,
    /// Ordered backup directories; platform defaults when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_directories: Option<Vec<PathBuf>>,
    /// Deprecated: use `AppendHashtag`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_hashtag: Option<bool>,
    /// Deprecated: use `AppendHashtag`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtag_to_add: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_notes_path: PathBuf::from(NOTES_PATH_PLACEHOLDER),
            filename_format: "%Y_%m_%d".to_string(),
            add_timestamp: true,
            append_hashtag: "from-cli".to_string(),
            show_notification_on_success: true,
            show_notification_on_new_version: true,
            backup_directories: None,
            add_hashtag: None,
            hashtag_to_add: None,
        }
    }
}

/// Effective hashtag and whether it came from the deprecated keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHashtag {
    pub tag: Option<String>,
    pub from_legacy_keys: bool,
}

impl Config {
    /// Resolves the hashtag: `AppendHashtag` first, then the legacy
    /// `AddHashtag`/`HashtagToAdd` pair.
    pub fn resolved_hashtag(&self) -> ResolvedHashtag {
        if let Some(tag) = normalize_hashtag(&self.append_hashtag) {
            return ResolvedHashtag {
                tag: Some(tag),
                from_legacy_keys: false,
            };
        }
        if self.add_hashtag == Some(true) {
            let tag = self.hashtag_to_add.as_deref().and_then(normalize_hashtag);
            return ResolvedHashtag {
                from_legacy_keys: tag.is_some(),
                tag,
            };
        }
        ResolvedHashtag {
            tag: None,
            from_legacy_keys: false,
        }
    }

    pub fn entry_format(&self) -> EntryFormat {
        EntryFormat {
            add_timestamp: self.add_timestamp,
            hashtag: self.resolved_hashtag().tag,
        }
    }

    pub fn backup_locations(&self) -> BackupLocations {
        match &self.backup_directories {
            Some(dirs) => BackupLocations::new(dirs.iter().cloned()),
            None => BackupLocations::platform_default(),
        }
    }

    /// Checks the settings needed to append an entry.
    pub fn validate(&self) -> ConfigResult<()> {
        let notes_path = self.daily_notes_path.as_os_str();
        if notes_path.is_empty() || notes_path == NOTES_PATH_PLACEHOLDER {
            return Err(ConfigError::NotesPathUnset);
        }
        if !is_valid_filename_pattern(&self.filename_format) {
            return Err(ConfigError::InvalidFilenameFormat(
                self.filename_format.clone(),
            ));
        }
        if let Some(tag) = self.resolved_hashtag().tag {
            if !HASHTAG_RE.is_match(&tag) {
                return Err(ConfigError::InvalidHashtag(tag));
            }
        }
        Ok(())
    }
}

/// Outcome of [`load_config`].
#[derive(Debug)]
pub enum ConfigLoad {
    /// Existing file parsed and validated.
    Loaded(Config),
    /// No file existed; a default one was written at this path.
    Created(PathBuf),
}

/// Default configuration directory: `$DLY_CONFIG_DIR`, else `~/.config/dly`.
pub fn default_config_dir() -> ConfigResult<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs_next::home_dir().ok_or(ConfigError::HomeNotFound)?;
    Ok(home.join(".config").join(APP_DIR_NAME))
}

/// Loads `dly.yml` from `config_dir`, creating a default file when missing.
pub fn load_config(config_dir: &Path) -> ConfigResult<ConfigLoad> {
    let path = config_dir.join(CONFIG_FILE_NAME);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let created = write_default_config(config_dir)?;
            return Ok(ConfigLoad::Created(created));
        }
        Err(source) => return Err(ConfigError::Io { path, source }),
    };

    let config = parse_config(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    config.validate()?;
    Ok(ConfigLoad::Loaded(config))
}

/// Parses YAML text; missing keys take their default values.
pub fn parse_config(raw: &str) -> Result<Config, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(raw)
}

fn write_default_config(config_dir: &Path) -> ConfigResult<PathBuf> {
    std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Io {
        path: config_dir.to_path_buf(),
        source,
    })?;
    let path = config_dir.join(CONFIG_FILE_NAME);
    let body = serde_yaml::to_string(&Config::default()).map_err(ConfigError::Serialize)?;
    std::fs::write(&path, body).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::{parse_config, Config, ConfigError};
    use std::path::PathBuf;

    fn configured() -> Config {
        Config {
            daily_notes_path: PathBuf::from("/journal"),
            ..Config::default()
        }
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = parse_config("DailyNotesPath: /journal\nAddTimestamp: false\n").unwrap();
        assert_eq!(config.daily_notes_path, PathBuf::from("/journal"));
        assert!(!config.add_timestamp);
        assert_eq!(config.filename_format, "%Y_%m_%d");
        assert_eq!(config.append_hashtag, "from-cli");
    }

    #[test]
    fn placeholder_notes_path_is_rejected() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotesPathUnset));
    }

    #[test]
    fn hashtag_with_space_is_rejected() {
        let config = Config {
            append_hashtag: "two words".to_string(),
            ..configured()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidHashtag(_)
        ));
    }

    #[test]
    fn filename_format_with_time_fields_validates() {
        let config = Config {
            filename_format: "%Y_%m_%d_%H".to_string(),
            ..configured()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn filename_format_with_offset_is_rejected() {
        let config = Config {
            filename_format: "%Y_%m_%d_%Z".to_string(),
            ..configured()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::InvalidFilenameFormat(_)
        ));
    }

    #[test]
    fn empty_append_hashtag_disables_tag() {
        let config = Config {
            append_hashtag: String::new(),
            ..configured()
        };
        assert_eq!(config.entry_format().hashtag, None);
    }

    #[test]
    fn legacy_hashtag_keys_are_honored_when_append_hashtag_is_empty() {
        let config = Config {
            append_hashtag: String::new(),
            add_hashtag: Some(true),
            hashtag_to_add: Some("#old".to_string()),
            ..configured()
        };
        let resolved = config.resolved_hashtag();
        assert_eq!(resolved.tag.as_deref(), Some("old"));
        assert!(resolved.from_legacy_keys);
    }
}
