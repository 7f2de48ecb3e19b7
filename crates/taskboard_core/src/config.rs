//! Dashboard configuration file.
//!
//! # Responsibility
//! - Load `taskboard.toml` with admin, storage and logging sections.
//! - Fall back to defaults when the file does not exist.
//!
//! # Invariants
//! - A loaded config always has a non-blank admin PIN and a supported log
//!   level.
//!
//! ```toml
//! [admin]
//! pin = "1234"
//!
//! [storage]
//! backend = "local"   # or "remote"
//! path = "/home/me/.taskboard/taskboard.db"
//!
//! [logging]
//! level = "info"
//! dir = "/home/me/.taskboard/logs"
//! ```

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// PIN used when the config file does not set one.
pub const DEFAULT_ADMIN_PIN: &str = "1234";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    pub pin: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            pin: DEFAULT_ADMIN_PIN.to_string(),
        }
    }
}

/// Which persistence variant to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Key-value entries, one JSON list per key.
    #[default]
    Local,
    /// Document collections.
    Remote,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(ConfigError::Invalid(format!(
                "unknown storage backend `{other}`; expected local|remote"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// SQLite file; callers choose a default when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    /// Absolute directory for rolling log files; no file logging when unset.
    pub dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Configured level, or the build-mode default.
    pub fn effective_level(&self) -> &str {
        self.level.as_deref().unwrap_or(default_log_level())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

impl DashboardConfig {
    /// Loads and validates `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.pin.trim().is_empty() {
            return Err(ConfigError::Invalid("admin.pin must not be blank".to_string()));
        }
        if let Some(level) = &self.logging.level {
            normalize_level(level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "logging.dir must be absolute, got `{}`",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, ConfigError, DashboardConfig, LoggingConfig, DEFAULT_ADMIN_PIN};
    use crate::logging::default_log_level;
    use std::io::Write;
    use std::path::Path;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_returns_default() {
        let config = DashboardConfig::load_from(Path::new("/nonexistent/taskboard.toml")).unwrap();
        assert_eq!(config.admin.pin, DEFAULT_ADMIN_PIN);
        assert_eq!(config.storage.backend, BackendKind::Local);
        assert!(config.storage.path.is_none());
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn parse_full_config() {
        let file = write_config(
            r#"
[admin]
pin = "9876"

[storage]
backend = "remote"
path = "/tmp/board.db"

[logging]
level = "warn"
dir = "/tmp/taskboard-logs"
"#,
        );
        let config = DashboardConfig::load_from(file.path()).unwrap();
        assert_eq!(config.admin.pin, "9876");
        assert_eq!(config.storage.backend, BackendKind::Remote);
        assert_eq!(config.storage.path.as_deref(), Some(Path::new("/tmp/board.db")));
        assert_eq!(config.logging.effective_level(), "warn");
    }

    #[test]
    fn unset_level_falls_back_to_build_default() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.effective_level(), default_log_level());

        let config = DashboardConfig::load_from(Path::new("/nonexistent/taskboard.toml")).unwrap();
        assert_eq!(config.logging.effective_level(), default_log_level());
    }

    #[test]
    fn blank_pin_is_rejected() {
        let file = write_config("[admin]\npin = \"  \"\n");
        let err = DashboardConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_fields_and_backends_are_rejected() {
        let unknown_field = write_config("[storage]\nbackend = \"local\"\nmode = \"fast\"\n");
        assert!(matches!(
            DashboardConfig::load_from(unknown_field.path()),
            Err(ConfigError::Parse { .. })
        ));

        let unknown_backend = write_config("[storage]\nbackend = \"cloud\"\n");
        assert!(matches!(
            DashboardConfig::load_from(unknown_backend.path()),
            Err(ConfigError::Parse { .. })
        ));
        assert!("cloud".parse::<BackendKind>().is_err());
        assert_eq!("Remote".parse::<BackendKind>().unwrap(), BackendKind::Remote);
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let file = write_config("[logging]\ndir = \"logs\"\n");
        assert!(matches!(
            DashboardConfig::load_from(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
