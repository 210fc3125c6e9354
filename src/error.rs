//! Error types shared across the monitor, the config store, and the operator commands.
//!
//! `ConfigError` covers every way the persisted settings can fail to load or save.
//! `AppError` is the single error type returned by operator commands and by a
//! monitor tick. It serializes as `{ "kind": "...", "message": "..." }` so
//! `--json` output can distinguish error categories.

use std::path::PathBuf;

use serde::ser::SerializeStruct;

/// Failure reading, parsing, validating, or writing the persisted config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Application-level error.
///
/// Each variant maps to a distinct failure domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The persisted settings could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O and OS-level errors (filesystem, process spawning).
    #[error("{0}")]
    Io(String),

    /// Invalid or missing operator input.
    #[error("{0}")]
    InvalidInput(String),

    /// The interface statistics backend failed.
    #[error("{0}")]
    Stats(String),

    /// Alert delivery failed.
    #[error("{0}")]
    Notify(String),

    /// Registering or removing the start-with-system entry failed.
    #[error("{0}")]
    Autostart(String),
}

impl AppError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::Io(_) => "Io",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Stats(_) => "Stats",
            AppError::Notify(_) => "Notify",
            AppError::Autostart(_) => "Autostart",
        }
    }
}

/// Custom Serialize: produces `{ "kind": "Variant", "message": "..." }`.
impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("kind", self.kind())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

// ---- From implementations for ergonomic error conversion ----

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Stats(format!("{err:#}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_returns_correct_variant_name() {
        assert_eq!(
            AppError::Config(ConfigError::Invalid("x".into())).kind(),
            "Config"
        );
        assert_eq!(AppError::Io("io fail".into()).kind(), "Io");
        assert_eq!(
            AppError::InvalidInput("bad input".into()).kind(),
            "InvalidInput"
        );
        assert_eq!(AppError::Stats("no sysfs".into()).kind(), "Stats");
        assert_eq!(AppError::Notify("no daemon".into()).kind(), "Notify");
        assert_eq!(AppError::Autostart("denied".into()).kind(), "Autostart");
    }

    #[test]
    fn test_config_error_display_names_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("/tmp/linkwatch/config.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/linkwatch/config.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_config_error_is_transparent_in_app_error() {
        let err: AppError = ConfigError::Invalid("expected_speed_mbps must be greater than 0".into()).into();
        assert_eq!(
            err.to_string(),
            "invalid config: expected_speed_mbps must be greater than 0"
        );
    }

    #[test]
    fn test_error_serializes_as_kind_and_message() {
        let err = AppError::Autostart("registry write refused".into());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "Autostart");
        assert_eq!(json["message"], "registry write refused");
    }

    #[test]
    fn test_from_anyhow_produces_stats_variant_with_context() {
        let anyhow_err = anyhow::anyhow!("permission denied").context("reading /sys/class/net/eth0/speed");
        let app_err: AppError = anyhow_err.into();
        assert_eq!(app_err.kind(), "Stats");
        assert!(app_err.to_string().contains("reading /sys/class/net/eth0/speed"));
        assert!(app_err.to_string().contains("permission denied"));
    }

    #[test]
    fn test_from_io_error_produces_io_variant() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let app_err: AppError = io_err.into();
        assert_eq!(app_err.kind(), "Io");
        assert!(app_err.to_string().contains("file missing"));
    }
}
