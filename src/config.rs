//! Persisted monitor settings and centralized runtime constants.
//!
//! [`Config`] is the record stored by the [`ConfigStore`](crate::store::ConfigStore).
//! The option tables below feed the operator menu so the choices offered there
//! live in one place rather than being scattered across modules.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Application identifier used for notifications, autostart entries, and the config dir.
pub const APP_NAME: &str = "linkwatch";

/// Human-readable application title shown in notifications.
pub const APP_TITLE: &str = "Link Monitor";

/// Title of every degraded-speed alert.
pub const ALERT_TITLE: &str = "Link Speed Alert";

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "LINKWATCH_CONFIG";

/// Log file written next to the config file while monitoring.
pub const LOG_FILE_NAME: &str = "linkwatch.log";

/// Seconds a notification tool may run before it is killed.
pub const NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Alerts allowed to wait behind a notification that is still being shown.
pub const ALERT_QUEUE_CAPACITY: usize = 4;

pub const DEFAULT_INTERFACE_NAME: &str = "Ethernet";
pub const DEFAULT_EXPECTED_SPEED_MBPS: u64 = 1000;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_NOTIFICATION_INTERVAL_SECS: u64 = 60;

/// Poll interval choices offered in the menu, as `(label, seconds)`.
pub const CHECK_INTERVAL_OPTIONS: &[(&str, u64)] = &[
    ("10 sec", 10),
    ("1 min", 60),
    ("5 min", 300),
    ("10 min", 600),
    ("30 min", 1800),
    ("1 hour", 3600),
    ("12 hours", 43200),
];

/// Reminder spacing choices offered in the menu, as `(label, seconds)`.
pub const NOTIFICATION_INTERVAL_OPTIONS: &[(&str, u64)] = &[
    ("10 sec", 10),
    ("30 sec", 30),
    ("1 min", 60),
    ("5 min", 300),
    ("10 min", 600),
];

/// Expected link speed choices offered in the menu (Mbps).
pub const SPEED_OPTIONS_MBPS: &[u64] = &[100, 1000, 2500, 5000, 10000];

/// Monitor settings, re-read from storage at the start of every poll tick.
///
/// Fields missing from the persisted file fall back to their defaults, so a
/// hand-edited file containing only `interface_name` is still valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interface_name: String,
    pub expected_speed_mbps: u64,
    pub check_interval_seconds: u64,
    pub notification_interval_seconds: u64,
    #[serde(alias = "start_with_windows")]
    pub start_with_system: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interface_name: DEFAULT_INTERFACE_NAME.to_string(),
            expected_speed_mbps: DEFAULT_EXPECTED_SPEED_MBPS,
            check_interval_seconds: DEFAULT_CHECK_INTERVAL_SECS,
            notification_interval_seconds: DEFAULT_NOTIFICATION_INTERVAL_SECS,
            start_with_system: false,
        }
    }
}

impl Config {
    /// Reject records whose numeric fields are not strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("expected_speed_mbps", self.expected_speed_mbps),
            ("check_interval_seconds", self.check_interval_seconds),
            ("notification_interval_seconds", self.notification_interval_seconds),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be greater than 0")));
            }
        }
        if self.interface_name.trim().is_empty() {
            return Err(ConfigError::Invalid("interface_name must not be empty".into()));
        }
        Ok(())
    }

    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.interface_name, "Ethernet");
        assert_eq!(config.expected_speed_mbps, 1000);
        assert!(!config.start_with_system);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"interface_name": "eth0"}"#).unwrap();
        assert_eq!(config.interface_name, "eth0");
        assert_eq!(config.check_interval_seconds, DEFAULT_CHECK_INTERVAL_SECS);
        assert_eq!(
            config.notification_interval_seconds,
            DEFAULT_NOTIFICATION_INTERVAL_SECS
        );
    }

    #[test]
    fn test_legacy_autostart_key_is_accepted() {
        let config: Config = serde_json::from_str(r#"{"start_with_windows": true}"#).unwrap();
        assert!(config.start_with_system);
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let config = Config {
            check_interval_seconds: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("check_interval_seconds"));

        let config = Config {
            expected_speed_mbps: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_interface_name_is_rejected() {
        let config = Config {
            interface_name: "  ".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    /// Uses const assertions to avoid clippy::assertions_on_constants.
    #[test]
    fn test_all_defaults_positive() {
        const _: () = assert!(DEFAULT_EXPECTED_SPEED_MBPS > 0);
        const _: () = assert!(DEFAULT_CHECK_INTERVAL_SECS > 0);
        const _: () = assert!(DEFAULT_NOTIFICATION_INTERVAL_SECS > 0);
        const _: () = assert!(NOTIFY_TIMEOUT_SECS > 0);
        const _: () = assert!(ALERT_QUEUE_CAPACITY > 0);
    }

    #[test]
    fn test_option_tables_are_positive_and_sorted() {
        for table in [CHECK_INTERVAL_OPTIONS, NOTIFICATION_INTERVAL_OPTIONS] {
            assert!(table.iter().all(|(_, secs)| *secs > 0));
            assert!(table.windows(2).all(|w| w[0].1 < w[1].1));
        }
        assert!(SPEED_OPTIONS_MBPS.windows(2).all(|w| w[0] < w[1]));
    }
}
