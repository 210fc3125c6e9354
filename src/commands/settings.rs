//! Operator actions that change the persisted config.
//!
//! Each action loads the current config, changes one field, and saves it back.
//! The running monitor picks the change up on its next reload.

use crate::config::Config;
use crate::error::AppError;
use crate::store::ConfigStore;

use super::system;

fn update(
    store: &dyn ConfigStore,
    mutate: impl FnOnce(&mut Config),
) -> Result<Config, AppError> {
    let mut config = store.load()?;
    mutate(&mut config);
    store.save(&config)?;
    Ok(config)
}

fn require_positive(value: u64, what: &str) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::InvalidInput(format!("{what} must be greater than 0")));
    }
    Ok(())
}

pub fn select_interface(store: &dyn ConfigStore, name: &str) -> Result<Config, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Interface name must not be empty".into()));
    }
    let config = update(store, |c| c.interface_name = name.to_string())?;
    tracing::info!("Interface changed to: {name}");
    Ok(config)
}

pub fn set_expected_speed(store: &dyn ConfigStore, speed_mbps: u64) -> Result<Config, AppError> {
    require_positive(speed_mbps, "Expected speed")?;
    let config = update(store, |c| c.expected_speed_mbps = speed_mbps)?;
    tracing::info!("Expected speed set to {speed_mbps} Mbps");
    Ok(config)
}

pub fn set_check_interval(store: &dyn ConfigStore, secs: u64) -> Result<Config, AppError> {
    require_positive(secs, "Check interval")?;
    let config = update(store, |c| c.check_interval_seconds = secs)?;
    tracing::info!("Check interval set to {secs} seconds");
    Ok(config)
}

pub fn set_notification_interval(store: &dyn ConfigStore, secs: u64) -> Result<Config, AppError> {
    require_positive(secs, "Notification interval")?;
    let config = update(store, |c| c.notification_interval_seconds = secs)?;
    tracing::info!("Notification interval set to {secs} seconds");
    Ok(config)
}

/// Persist the start-with-system flag, then register or remove the OS entry.
///
/// The flag is saved first so a failed OS call can be retried from the menu
/// and is re-synced on the next start.
pub fn set_autostart(store: &dyn ConfigStore, enabled: bool) -> Result<Config, AppError> {
    let config = update(store, |c| c.start_with_system = enabled)?;
    system::apply_autostart(enabled)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;

    fn store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("config.json"));
        (dir, store)
    }

    #[test]
    fn test_select_interface_persists() {
        let (_dir, store) = store();
        let config = select_interface(&store, " enp3s0 ").unwrap();
        assert_eq!(config.interface_name, "enp3s0");
        assert_eq!(store.load().unwrap().interface_name, "enp3s0");
    }

    #[test]
    fn test_numeric_setters_persist_and_keep_other_fields() {
        let (_dir, store) = store();
        select_interface(&store, "eth1").unwrap();
        set_expected_speed(&store, 2500).unwrap();
        set_check_interval(&store, 10).unwrap();
        set_notification_interval(&store, 300).unwrap();

        let config = store.load().unwrap();
        assert_eq!(
            config,
            Config {
                interface_name: "eth1".into(),
                expected_speed_mbps: 2500,
                check_interval_seconds: 10,
                notification_interval_seconds: 300,
                start_with_system: false,
            }
        );
    }

    #[test]
    fn test_zero_and_empty_inputs_are_rejected_without_writing() {
        let (_dir, store) = store();
        let before = store.load().unwrap();

        assert_eq!(set_expected_speed(&store, 0).unwrap_err().kind(), "InvalidInput");
        assert_eq!(set_check_interval(&store, 0).unwrap_err().kind(), "InvalidInput");
        assert_eq!(
            set_notification_interval(&store, 0).unwrap_err().kind(),
            "InvalidInput"
        );
        assert_eq!(select_interface(&store, "   ").unwrap_err().kind(), "InvalidInput");

        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn test_corrupt_config_surfaces_instead_of_overwriting() {
        let (_dir, store) = store();
        store.load().unwrap();
        std::fs::write(store.path(), "[]").unwrap();

        let err = set_expected_speed(&store, 100).unwrap_err();
        assert_eq!(err.kind(), "Config");
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
    }
}
