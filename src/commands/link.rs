//! Read-only link queries: interface listing, current speed, and the menu snapshot.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::{classify, Classification};
use crate::error::AppError;
use crate::stats::{format_link_speed, InterfaceSample, InterfaceStatsProvider};
use crate::store::ConfigStore;

use super::logic::{build_menu, MenuEntry};

/// Snapshot of the configured interface for `status` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    pub interface: String,
    pub expected_speed_mbps: u64,
    /// `"<n> Mbps"` or `"Unknown"`.
    pub current_speed: String,
    /// `None` when the interface is absent.
    pub is_up: Option<bool>,
    /// `None` when absent or down.
    pub degraded: Option<bool>,
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match (self.is_up, self.degraded) {
            (None, _) => "not present",
            (Some(false), _) => "down",
            (Some(true), Some(true)) => "DEGRADED",
            (Some(true), _) => "ok",
        };
        write!(
            f,
            "{}: {} (expected {} Mbps) - {state}",
            self.interface, self.current_speed, self.expected_speed_mbps
        )
    }
}

pub fn list_interfaces(provider: &dyn InterfaceStatsProvider) -> Result<BTreeSet<String>, AppError> {
    Ok(provider.list_interface_names()?)
}

/// Sample `name`, treating backend errors as "absent" the way the monitor does.
fn sample_or_absent(provider: &dyn InterfaceStatsProvider, name: &str) -> Option<InterfaceSample> {
    match provider.sample(name) {
        Ok(sample) => sample,
        Err(e) => {
            tracing::debug!(interface = name, "Link speed query failed: {e:#}");
            None
        }
    }
}

pub fn current_link_speed(provider: &dyn InterfaceStatsProvider, name: &str) -> String {
    format_link_speed(sample_or_absent(provider, name).as_ref())
}

pub fn link_status(
    store: &dyn ConfigStore,
    provider: &dyn InterfaceStatsProvider,
) -> Result<LinkStatus, AppError> {
    let config = store.load()?;
    let sample = sample_or_absent(provider, &config.interface_name);
    let degraded = sample.as_ref().and_then(|s| {
        match classify(s.is_up, s.speed_mbps, config.expected_speed_mbps) {
            Classification::Degraded => Some(true),
            Classification::Normal => Some(false),
            Classification::Unchanged => None,
        }
    });

    Ok(LinkStatus {
        current_speed: format_link_speed(sample.as_ref()),
        is_up: sample.as_ref().map(|s| s.is_up),
        degraded,
        expected_speed_mbps: config.expected_speed_mbps,
        interface: config.interface_name,
    })
}

/// Build the menu from a freshly loaded config and a fresh interface listing.
pub fn current_menu(
    store: &dyn ConfigStore,
    provider: &dyn InterfaceStatsProvider,
) -> Result<Vec<MenuEntry>, AppError> {
    let config = store.load()?;
    let interfaces = provider.list_interface_names().unwrap_or_else(|e| {
        tracing::warn!("Failed to list interfaces: {e:#}");
        BTreeSet::new()
    });
    let speed = current_link_speed(provider, &config.interface_name);
    Ok(build_menu(&config, &interfaces, &speed))
}
