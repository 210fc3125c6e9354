//! Interface up/down state and negotiated link speed.
//!
//! Enumeration goes through `sysinfo`; the speed query is platform-specific:
//! - Linux: sysfs (`sysfs`)
//! - Windows: `Get-NetAdapter` via PowerShell (`windows_backend`)

pub mod sysfs;
pub mod windows_backend;

use std::collections::BTreeSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::Networks;

pub use sysfs::SysfsStatsProvider;

/// Point-in-time view of one interface. Produced and consumed within a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceSample {
    pub name: String,
    pub is_up: bool,
    /// Negotiated speed in Mbps; 0 when the OS does not report one.
    pub speed_mbps: u64,
    pub observed_at: DateTime<Utc>,
}

/// Source of interface snapshots.
pub trait InterfaceStatsProvider: Send + Sync {
    fn list_interface_names(&self) -> Result<BTreeSet<String>>;

    /// `Ok(None)` when the interface does not exist right now.
    fn sample(&self, name: &str) -> Result<Option<InterfaceSample>>;
}

/// Host provider: `sysinfo` for enumeration, the platform backend for samples.
pub struct SystemStatsProvider {
    #[cfg(target_os = "linux")]
    sysfs: SysfsStatsProvider,
}

impl SystemStatsProvider {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "linux")]
            sysfs: SysfsStatsProvider::system(),
        }
    }
}

impl Default for SystemStatsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceStatsProvider for SystemStatsProvider {
    fn list_interface_names(&self) -> Result<BTreeSet<String>> {
        let networks = Networks::new_with_refreshed_list();
        Ok((&networks).into_iter().map(|(name, _)| name.clone()).collect())
    }

    #[cfg(target_os = "linux")]
    fn sample(&self, name: &str) -> Result<Option<InterfaceSample>> {
        self.sysfs.sample(name)
    }

    #[cfg(target_os = "windows")]
    fn sample(&self, name: &str) -> Result<Option<InterfaceSample>> {
        windows_backend::sample(name)
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    fn sample(&self, name: &str) -> Result<Option<InterfaceSample>> {
        anyhow::bail!("link speed queries are not supported on this platform (interface {name})")
    }
}

/// Parse an adapter speed string such as `"2.5 Gbps"` or `"100 Mbps"` into Mbps.
pub fn parse_link_speed(link_speed: &str) -> Option<u64> {
    let speed = link_speed.trim().to_lowercase();
    let (number, scale) = if let Some(n) = speed.strip_suffix("gbps") {
        (n, 1000.0)
    } else if let Some(n) = speed.strip_suffix("mbps") {
        (n, 1.0)
    } else if let Some(n) = speed.strip_suffix("kbps") {
        (n, 0.001)
    } else if let Some(n) = speed.strip_suffix("bps") {
        (n, 0.000_001)
    } else {
        return None;
    };
    let value: f64 = number.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * scale).round() as u64)
}

/// Operator-facing rendering of a sampled speed.
pub fn format_link_speed(sample: Option<&InterfaceSample>) -> String {
    match sample {
        Some(s) if s.speed_mbps > 0 => format!("{} Mbps", s.speed_mbps),
        _ => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed: u64) -> InterfaceSample {
        InterfaceSample {
            name: "eth0".into(),
            is_up: true,
            speed_mbps: speed,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_link_speed_units() {
        assert_eq!(parse_link_speed("1 Gbps"), Some(1000));
        assert_eq!(parse_link_speed("2.5 Gbps"), Some(2500));
        assert_eq!(parse_link_speed("100 Mbps"), Some(100));
        assert_eq!(parse_link_speed(" 10 mbps "), Some(10));
        assert_eq!(parse_link_speed("0 bps"), Some(0));
    }

    #[test]
    fn test_parse_link_speed_rejects_garbage() {
        assert_eq!(parse_link_speed(""), None);
        assert_eq!(parse_link_speed("fast"), None);
        assert_eq!(parse_link_speed("-1 Mbps"), None);
        assert_eq!(parse_link_speed("Gbps"), None);
    }

    #[test]
    fn test_format_link_speed() {
        assert_eq!(format_link_speed(Some(&sample(1000))), "1000 Mbps");
        assert_eq!(format_link_speed(Some(&sample(0))), "Unknown");
        assert_eq!(format_link_speed(None), "Unknown");
    }
}
