//! Linux sysfs backend: `/sys/class/net/<iface>/{flags,operstate,speed}`.
//!
//! The kernel reports `speed` as -1 (or fails the read with EINVAL) when the
//! link has no carrier or the driver has no notion of speed; both read as 0.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use super::{InterfaceSample, InterfaceStatsProvider};

const SYS_CLASS_NET: &str = "/sys/class/net";
const IFF_UP: u32 = 0x1;

/// Reads interface state from a sysfs-style directory tree.
pub struct SysfsStatsProvider {
    root: PathBuf,
}

impl SysfsStatsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn system() -> Self {
        Self::new(SYS_CLASS_NET)
    }

    fn read_attr(dir: &Path, attr: &str) -> Option<String> {
        std::fs::read_to_string(dir.join(attr))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

impl InterfaceStatsProvider for SysfsStatsProvider {
    fn list_interface_names(&self) -> Result<BTreeSet<String>> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("listing {}", self.root.display()))?;
        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("listing {}", self.root.display()))?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn sample(&self, name: &str) -> Result<Option<InterfaceSample>> {
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Ok(None);
        }
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Ok(None);
        }

        let flags = Self::read_attr(&dir, "flags")
            .with_context(|| format!("reading {}/flags", dir.display()))?;
        let flags = parse_flags(&flags)
            .with_context(|| format!("parsing {}/flags: {flags:?}", dir.display()))?;
        let operstate = Self::read_attr(&dir, "operstate").unwrap_or_default();
        let speed_mbps = Self::read_attr(&dir, "speed")
            .as_deref()
            .map(parse_speed)
            .unwrap_or(0);

        Ok(Some(InterfaceSample {
            name: name.to_string(),
            is_up: is_up(flags, &operstate),
            speed_mbps,
            observed_at: Utc::now(),
        }))
    }
}

/// Parse the hex `flags` attribute, e.g. `0x1003`.
fn parse_flags(raw: &str) -> Option<u32> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    u32::from_str_radix(digits, 16).ok()
}

/// Administratively up, and not reported down by the driver.
fn is_up(flags: u32, operstate: &str) -> bool {
    flags & IFF_UP != 0 && !matches!(operstate, "down" | "lowerlayerdown" | "notpresent")
}

fn parse_speed(raw: &str) -> u64 {
    raw.parse::<i64>().ok().filter(|s| *s > 0).unwrap_or(0) as u64
}
