//! Windows backend: `Get-NetAdapter` through PowerShell.
//!
//! `Status` is `Up`, `Disconnected`, or `Disabled`. `LinkSpeed` is a display
//! string such as `"2.5 Gbps"`.

#![cfg_attr(not(target_os = "windows"), allow(dead_code))]

use anyhow::{Context, Result};
use chrono::Utc;

use super::{parse_link_speed, InterfaceSample};

/// Query one adapter by name. An unknown name yields `Ok(None)`.
#[cfg(target_os = "windows")]
pub fn sample(name: &str) -> Result<Option<InterfaceSample>> {
    use std::process::Command;

    let output = Command::new("powershell")
        .args(["-NoProfile", "-Command", &adapter_query(name)])
        .output()
        .context("failed to run PowerShell")?;

    parse_adapter_json(&String::from_utf8_lossy(&output.stdout), name)
}

/// `Get-NetAdapter -Name` treats `*`, `?` and `[` as wildcards, so filter on
/// an exact name comparison instead.
fn adapter_query(name: &str) -> String {
    // Single-quoted PowerShell string: embedded quotes are doubled.
    let quoted = name.replace('\'', "''");
    format!(
        "Get-NetAdapter -ErrorAction SilentlyContinue | Where-Object {{ $_.Name -eq '{quoted}' }} | Select-Object Name, Status, LinkSpeed | ConvertTo-Json"
    )
}

/// Parse the `ConvertTo-Json` output for the adapter called `name`. Empty
/// output, or no entry with that name, means the adapter is absent.
pub(crate) fn parse_adapter_json(raw: &str, name: &str) -> Result<Option<InterfaceSample>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_str(raw).context("failed to parse Get-NetAdapter JSON")?;
    let adapters: Vec<&serde_json::Value> = match &value {
        serde_json::Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    // Adapter names compare case-insensitively on Windows, as `-eq` does.
    let Some(adapter) = adapters.into_iter().find(|adapter| {
        adapter["Name"]
            .as_str()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }) else {
        if value.is_array() || value.get("Name").is_some() {
            return Ok(None);
        }
        anyhow::bail!("Get-NetAdapter output has no Name");
    };

    let name = adapter["Name"]
        .as_str()
        .context("Get-NetAdapter output has no Name")?
        .to_string();
    let is_up = adapter["Status"].as_str() == Some("Up");
    let speed_mbps = adapter["LinkSpeed"]
        .as_str()
        .and_then(parse_link_speed)
        .unwrap_or(0);

    Ok(Some(InterfaceSample {
        name,
        is_up,
        speed_mbps,
        observed_at: Utc::now(),
    }))
}
