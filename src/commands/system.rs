//! Start-with-system registration and the config-folder opener.

#![cfg_attr(not(target_os = "linux"), allow(dead_code))]

use std::path::{Path, PathBuf};

use crate::config::{Config, APP_NAME, APP_TITLE};
use crate::error::AppError;

// ---- Auto-Start ----

/// Register (or remove) the current executable to start with the user session.
pub fn apply_autostart(enabled: bool) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|e| AppError::Autostart(e.to_string()))?;
    platform_apply_autostart(enabled, &exe)
}

/// Bring the OS entry in line with `config.start_with_system`. Called once when
/// the monitor starts; failures are logged, not fatal.
pub fn sync_autostart(config: &Config) {
    if let Err(e) = apply_autostart(config.start_with_system) {
        tracing::warn!("Failed to sync start-with-system entry: {e}");
    }
}

#[cfg(target_os = "windows")]
const RUN_KEY: &str = r"HKCU\Software\Microsoft\Windows\CurrentVersion\Run";

#[cfg(target_os = "windows")]
fn platform_apply_autostart(enabled: bool, exe: &Path) -> Result<(), AppError> {
    let command_line = format!("\"{}\" run", exe.display());

    if enabled {
        let output = std::process::Command::new("reg")
            .args([
                "add", RUN_KEY, "/v", APP_TITLE, "/t", "REG_SZ", "/d", &command_line, "/f",
            ])
            .output()
            .map_err(|e| AppError::Autostart(e.to_string()))?;
        if !output.status.success() {
            return Err(AppError::Autostart("Failed to add registry entry".into()));
        }
        tracing::info!("[Startup] Added to startup: {command_line}");
    } else {
        // Deleting a value that does not exist fails; that is the desired state anyway.
        let _ = std::process::Command::new("reg")
            .args(["delete", RUN_KEY, "/v", APP_TITLE, "/f"])
            .output();
        tracing::info!("[Startup] Removed from startup");
    }
    Ok(())
}

#[cfg(target_os = "linux")]
fn platform_apply_autostart(enabled: bool, exe: &Path) -> Result<(), AppError> {
    let dir = dirs::config_dir()
        .ok_or_else(|| AppError::Autostart("No user config directory".into()))?
        .join("autostart");
    write_desktop_entry(&dir, enabled, exe)
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn platform_apply_autostart(_enabled: bool, _exe: &Path) -> Result<(), AppError> {
    Err(AppError::Autostart(
        "Start with system is not supported on this platform".into(),
    ))
}

/// XDG autostart entry path inside `autostart_dir`.
fn desktop_entry_path(autostart_dir: &Path) -> PathBuf {
    autostart_dir.join(format!("{APP_NAME}.desktop"))
}

fn desktop_entry(exe: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={APP_TITLE}\n\
         Comment=Alerts when the network link speed drops\n\
         Exec=\"{}\" run\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n",
        exe.display()
    )
}

fn write_desktop_entry(autostart_dir: &Path, enabled: bool, exe: &Path) -> Result<(), AppError> {
    let path = desktop_entry_path(autostart_dir);
    if enabled {
        std::fs::create_dir_all(autostart_dir)
            .and_then(|_| std::fs::write(&path, desktop_entry(exe)))
            .map_err(|e| AppError::Autostart(format!("{}: {e}", path.display())))?;
        tracing::info!("[Startup] Added to startup: {}", path.display());
    } else if path.exists() {
        std::fs::remove_file(&path)
            .map_err(|e| AppError::Autostart(format!("{}: {e}", path.display())))?;
        tracing::info!("[Startup] Removed from startup: {}", path.display());
    }
    Ok(())
}

// ---- Config Folder ----

/// Open the directory containing `config_path` in the platform file browser.
pub fn open_config_folder(config_path: &Path) -> Result<(), AppError> {
    let folder = match config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir()?,
    };

    let opener = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    std::process::Command::new(opener)
        .arg(&folder)
        .spawn()
        .map_err(|e| AppError::Io(format!("Failed to run {opener}: {e}")))?;
    tracing::info!("Opened config folder {}", folder.display());
    Ok(())
}
