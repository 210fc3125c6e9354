//! Fire-and-forget alert delivery.
//!
//! [`DesktopNotifier`] shells out to the platform notification tool and kills
//! it if it outlives [`NOTIFY_TIMEOUT_SECS`]. [`BackgroundNotifier`] moves
//! delivery onto its own thread so a hung tool never holds up a monitor tick.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::config::{ALERT_TITLE, APP_TITLE, NOTIFY_TIMEOUT_SECS};

/// Icon attached to an alert or shown as the link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Normal,
    Warning,
}

impl Icon {
    /// Freedesktop icon-theme name.
    pub fn theme_name(self) -> &'static str {
        match self {
            Icon::Normal => "network-wired",
            Icon::Warning => "network-wired-disconnected",
        }
    }

    /// Short marker used in console output.
    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Normal => "[ok]",
            Icon::Warning => "[!!]",
        }
    }
}

/// One alert to surface to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub icon: Icon,
}

impl Alert {
    /// Degraded-speed alert naming the interface, the observed, and the expected speed.
    pub fn degraded(interface: &str, speed_mbps: u64, expected_speed_mbps: u64) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            message: format!(
                "{interface} speed is {speed_mbps} Mbps (expected {expected_speed_mbps} Mbps)"
            ),
            icon: Icon::Warning,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn show(&self, alert: &Alert) -> Result<()>;
}

/// Logs the alert only. Used with `--no-notify` and as the headless fallback.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, alert: &Alert) -> Result<()> {
        tracing::warn!(title = %alert.title, "{}", alert.message);
        Ok(())
    }
}

/// OS toast via `notify-send` (Linux) or PowerShell (Windows).
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn show(&self, alert: &Alert) -> Result<()> {
        run_with_deadline(
            desktop_command(alert),
            Duration::from_secs(NOTIFY_TIMEOUT_SECS),
        )?;
        tracing::info!("Notification sent: {}", alert.message);
        Ok(())
    }
}

/// Run `command` to completion, killing it once `timeout` has passed.
fn run_with_deadline(mut command: Command, timeout: Duration) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to run {program}"))?;

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child
            .try_wait()
            .with_context(|| format!("failed to wait for {program}"))?
        {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            bail!("{program} did not finish within {timeout:?}; killed it");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    if !status.success() {
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        bail!("{program} exited with {status}: {}", stderr.trim());
    }
    Ok(())
}

/// Queues alerts for a dedicated `alert-delivery` thread.
///
/// `show` only enqueues. When `capacity` alerts are already waiting behind a
/// stuck delivery, further alerts are rejected instead of piling up.
pub struct BackgroundNotifier {
    tx: mpsc::Sender<Alert>,
}

impl BackgroundNotifier {
    pub fn spawn(inner: Arc<dyn Notifier>, capacity: usize) -> Result<Self> {
        let (tx, mut rx) = mpsc::channel::<Alert>(capacity.max(1));
        std::thread::Builder::new()
            .name("alert-delivery".into())
            .spawn(move || {
                while let Some(alert) = rx.blocking_recv() {
                    if let Err(e) = inner.show(&alert) {
                        tracing::warn!("Failed to show notification ({}): {e:#}", alert.message);
                    }
                }
                tracing::debug!("Alert delivery thread exiting");
            })
            .context("failed to spawn alert delivery thread")?;
        Ok(Self { tx })
    }
}

impl Notifier for BackgroundNotifier {
    fn show(&self, alert: &Alert) -> Result<()> {
        match self.tx.try_send(alert.clone()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                bail!("alert delivery is backed up; dropped \"{}\"", alert.message)
            }
            Err(TrySendError::Closed(_)) => bail!("alert delivery thread has stopped"),
        }
    }
}

#[cfg(target_os = "linux")]
fn desktop_command(alert: &Alert) -> Command {
    let mut command = Command::new("notify-send");
    command.args([
        "-a",
        APP_TITLE,
        "-u",
        "critical",
        "-i",
        alert.icon.theme_name(),
        &alert.title,
        &alert.message,
    ]);
    command
}

#[cfg(target_os = "windows")]
fn desktop_command(alert: &Alert) -> Command {
    let script = format!(
        "[Windows.UI.Notifications.ToastNotificationManager, Windows.UI.Notifications, ContentType = WindowsRuntime] | Out-Null; \
         $t = [Windows.UI.Notifications.ToastNotificationManager]::GetTemplateContent([Windows.UI.Notifications.ToastTemplateType]::ToastText02); \
         $x = $t.GetElementsByTagName('text'); \
         $x.Item(0).AppendChild($t.CreateTextNode({})) | Out-Null; \
         $x.Item(1).AppendChild($t.CreateTextNode({})) | Out-Null; \
         [Windows.UI.Notifications.ToastNotificationManager]::CreateToastNotifier({}).Show([Windows.UI.Notifications.ToastNotification]::new($t))",
        powershell_quote(&alert.title),
        powershell_quote(&alert.message),
        powershell_quote(APP_TITLE),
    );
    let mut command = Command::new("powershell");
    command.args(["-NoProfile", "-Command", &script]);
    command
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn desktop_command(alert: &Alert) -> Command {
    // No known notification tool; `false` fails and the caller logs the alert.
    let _ = alert;
    Command::new("false")
}

#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn powershell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
