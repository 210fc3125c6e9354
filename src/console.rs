//! Foreground operator console.
//!
//! Owns all operator interaction while the monitor runs in the background:
//! status transitions arrive as [`UiEvent`]s, and operator lines are read on a
//! dedicated input thread and forwarded over a channel.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::commands::{link, logic, settings, system, ConsoleCommand};
use crate::core::LinkState;
use crate::error::AppError;
use crate::notify::Icon;
use crate::services::BackgroundServices;
use crate::stats::InterfaceStatsProvider;
use crate::status::UiEvent;
use crate::store::ConfigStore;

/// Result of one console command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConsoleReply {
    pub output: String,
    /// The persisted config changed; the monitor should re-evaluate now.
    pub config_changed: bool,
    pub quit: bool,
}

impl ConsoleReply {
    fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    fn changed(output: impl Into<String>) -> Self {
        Self {
            config_changed: true,
            ..Self::text(output)
        }
    }
}

pub struct Console {
    store: Arc<dyn ConfigStore>,
    provider: Arc<dyn InterfaceStatsProvider>,
    /// Last state reported by the monitor.
    state: LinkState,
}

impl Console {
    pub fn new(store: Arc<dyn ConfigStore>, provider: Arc<dyn InterfaceStatsProvider>) -> Self {
        Self {
            store,
            provider,
            state: LinkState::Normal,
        }
    }

    /// Execute one parsed command against the store.
    pub fn execute(&self, command: ConsoleCommand) -> Result<ConsoleReply, AppError> {
        let store = self.store.as_ref();
        let provider = self.provider.as_ref();

        let reply = match command {
            ConsoleCommand::Menu => {
                ConsoleReply::text(logic::render_menu(&link::current_menu(store, provider)?))
            }
            ConsoleCommand::Status => {
                let status = link::link_status(store, provider)?;
                ConsoleReply::text(format!(
                    "{status}\n{} monitor state: {:?}",
                    self.state.icon().glyph(),
                    self.state
                ))
            }
            ConsoleCommand::Interfaces => {
                let selected = store.load()?.interface_name;
                let lines: Vec<String> = link::list_interfaces(provider)?
                    .into_iter()
                    .map(|name| {
                        let mark = if name == selected { "*" } else { " " };
                        format!("{mark} {name}")
                    })
                    .collect();
                ConsoleReply::text(lines.join("\n"))
            }
            ConsoleCommand::SelectInterface(name) => {
                let config = settings::select_interface(store, &name)?;
                let mut output = format!("Monitoring {}", config.interface_name);
                let present = provider
                    .list_interface_names()
                    .map(|names| names.contains(&config.interface_name))
                    .unwrap_or(true);
                if !present {
                    output.push_str(" (not present right now; ticks are skipped until it appears)");
                }
                ConsoleReply::changed(output)
            }
            ConsoleCommand::ExpectedSpeed(mbps) => {
                settings::set_expected_speed(store, mbps)?;
                ConsoleReply::changed(format!("Expected speed set to {mbps} Mbps"))
            }
            ConsoleCommand::CheckInterval(secs) => {
                settings::set_check_interval(store, secs)?;
                ConsoleReply::changed(format!("Check interval set to {secs} seconds"))
            }
            ConsoleCommand::NotificationInterval(secs) => {
                settings::set_notification_interval(store, secs)?;
                ConsoleReply::changed(format!("Notification interval set to {secs} seconds"))
            }
            ConsoleCommand::Autostart(enabled) => {
                settings::set_autostart(store, enabled)?;
                ConsoleReply::text(if enabled {
                    "Start with system enabled"
                } else {
                    "Start with system disabled"
                })
            }
            ConsoleCommand::OpenConfig => {
                let path = store
                    .location()
                    .ok_or_else(|| AppError::InvalidInput("Config has no file location".into()))?;
                system::open_config_folder(path)?;
                ConsoleReply::text(format!("Opened {}", path.display()))
            }
            ConsoleCommand::Help => ConsoleReply::text(logic::CONSOLE_HELP),
            ConsoleCommand::Quit => ConsoleReply {
                quit: true,
                ..ConsoleReply::default()
            },
        };
        Ok(reply)
    }

    /// Render a monitor event for the operator and remember the latest state.
    pub fn show_event(&mut self, event: UiEvent) -> String {
        match event {
            UiEvent::StatusChanged(state) => {
                self.state = state;
                format!("{} Link status: {state:?}", state.icon().glyph())
            }
            UiEvent::ConfigError(message) => {
                format!("{} Config error: {message}", Icon::Warning.glyph())
            }
        }
    }

    /// Drive the console until `quit`, Ctrl-C, or cancellation, then stop the monitor.
    pub async fn run(
        mut self,
        services: BackgroundServices,
        mut events: mpsc::UnboundedReceiver<UiEvent>,
    ) {
        let mut input = spawn_input_thread();
        let mut input_open = true;
        let cancel = services.cancel_token();

        println!("Type 'help' for commands, 'quit' to exit.");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted; shutting down");
                    break;
                }
                _ = cancel.cancelled() => break,
                Some(event) = events.recv() => {
                    let line = self.show_event(event);
                    println!("{line}");
                }
                line = input.recv(), if input_open => {
                    let Some(line) = line else {
                        input_open = false;
                        tracing::info!("Console input closed; monitoring until interrupted");
                        continue;
                    };
                    let command = match logic::parse_console_command(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(e) => {
                            eprintln!("{e}");
                            continue;
                        }
                    };
                    match self.execute(command) {
                        Ok(reply) => {
                            if !reply.output.is_empty() {
                                println!("{}", reply.output);
                            }
                            if reply.config_changed {
                                services.config_changed();
                            }
                            if reply.quit {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(kind = e.kind(), "Console command failed: {e}");
                            eprintln!("error: {e}");
                        }
                    }
                }
            }
        }

        services.shutdown().await;
    }
}

/// Read stdin on a plain thread; a blocked read must not hold up runtime shutdown.
fn spawn_input_thread() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("console-input".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read console input: {e}");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        // Dropping `tx` with the closure closes the channel; the console keeps
        // showing events until interrupted.
        tracing::warn!("Failed to spawn console input thread: {e}");
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SysfsStatsProvider;
    use crate::store::JsonFileStore;

    fn console() -> (tempfile::TempDir, Arc<JsonFileStore>, Console) {
        let dir = tempfile::tempdir().unwrap();
        let iface = dir.path().join("net").join("eth0");
        std::fs::create_dir_all(&iface).unwrap();
        std::fs::write(iface.join("flags"), "0x1003").unwrap();
        std::fs::write(iface.join("operstate"), "up").unwrap();
        std::fs::write(iface.join("speed"), "1000").unwrap();

        let store = Arc::new(JsonFileStore::new(dir.path().join("config.json")));
        let provider = Arc::new(SysfsStatsProvider::new(dir.path().join("net")));
        let console = Console::new(store.clone(), provider);
        (dir, store, console)
    }

    #[test]
    fn test_select_interface_persists_and_wakes_monitor() {
        let (_dir, store, console) = console();
        let reply = console
            .execute(ConsoleCommand::SelectInterface("eth0".into()))
            .unwrap();
        assert!(reply.config_changed);
        assert_eq!(reply.output, "Monitoring eth0");
        assert_eq!(store.load().unwrap().interface_name, "eth0");
    }

    #[test]
    fn test_selecting_absent_interface_warns() {
        let (_dir, _store, console) = console();
        let reply = console
            .execute(ConsoleCommand::SelectInterface("eth5".into()))
            .unwrap();
        assert!(reply.output.contains("not present"));
    }

    #[test]
    fn test_interval_commands_wake_monitor() {
        let (_dir, store, console) = console();
        assert!(console.execute(ConsoleCommand::CheckInterval(10)).unwrap().config_changed);
        assert!(
            console
                .execute(ConsoleCommand::NotificationInterval(300))
                .unwrap()
                .config_changed
        );
        assert!(console.execute(ConsoleCommand::ExpectedSpeed(2500)).unwrap().config_changed);

        let config = store.load().unwrap();
        assert_eq!(config.check_interval_seconds, 10);
        assert_eq!(config.notification_interval_seconds, 300);
        assert_eq!(config.expected_speed_mbps, 2500);
    }

    #[test]
    fn test_interfaces_marks_selection() {
        let (_dir, _store, console) = console();
        console
            .execute(ConsoleCommand::SelectInterface("eth0".into()))
            .unwrap();
        let reply = console.execute(ConsoleCommand::Interfaces).unwrap();
        assert_eq!(reply.output, "* eth0");
    }

    #[test]
    fn test_status_reflects_last_event() {
        let (_dir, _store, mut console) = console();
        console
            .execute(ConsoleCommand::SelectInterface("eth0".into()))
            .unwrap();
        let shown = console.show_event(UiEvent::StatusChanged(LinkState::Degraded));
        assert_eq!(shown, "[!!] Link status: Degraded");

        let reply = console.execute(ConsoleCommand::Status).unwrap();
        assert!(reply.output.starts_with("eth0: 1000 Mbps (expected 1000 Mbps) - ok"));
        assert!(reply.output.ends_with("monitor state: Degraded"));
    }

    #[test]
    fn test_config_error_event_is_shown() {
        let (_dir, _store, mut console) = console();
        let shown = console.show_event(UiEvent::ConfigError("invalid config: x".into()));
        assert_eq!(shown, "[!!] Config error: invalid config: x");
    }

    #[test]
    fn test_menu_and_quit() {
        let (_dir, _store, console) = console();
        let menu = console.execute(ConsoleCommand::Menu).unwrap();
        assert!(menu.output.contains("Select Interface"));
        assert!(!menu.config_changed);

        let quit = console.execute(ConsoleCommand::Quit).unwrap();
        assert!(quit.quit);
    }
}
