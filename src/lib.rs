pub mod cli;
pub mod commands;
pub mod config;
pub mod console;
pub mod core;
pub mod error;
pub mod logging;
pub mod notify;
pub mod services;
pub mod stats;
pub mod status;
pub mod store;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use cli::{Cli, Command};
use commands::{link, logic, settings, system};
use config::ALERT_QUEUE_CAPACITY;
use console::Console;
use error::AppError;
use notify::{BackgroundNotifier, DesktopNotifier, LogNotifier, Notifier};
use services::BackgroundServices;
use stats::{InterfaceStatsProvider, SystemStatsProvider};
use status::ChannelStatusSink;
use store::{ConfigStore, JsonFileStore};

pub fn run() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!("PANIC in linkwatch: {info}");
        default_hook(info);
    }));

    let cli = Cli::parse();
    let json = cli.json;
    let command = cli.command.unwrap_or(Command::Run { no_notify: false });
    let file_store = JsonFileStore::new(JsonFileStore::resolve_path(cli.config));

    // One-shot commands report on the terminal; only the monitor keeps a log file.
    let log_file = matches!(command, Command::Run { .. }).then(|| file_store.log_path());
    logging::init(log_file.as_deref());

    let store: Arc<dyn ConfigStore> = Arc::new(file_store);
    let provider: Arc<dyn InterfaceStatsProvider> = Arc::new(SystemStatsProvider::new());

    match dispatch(command, json, store, provider) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(kind = e.kind(), "Command failed: {e}");
            if json {
                match serde_json::to_string(&e) {
                    Ok(body) => eprintln!("{body}"),
                    Err(_) => eprintln!("error: {e}"),
                }
            } else {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(
    command: Command,
    json: bool,
    store: Arc<dyn ConfigStore>,
    provider: Arc<dyn InterfaceStatsProvider>,
) -> Result<(), AppError> {
    let store_ref = store.as_ref();
    let provider_ref = provider.as_ref();

    match command {
        Command::Run { no_notify } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_monitor(store, provider, no_notify))
        }
        Command::Interfaces => {
            let names = link::list_interfaces(provider_ref)?;
            emit(json, &names, || names.iter().cloned().collect::<Vec<_>>().join("\n"))
        }
        Command::Status => {
            let status = link::link_status(store_ref, provider_ref)?;
            emit(json, &status, || status.to_string())
        }
        Command::Menu => {
            let menu = link::current_menu(store_ref, provider_ref)?;
            emit(json, &menu, || logic::render_menu(&menu).trim_end().to_string())
        }
        Command::SetInterface { name } => {
            let config = settings::select_interface(store_ref, &name)?;
            emit(json, &config, || format!("Interface set to {}", config.interface_name))
        }
        Command::SetSpeed { mbps } => {
            let config = settings::set_expected_speed(store_ref, mbps)?;
            emit(json, &config, || format!("Expected speed set to {mbps} Mbps"))
        }
        Command::SetCheckInterval { interval } => {
            let config = settings::set_check_interval(store_ref, interval)?;
            emit(json, &config, || format!("Check interval set to {interval} seconds"))
        }
        Command::SetNotificationInterval { interval } => {
            let config = settings::set_notification_interval(store_ref, interval)?;
            emit(json, &config, || {
                format!("Notification interval set to {interval} seconds")
            })
        }
        Command::Autostart { state } => {
            let config = settings::set_autostart(store_ref, state.enabled())?;
            emit(json, &config, || {
                format!("Start with system: {}", if config.start_with_system { "on" } else { "off" })
            })
        }
        Command::ConfigPath { open } => {
            let path = store_ref
                .location()
                .ok_or_else(|| AppError::InvalidInput("Config has no file location".into()))?;
            if open {
                // Make sure there is something to look at.
                store_ref.load()?;
                system::open_config_folder(path)?;
            }
            emit(json, &path, || path.display().to_string())
        }
    }
}

/// Print `value` as JSON, or the human-readable rendering.
fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    human: impl FnOnce() -> String,
) -> Result<(), AppError> {
    if json {
        let body = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Io(format!("Failed to encode output: {e}")))?;
        println!("{body}");
    } else {
        println!("{}", human());
    }
    Ok(())
}

async fn run_monitor(
    store: Arc<dyn ConfigStore>,
    provider: Arc<dyn InterfaceStatsProvider>,
    no_notify: bool,
) -> Result<(), AppError> {
    // Refuse to start on a broken config rather than monitoring with defaults.
    let config = store.load()?;
    system::sync_autostart(&config);
    tracing::info!(
        interface = %config.interface_name,
        expected_mbps = config.expected_speed_mbps,
        interval_secs = config.check_interval_seconds,
        "Starting link monitor"
    );

    let notifier: Arc<dyn Notifier> = if no_notify {
        Arc::new(LogNotifier)
    } else {
        let delivery = BackgroundNotifier::spawn(Arc::new(DesktopNotifier), ALERT_QUEUE_CAPACITY)
            .map_err(|e| AppError::Notify(format!("{e:#}")))?;
        Arc::new(delivery)
    };
    let (sink, events) = ChannelStatusSink::channel();
    let services = BackgroundServices::start(
        Arc::clone(&store),
        Arc::clone(&provider),
        notifier,
        Arc::new(sink),
    );

    Console::new(store, provider).run(services, events).await;
    tracing::info!("Link monitor stopped");
    Ok(())
}
