//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::logic::parse_duration_secs;

#[derive(Parser, Debug)]
#[command(name = "linkwatch", version)]
#[command(about = "Alerts when a network interface's negotiated link speed drops below what you expect")]
pub struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Monitor the configured interface with an interactive console (default)
    Run {
        /// Log alerts instead of showing desktop notifications
        #[arg(long)]
        no_notify: bool,
    },
    /// List network interfaces
    Interfaces,
    /// Show the current link speed of the configured interface
    Status,
    /// Print the settings menu with the current selections checked
    Menu,
    /// Select the interface to monitor
    SetInterface { name: String },
    /// Set the expected link speed in Mbps
    SetSpeed {
        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        mbps: u64,
    },
    /// Set the poll interval (e.g. 60, 5m, 1h)
    SetCheckInterval {
        #[arg(value_parser = parse_duration_secs)]
        interval: u64,
    },
    /// Set the reminder interval for a sustained degraded speed
    SetNotificationInterval {
        #[arg(value_parser = parse_duration_secs)]
        interval: u64,
    },
    /// Enable or disable starting with the system
    Autostart {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// Print the config file location
    ConfigPath {
        /// Also open the containing folder
        #[arg(long)]
        open: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
