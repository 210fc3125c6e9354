//! Operator command handlers, organized by functional domain.
//!
//! - `settings`: interface, threshold, intervals, start-with-system
//! - `system`: OS autostart registration, config folder opener
//! - `link`: interface listing and current link speed
//! - `logic`: Pure menu model and console parsing (unit-testable)

pub mod link;
pub mod logic;
pub mod settings;
pub mod system;

pub use logic::{build_menu, parse_console_command, render_menu, ConsoleCommand, MenuEntry};
