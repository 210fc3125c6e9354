//! Pure operator-surface logic: the menu model and console command parsing.
//!
//! Checked state is computed by explicit query functions over a freshly loaded
//! [`Config`] and the candidate value, never captured when the menu is built.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{
    Config, CHECK_INTERVAL_OPTIONS, NOTIFICATION_INTERVAL_OPTIONS, SPEED_OPTIONS_MBPS,
};
use crate::error::AppError;

/// One line of the operator menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: String,
    /// `None` for entries that are not toggles.
    pub checked: Option<bool>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    fn action(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: None,
            enabled: true,
            children: Vec::new(),
        }
    }

    fn info(label: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::action(label)
        }
    }

    fn toggle(label: impl Into<String>, checked: bool) -> Self {
        Self {
            checked: Some(checked),
            ..Self::action(label)
        }
    }

    fn submenu(label: impl Into<String>, children: Vec<MenuEntry>) -> Self {
        Self {
            children,
            ..Self::action(label)
        }
    }
}

pub fn is_interface_selected(config: &Config, name: &str) -> bool {
    config.interface_name == name
}

pub fn is_expected_speed_selected(config: &Config, speed_mbps: u64) -> bool {
    config.expected_speed_mbps == speed_mbps
}

pub fn is_check_interval_selected(config: &Config, secs: u64) -> bool {
    config.check_interval_seconds == secs
}

pub fn is_notification_interval_selected(config: &Config, secs: u64) -> bool {
    config.notification_interval_seconds == secs
}

/// Build the operator menu for `config`. `current_speed` is the already
/// formatted link speed of the selected interface.
pub fn build_menu(
    config: &Config,
    interfaces: &BTreeSet<String>,
    current_speed: &str,
) -> Vec<MenuEntry> {
    let interface_items = interfaces
        .iter()
        .map(|name| MenuEntry::toggle(name.as_str(), is_interface_selected(config, name)))
        .collect();

    let speed_items = SPEED_OPTIONS_MBPS
        .iter()
        .map(|&speed| {
            MenuEntry::toggle(
                format!("{speed} Mbps"),
                is_expected_speed_selected(config, speed),
            )
        })
        .collect();

    let interval_items = CHECK_INTERVAL_OPTIONS
        .iter()
        .map(|&(label, secs)| MenuEntry::toggle(label, is_check_interval_selected(config, secs)))
        .collect();

    let notification_items = NOTIFICATION_INTERVAL_OPTIONS
        .iter()
        .map(|&(label, secs)| {
            MenuEntry::toggle(label, is_notification_interval_selected(config, secs))
        })
        .collect();

    vec![
        MenuEntry::info(format!("Current: {}", config.interface_name)),
        MenuEntry::submenu("Select Interface", interface_items),
        MenuEntry::submenu("Expected Speed", speed_items),
        MenuEntry::info(format!("Expected: {} Mbps", config.expected_speed_mbps)),
        MenuEntry::info(format!("Current Link Speed: {current_speed}")),
        MenuEntry::submenu("Check Interval", interval_items),
        MenuEntry::submenu("Notification Interval", notification_items),
        MenuEntry::action("Open Config Folder"),
        MenuEntry::toggle("Start with System", config.start_with_system),
        MenuEntry::action("Quit"),
    ]
}

/// Render the menu as indented text for the console.
pub fn render_menu(entries: &[MenuEntry]) -> String {
    fn render(entries: &[MenuEntry], depth: usize, out: &mut String) {
        for entry in entries {
            let mark = match entry.checked {
                Some(true) => "[x] ",
                Some(false) => "[ ] ",
                None => "",
            };
            out.push_str(&"  ".repeat(depth));
            out.push_str(mark);
            out.push_str(&entry.label);
            out.push('\n');
            render(&entry.children, depth + 1, out);
        }
    }

    let mut out = String::new();
    render(entries, 0, &mut out);
    out
}

/// A line typed at the foreground console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Menu,
    Status,
    Interfaces,
    SelectInterface(String),
    ExpectedSpeed(u64),
    CheckInterval(u64),
    NotificationInterval(u64),
    Autostart(bool),
    OpenConfig,
    Help,
    Quit,
}

pub const CONSOLE_HELP: &str = "\
commands:
  menu                     show the settings menu
  status                   show current link speed and state
  interfaces               list network interfaces
  interface <name>         monitor <name>
  speed <mbps>             set the expected link speed
  interval <dur>           set the poll interval (e.g. 60, 5m, 1h)
  notify-interval <dur>    set the reminder interval for a sustained alert
  autostart on|off         start with the system
  open-config              open the config folder
  quit                     stop monitoring and exit";

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_console_command(line: &str) -> Result<Option<ConsoleCommand>, AppError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "menu" => ConsoleCommand::Menu,
        "status" => ConsoleCommand::Status,
        "interfaces" | "ifaces" => ConsoleCommand::Interfaces,
        "interface" | "iface" => {
            if rest.is_empty() {
                return Err(AppError::InvalidInput("usage: interface <name>".into()));
            }
            ConsoleCommand::SelectInterface(rest.to_string())
        }
        "speed" => ConsoleCommand::ExpectedSpeed(parse_positive(rest, "speed <mbps>")?),
        "interval" => ConsoleCommand::CheckInterval(parse_duration_secs(rest)?),
        "notify-interval" => ConsoleCommand::NotificationInterval(parse_duration_secs(rest)?),
        "autostart" => match rest.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => ConsoleCommand::Autostart(true),
            "off" | "false" | "no" => ConsoleCommand::Autostart(false),
            _ => return Err(AppError::InvalidInput("usage: autostart on|off".into())),
        },
        "open-config" => ConsoleCommand::OpenConfig,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => {
            return Err(AppError::InvalidInput(format!(
                "unknown command '{other}' (type 'help')"
            )))
        }
    };
    Ok(Some(command))
}

fn parse_positive(raw: &str, usage: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::InvalidInput(format!("usage: {usage} (must be > 0)"))),
    }
}

/// Parse `90`, `90s`, `5m`, or `1h` into seconds.
pub fn parse_duration_secs(raw: &str) -> Result<u64, AppError> {
    let raw = raw.trim().to_ascii_lowercase();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((i, _)) => raw.split_at(i),
        None => (raw.as_str(), ""),
    };
    let multiplier = match unit.trim() {
        "" | "s" | "sec" => 1,
        "m" | "min" => 60,
        "h" | "hour" | "hours" => 3600,
        _ => {
            return Err(AppError::InvalidInput(format!(
                "invalid duration '{raw}' (use seconds, or a number with s/m/h)"
            )))
        }
    };
    let value = parse_positive(digits, "<number>[s|m|h]")?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| AppError::InvalidInput(format!("duration '{raw}' is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            interface_name: "eth0".into(),
            expected_speed_mbps: 2500,
            check_interval_seconds: 300,
            notification_interval_seconds: 30,
            start_with_system: true,
        }
    }

    fn find<'a>(entries: &'a [MenuEntry], label: &str) -> &'a MenuEntry {
        entries
            .iter()
            .find(|e| e.label == label)
            .unwrap_or_else(|| panic!("no menu entry {label}"))
    }

    fn checked_labels(entry: &MenuEntry) -> Vec<&str> {
        entry
            .children
            .iter()
            .filter(|c| c.checked == Some(true))
            .map(|c| c.label.as_str())
            .collect()
    }

    #[test]
    fn test_selection_queries_compare_against_config() {
        let config = config();
        assert!(is_interface_selected(&config, "eth0"));
        assert!(!is_interface_selected(&config, "wlan0"));
        assert!(is_expected_speed_selected(&config, 2500));
        assert!(!is_expected_speed_selected(&config, 1000));
        assert!(is_check_interval_selected(&config, 300));
        assert!(is_notification_interval_selected(&config, 30));
        assert!(!is_notification_interval_selected(&config, 60));
    }

    #[test]
    fn test_menu_checks_exactly_the_configured_values() {
        let interfaces = BTreeSet::from(["eth0".to_string(), "wlan0".to_string()]);
        let menu = build_menu(&config(), &interfaces, "1000 Mbps");

        assert_eq!(checked_labels(find(&menu, "Select Interface")), vec!["eth0"]);
        assert_eq!(checked_labels(find(&menu, "Expected Speed")), vec!["2500 Mbps"]);
        assert_eq!(checked_labels(find(&menu, "Check Interval")), vec!["5 min"]);
        assert_eq!(checked_labels(find(&menu, "Notification Interval")), vec!["30 sec"]);
        assert_eq!(find(&menu, "Start with System").checked, Some(true));
        assert!(!find(&menu, "Current Link Speed: 1000 Mbps").enabled);
        assert!(!find(&menu, "Expected: 2500 Mbps").enabled);
    }

    #[test]
    fn test_menu_reflects_a_reloaded_config() {
        let interfaces = BTreeSet::from(["eth0".to_string()]);
        let mut config = config();
        let before = build_menu(&config, &interfaces, "Unknown");
        config.check_interval_seconds = 10;
        let after = build_menu(&config, &interfaces, "Unknown");

        assert_eq!(checked_labels(find(&before, "Check Interval")), vec!["5 min"]);
        assert_eq!(checked_labels(find(&after, "Check Interval")), vec!["10 sec"]);
    }

    #[test]
    fn test_custom_value_checks_nothing() {
        let config = Config {
            check_interval_seconds: 45,
            ..config()
        };
        let menu = build_menu(&config, &BTreeSet::new(), "Unknown");
        assert!(checked_labels(find(&menu, "Check Interval")).is_empty());
    }

    #[test]
    fn test_render_menu_marks_toggles() {
        let interfaces = BTreeSet::from(["eth0".to_string()]);
        let text = render_menu(&build_menu(&config(), &interfaces, "100 Mbps"));
        assert!(text.contains("Current: eth0\n"));
        assert!(text.contains("  [x] eth0\n"));
        assert!(text.contains("  [ ] 100 Mbps\n"));
        assert!(text.contains("[x] Start with System\n"));
    }

    #[test]
    fn test_parse_console_commands() {
        assert_eq!(parse_console_command("").unwrap(), None);
        assert_eq!(
            parse_console_command("menu").unwrap(),
            Some(ConsoleCommand::Menu)
        );
        assert_eq!(
            parse_console_command("interface Ethernet 2").unwrap(),
            Some(ConsoleCommand::SelectInterface("Ethernet 2".into()))
        );
        assert_eq!(
            parse_console_command("speed 1000").unwrap(),
            Some(ConsoleCommand::ExpectedSpeed(1000))
        );
        assert_eq!(
            parse_console_command("interval 5m").unwrap(),
            Some(ConsoleCommand::CheckInterval(300))
        );
        assert_eq!(
            parse_console_command("notify-interval 30").unwrap(),
            Some(ConsoleCommand::NotificationInterval(30))
        );
        assert_eq!(
            parse_console_command("AUTOSTART off").unwrap(),
            Some(ConsoleCommand::Autostart(false))
        );
        assert_eq!(
            parse_console_command("  quit  ").unwrap(),
            Some(ConsoleCommand::Quit)
        );
    }

    #[test]
    fn test_parse_console_rejects_bad_input() {
        for line in ["speed 0", "speed fast", "interface", "interval 0", "autostart maybe", "reboot"] {
            let err = parse_console_command(line).unwrap_err();
            assert_eq!(err.kind(), "InvalidInput", "line {line:?}");
        }
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration_secs("90").unwrap(), 90);
        assert_eq!(parse_duration_secs("90s").unwrap(), 90);
        assert_eq!(parse_duration_secs("10 min").unwrap(), 600);
        assert_eq!(parse_duration_secs("12h").unwrap(), 43200);
        assert!(parse_duration_secs("").is_err());
        assert!(parse_duration_secs("5d").is_err());
        assert!(parse_duration_secs("99999999999999999999h").is_err());
    }
}
