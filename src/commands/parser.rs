//! Text command grammar, parsed with clap.

use clap::{Parser, Subcommand};

pub const ROOT_COMMAND: &str = "autofulfill";

#[derive(Parser, Debug)]
#[command(name = "autofulfill")]
#[command(about = "Automatic fulfilment of colony building requests")]
#[command(no_binary_name = true, disable_help_subcommand = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Option<AutofulfillCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum AutofulfillCommand {
    /// Show current settings
    Status,
    /// Enable the poller
    Enable,
    /// Disable the poller; scheduled ticks become no-ops
    Disable,
    /// Set the check interval in seconds (1-3600)
    Delay {
        #[arg(allow_negative_numbers = true)]
        seconds: Option<i64>,
    },
    /// Enable or disable in-game messages
    Message {
        #[command(subcommand)]
        toggle: Toggle,
    },
    /// Show session statistics
    Stats,
    /// Run one cycle now
    Trigger,
    /// List every open colony request
    Requests,
    /// Show the request states treated as active
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Toggle {
    Enable,
    Disable,
}

impl Toggle {
    pub fn is_enable(self) -> bool {
        matches!(self, Toggle::Enable)
    }
}

/// Parse one input line. A leading `/` is optional and the line must start
/// with the root command. `Ok(None)` is the bare root command.
pub fn parse_command(input: &str) -> Result<Option<AutofulfillCommand>, String> {
    let input = input.trim();
    let input = input.strip_prefix('/').unwrap_or(input);
    let mut tokens = input.split_whitespace();

    match tokens.next() {
        Some(root) if root.eq_ignore_ascii_case(ROOT_COMMAND) => {}
        Some(other) => return Err(format!("Unknown command: {other}")),
        None => return Err("Empty command".to_string()),
    }

    CommandLine::try_parse_from(tokens)
        .map(|line| line.command)
        .map_err(|e| {
            e.to_string()
                .lines()
                .next()
                .unwrap_or("invalid command")
                .trim_start_matches("error: ")
                .to_string()
        })
}

pub fn help_lines() -> Vec<String> {
    [
        "Autofulfill Commands:",
        "/autofulfill status - Show current settings",
        "/autofulfill enable|disable - Enable/disable autofulfill",
        "/autofulfill delay <seconds> - Set check interval",
        "/autofulfill message enable|disable - Enable/disable messages",
        "/autofulfill stats - Show statistics",
        "/autofulfill trigger - Trigger autofulfill manually",
        "/autofulfill requests - List open colony requests",
        "/autofulfill debug - Show active request states",
    ]
    .iter()
    .map(|line| line.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_slash() {
        assert_eq!(
            parse_command("/autofulfill status").unwrap(),
            Some(AutofulfillCommand::Status)
        );
        assert_eq!(
            parse_command("  autofulfill trigger ").unwrap(),
            Some(AutofulfillCommand::Trigger)
        );
        assert_eq!(parse_command("autofulfill").unwrap(), None);
    }

    #[test]
    fn test_parse_delay_and_message() {
        assert_eq!(
            parse_command("autofulfill delay 30").unwrap(),
            Some(AutofulfillCommand::Delay { seconds: Some(30) })
        );
        assert_eq!(
            parse_command("autofulfill delay -5").unwrap(),
            Some(AutofulfillCommand::Delay { seconds: Some(-5) })
        );
        assert_eq!(
            parse_command("autofulfill delay").unwrap(),
            Some(AutofulfillCommand::Delay { seconds: None })
        );
        assert_eq!(
            parse_command("autofulfill message disable").unwrap(),
            Some(AutofulfillCommand::Message {
                toggle: Toggle::Disable
            })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_input() {
        assert_eq!(parse_command("mcmod status").unwrap_err(), "Unknown command: mcmod");
        assert!(parse_command("").is_err());
        assert!(parse_command("autofulfill explode").is_err());
        assert!(parse_command("autofulfill delay soon").is_err());
    }
}
