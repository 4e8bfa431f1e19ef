//! # Command Surface
//!
//! Text commands for operators. Each command is forwarded to the main loop
//! and answered with human-readable lines; nothing here touches state
//! directly.

pub mod parser;

pub use parser::{help_lines, parse_command, AutofulfillCommand, Toggle, ROOT_COMMAND};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::request_states;
use crate::logging::log_command;
use crate::orchestration::MainLoopHandle;

/// Answer to one command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub lines: Vec<String>,
}

impl CommandResponse {
    pub fn ok(lines: Vec<String>) -> Self {
        Self {
            success: true,
            lines,
        }
    }

    pub fn ok_line(line: impl Into<String>) -> Self {
        Self::ok(vec![line.into()])
    }

    pub fn failure(line: impl Into<String>) -> Self {
        Self {
            success: false,
            lines: vec![line.into()],
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[derive(Debug, Clone)]
pub struct CommandSurface {
    handle: MainLoopHandle,
}

impl CommandSurface {
    pub fn new(handle: MainLoopHandle) -> Self {
        Self { handle }
    }

    /// Parse and run one line of input.
    pub async fn execute_line(&self, input: &str) -> CommandResponse {
        let response = match parse_command(input) {
            Ok(Some(command)) => self.execute(command).await,
            Ok(None) => CommandResponse::ok(help_lines()),
            Err(message) => CommandResponse::failure(message),
        };
        log_command(input.trim(), response.success, response.lines.first().map(String::as_str));
        response
    }

    pub async fn execute(&self, command: AutofulfillCommand) -> CommandResponse {
        debug!(command = ?command, "Executing autofulfill command");
        match command {
            AutofulfillCommand::Status => self.status().await,
            AutofulfillCommand::Enable => self.set_enabled(true).await,
            AutofulfillCommand::Disable => self.set_enabled(false).await,
            AutofulfillCommand::Delay { seconds } => self.set_delay(seconds).await,
            AutofulfillCommand::Message { toggle } => self.set_messages(toggle.is_enable()).await,
            AutofulfillCommand::Stats => self.stats().await,
            AutofulfillCommand::Trigger => self.trigger().await,
            AutofulfillCommand::Requests => self.requests().await,
            AutofulfillCommand::Debug => Self::debug_info(),
        }
    }

    async fn status(&self) -> CommandResponse {
        match self.handle.status().await {
            Ok(status) => CommandResponse::ok(vec![
                "Autofulfill Status:".to_string(),
                format!("Enabled: {}", yes_no(status.enabled)),
                format!("Check Interval: {} seconds", status.check_time_seconds),
                format!("In-game Messages: {}", yes_no(status.show_in_game_messages)),
                format!("System Phase: {}", status.phase),
            ]),
            Err(e) => CommandResponse::failure(format!("Error reading status: {e}")),
        }
    }

    async fn set_enabled(&self, enabled: bool) -> CommandResponse {
        match self.handle.set_enabled(enabled).await {
            Ok(()) if enabled => CommandResponse::ok_line("Autofulfill enabled"),
            Ok(()) => CommandResponse::ok_line("Autofulfill disabled"),
            Err(e) => CommandResponse::failure(format!("Error changing autofulfill: {e}")),
        }
    }

    async fn set_delay(&self, seconds: Option<i64>) -> CommandResponse {
        let Some(seconds) = seconds else {
            return CommandResponse::failure("Usage: /autofulfill delay <seconds>");
        };
        let seconds = match u32::try_from(seconds) {
            Ok(seconds) => seconds,
            Err(_) => {
                return CommandResponse::failure(format!(
                    "Error setting delay: {seconds} is not between 1 and 3600 seconds"
                ))
            }
        };

        match self.handle.set_interval(seconds).await {
            Ok(applied) => {
                CommandResponse::ok_line(format!("Autofulfill delay set to {applied} seconds"))
            }
            Err(e) => CommandResponse::failure(format!("Error setting delay: {e}")),
        }
    }

    async fn set_messages(&self, show: bool) -> CommandResponse {
        match self.handle.set_show_messages(show).await {
            Ok(()) if show => CommandResponse::ok_line("In-game messages enabled"),
            Ok(()) => CommandResponse::ok_line("In-game messages disabled"),
            Err(e) => CommandResponse::failure(format!("Error changing messages: {e}")),
        }
    }

    async fn stats(&self) -> CommandResponse {
        let stats = match self.handle.stats().await {
            Ok(stats) => stats,
            Err(e) => return CommandResponse::failure(format!("Error reading statistics: {e}")),
        };

        match stats.success_rate() {
            Some(rate) => CommandResponse::ok(vec![
                "Autofulfill Statistics:".to_string(),
                format!("Processed: {}", stats.processed),
                format!("Successful: {} ({:.1}%)", stats.succeeded, rate),
                format!("Failed: {}", stats.failed),
                format!("Skipped: {}", stats.skipped),
            ]),
            None => CommandResponse::ok_line("No autofulfill statistics available yet"),
        }
    }

    async fn trigger(&self) -> CommandResponse {
        match self.handle.trigger().await {
            Ok(report) => CommandResponse::ok(vec![
                "Autofulfill triggered manually".to_string(),
                report.summary_line(),
            ]),
            Err(e) => CommandResponse::failure(format!("Error triggering autofulfill: {e}")),
        }
    }

    async fn requests(&self) -> CommandResponse {
        let listing = match self.handle.list_requests().await {
            Ok(listing) => listing,
            Err(e) => return CommandResponse::failure(format!("Error: {e}")),
        };

        let mut lines = Vec::new();
        for colony in &listing.colonies {
            lines.push(format!("Colony: {}", colony.colony));
            for (building, request) in &colony.building_requests {
                lines.push(format!(
                    "Building request: {} - {}",
                    building.display_name(),
                    request
                ));
            }
            for (citizen, request) in &colony.citizen_requests {
                lines.push(format!("Citizen request: {} - {}", citizen.name, request));
            }
        }
        lines.push(format!("Total open requests: {}", listing.total()));
        CommandResponse::ok(lines)
    }

    fn debug_info() -> CommandResponse {
        let mut lines = vec!["Active Request States:".to_string()];
        lines.extend(request_states::ACTIVE.iter().map(|state| format!("  - {state}")));
        CommandResponse::ok(lines)
    }
}
