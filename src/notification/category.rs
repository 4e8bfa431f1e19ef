//! Message categories and their chat prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a user-facing status line. Part of the throttle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageCategory {
    Success,
    Error,
    Warning,
    Info,
    Progress,
    Stats,
    Other,
}

impl MessageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Success => "SUCCESS",
            MessageCategory::Error => "ERROR",
            MessageCategory::Warning => "WARNING",
            MessageCategory::Info => "INFO",
            MessageCategory::Progress => "PROGRESS",
            MessageCategory::Stats => "STATS",
            MessageCategory::Other => "OTHER",
        }
    }

    /// Game-client colour code followed by the category glyph.
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageCategory::Success => "§a[✓] ",
            MessageCategory::Error => "§c[✗] ",
            MessageCategory::Warning => "§e[⚠] ",
            MessageCategory::Info => "§b[ℹ] ",
            MessageCategory::Progress => "§6[→] ",
            MessageCategory::Stats => "§d[📊] ",
            MessageCategory::Other => "§7[?] ",
        }
    }

    pub fn format(&self, message: &str) -> String {
        format!("{}{}", self.prefix(), message)
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prepends_category_glyph() {
        assert_eq!(
            MessageCategory::Success.format("Fulfilled 16x oak_planks for Builder"),
            "§a[✓] Fulfilled 16x oak_planks for Builder"
        );
        assert_eq!(MessageCategory::Other.format("x"), "§7[?] x");
    }
}
