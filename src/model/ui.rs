//! UI state - presentation state separate from the extraction workflow

use chrono::{DateTime, Local};

/// How the current result is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Grid with one column per header entry
    #[default]
    Table,
    /// Pretty-printed structured dump
    Raw,
}

impl ViewMode {
    pub fn toggle(&self) -> ViewMode {
        match self {
            ViewMode::Table => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Table,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewMode::Table => "Table",
            ViewMode::Raw => "JSON",
        }
    }
}

/// Reachability of the extraction service, as last probed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServerStatus {
    #[default]
    Unknown,
    Checking,
    Online(String),
    Offline(String),
}

impl ServerStatus {
    pub fn label(&self) -> &str {
        match self {
            ServerStatus::Unknown => "unknown",
            ServerStatus::Checking => "checking...",
            ServerStatus::Online(_) => "online",
            ServerStatus::Offline(_) => "offline",
        }
    }
}

/// One-line feedback shown in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub at: DateTime<Local>,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            at: Local::now(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::info(text)
        }
    }

    pub fn display(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trips() {
        assert_eq!(ViewMode::Table.toggle(), ViewMode::Raw);
        assert_eq!(ViewMode::Table.toggle().toggle(), ViewMode::Table);
    }

    #[test]
    fn test_status_message_is_timestamped() {
        let message = StatusMessage::error("Export failed");
        let shown = message.display();

        assert!(message.is_error);
        assert!(shown.starts_with('['));
        assert!(shown.ends_with("] Export failed"));
        assert_eq!(shown.len(), "[00:00:00] Export failed".len());
    }
}
