//! Modal stack for managing overlays
//!
//! Alerts, the path prompt, help and quit confirmation are all overlays; only
//! the top one receives input. Alerts are transient: an alert left on top
//! longer than its timeout is removed by `expire_alert`.

use chrono::{DateTime, Local, TimeDelta};

/// Category of a dismissible alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Selected file was rejected
    Validation,
    /// Extraction requested without a file
    EmptyInput,
    /// Service reported a failure
    Server,
    /// Request could not complete
    Transport,
    /// Export artifact could not be written
    Export,
}

impl AlertKind {
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::Validation => "Invalid file",
            AlertKind::EmptyInput => "No image selected",
            AlertKind::Server => "Extraction failed",
            AlertKind::Transport => "Service unreachable",
            AlertKind::Export => "Export failed",
        }
    }
}

/// Represents a modal overlay that can be displayed on top of the main UI
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Dismissible error alert
    Alert {
        kind: AlertKind,
        message: String,
        raised: DateTime<Local>,
    },
    /// Path entry for choosing a source image
    FilePrompt { input: String, error: Option<String> },
    /// Help dialog showing all keyboard shortcuts
    Help,
}

/// A stack of modal overlays
///
/// Modals are rendered from bottom to top, with only the top modal
/// receiving input events.
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    /// Push an alert, replacing an alert already on top
    pub fn alert(&mut self, kind: AlertKind, message: impl Into<String>) {
        if matches!(self.top(), Some(Modal::Alert { .. })) {
            self.stack.pop();
        }
        self.stack.push(Modal::Alert {
            kind,
            message: message.into(),
            raised: Local::now(),
        });
    }

    /// Pop the top alert once it has been up for `timeout`
    ///
    /// Returns true when an alert was removed.
    pub fn expire_alert(&mut self, now: DateTime<Local>, timeout: TimeDelta) -> bool {
        match self.top() {
            Some(Modal::Alert { raised, .. }) if now - *raised >= timeout => {
                self.stack.pop();
                true
            }
            _ => false,
        }
    }

    /// Kind and message of the alert on top, if any
    #[cfg(test)]
    pub fn top_alert(&self) -> Option<(AlertKind, &str)> {
        match self.top() {
            Some(Modal::Alert { kind, message, .. }) => Some((*kind, message.as_str())),
            _ => None,
        }
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.last_mut()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.stack.len()
    }
}
