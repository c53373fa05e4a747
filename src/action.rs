//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::ProcessingMode;
use std::fmt;
use std::path::PathBuf;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for polling workers and animations
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    /// Open the path prompt for choosing an image
    OpenFilePrompt,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,
    /// Add character to the path prompt
    PromptInput(char),
    /// Remove last character from the path prompt
    PromptBackspace,

    // ─────────────────────────────────────────────────────────────────────────
    // Intake
    // ─────────────────────────────────────────────────────────────────────────
    /// Select the image at a path
    SelectPath(PathBuf),
    /// Select from pasted drag-and-drop text
    SelectDropped(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Extraction
    // ─────────────────────────────────────────────────────────────────────────
    SetMode(ProcessingMode),
    /// Advance to the next processing mode
    CycleMode,
    /// Submit the current file
    Extract,
    /// Probe the extraction service
    CheckServer,

    // ─────────────────────────────────────────────────────────────────────────
    // Result
    // ─────────────────────────────────────────────────────────────────────────
    /// Toggle between grid and raw JSON
    ToggleView,
    ExportJson,
    ExportCsv,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::OpenFilePrompt => write!(f, "OpenFilePrompt"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::PromptInput(c) => write!(f, "PromptInput('{}')", c),
            Action::PromptBackspace => write!(f, "PromptBackspace"),
            Action::SelectPath(path) => write!(f, "SelectPath({})", path.display()),
            Action::SelectDropped(text) => write!(f, "SelectDropped({} bytes)", text.len()),
            Action::SetMode(mode) => write!(f, "SetMode({})", mode),
            Action::CycleMode => write!(f, "CycleMode"),
            Action::Extract => write!(f, "Extract"),
            Action::CheckServer => write!(f, "CheckServer"),
            Action::ToggleView => write!(f, "ToggleView"),
            Action::ExportJson => write!(f, "ExportJson"),
            Action::ExportCsv => write!(f, "ExportCsv"),
        }
    }
}
