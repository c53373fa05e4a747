//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod alert;
pub mod file_prompt;
pub mod help_dialog;
pub mod intake_panel;
pub mod layout;
pub mod quit_dialog;
pub mod result_view;
pub mod status;
pub mod table;

pub use alert::AlertDialog;
pub use file_prompt::FilePromptDialog;
pub use help_dialog::HelpDialog;
pub use intake_panel::IntakePanel;
pub use layout::{calculate_main_layout, centered_popup};
pub use quit_dialog::QuitDialog;
pub use result_view::ResultView;
pub use status::StatusContext;
