//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! Workflow state lives in the `ExtractionSession`; the App turns its errors
//! into alerts and keeps the result view in step with it.

use crate::action::Action;
use crate::component::Component;
use crate::components::status::{render_help_bar, render_status_bar, render_title_bar};
use crate::components::{
    calculate_main_layout, AlertDialog, FilePromptDialog, HelpDialog, IntakePanel, QuitDialog,
    ResultView, StatusContext,
};
use crate::config::Config;
use crate::error::IntakeError;
use crate::model::modal::{Modal, ModalStack};
use crate::model::{ProcessingMode, ServerStatus, StatusMessage, UploadedFile};
use crate::services::{ExtractionService, ExtractionSession, Exporter, HealthProbe, SubmitOutcome};
use anyhow::Result;
use chrono::{Local, TimeDelta};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{layout::Rect, Frame};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// How long an alert stays up unless dismissed
pub const ALERT_TIMEOUT_SECS: i64 = 6;

/// Expand a leading `~/` in a typed path
fn expand_home(input: &str) -> PathBuf {
    match (input.strip_prefix("~/"), env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(input),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    pub config: Config,

    /// Intake, mode and extraction lifecycle
    pub session: ExtractionSession,

    pub exporter: Exporter,

    /// Background reachability probe
    pub health: HealthProbe,
    pub server_status: ServerStatus,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: Option<StatusMessage>,

    /// Alerts on top of the stack longer than this are removed on tick
    pub alert_timeout: TimeDelta,

    /// Ticks since start, drives the loading spinner
    tick: usize,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub intake_panel: IntakePanel,
    pub result_view: ResultView,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub alert_dialog: AlertDialog,
    pub file_prompt: FilePromptDialog,
}

impl App {
    pub fn new(config: Config, service: Arc<dyn ExtractionService>) -> App {
        let session = ExtractionSession::new(
            Arc::clone(&service),
            config.request_timeout(),
            config.default_mode,
        );
        let exporter = Exporter::new(config.export_dir.clone());

        App {
            session,
            exporter,
            health: HealthProbe::new(service),
            server_status: ServerStatus::Unknown,
            modals: ModalStack::new(),
            should_quit: false,
            status_message: None,
            alert_timeout: TimeDelta::seconds(ALERT_TIMEOUT_SECS),
            tick: 0,
            intake_panel: IntakePanel,
            result_view: ResultView::new(),
            quit_dialog: QuitDialog,
            help_dialog: HelpDialog::default(),
            alert_dialog: AlertDialog,
            file_prompt: FilePromptDialog,
            config,
        }
    }

    pub fn mode(&self) -> ProcessingMode {
        self.session.mode()
    }

    fn set_status(&mut self, message: StatusMessage) {
        self.status_message = Some(message);
    }

    /// Common tail of every selection attempt
    fn finish_selection(&mut self, outcome: std::result::Result<UploadedFile, IntakeError>) {
        match outcome {
            Ok(file) => {
                if matches!(self.modals.top(), Some(Modal::FilePrompt { .. })) {
                    self.modals.pop();
                }
                self.set_status(StatusMessage::info(format!(
                    "Selected {} ({})",
                    file.name,
                    file.formatted_size()
                )));
            }
            Err(err) => {
                tracing::info!(error = %err, "selection rejected");
                self.modals.alert(err.alert_kind(), err.to_string());
            }
        }
        self.result_view.sync(self.session.state());
    }

    /// Poll workers; surface a finished extraction
    fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        if self.modals.expire_alert(Local::now(), self.alert_timeout) {
            tracing::debug!("alert expired");
        }

        if self.session.poll() {
            let state = self.session.state();
            if let Some(result) = state.result() {
                let message = format!(
                    "Extracted {} rows × {} columns",
                    result.row_count(),
                    result.column_count()
                );
                self.set_status(StatusMessage::info(message));
            } else if let Some(err) = state.error() {
                let (kind, message) = (err.alert_kind(), err.to_string());
                self.set_status(StatusMessage::error(message.clone()));
                self.modals.alert(kind, message);
            }
        }
        self.result_view.sync(self.session.state());
        self.session.poll_preview();

        if let Some(status) = self.health.poll() {
            self.server_status = status;
        }
    }

    fn extract(&mut self) {
        match self.session.submit() {
            Ok(SubmitOutcome::Started(request)) => {
                let name = self
                    .session
                    .current_file()
                    .map(|f| f.name.clone())
                    .unwrap_or_default();
                self.set_status(StatusMessage::info(format!(
                    "Extracting {} in {} mode ({})",
                    name,
                    self.session.mode(),
                    request
                )));
            }
            Ok(SubmitOutcome::AlreadyInFlight) => {}
            Err(err) => self.modals.alert(err.alert_kind(), err.to_string()),
        }
        self.result_view.sync(self.session.state());
    }

    fn export(&mut self, csv: bool) {
        let result = self.session.result();
        let outcome = if csv {
            self.exporter.export_csv(result)
        } else {
            self.exporter.export_json(result)
        };

        match outcome {
            Ok(Some(path)) => {
                self.set_status(StatusMessage::info(format!("Saved {}", path.display())))
            }
            Ok(None) => self.set_status(StatusMessage::info("Nothing to export yet")),
            Err(err) => {
                tracing::warn!(error = %err, "export failed");
                self.modals.alert(err.alert_kind(), err.to_string());
            }
        }
    }

    fn confirm_prompt(&mut self) -> Option<Action> {
        let Some(Modal::FilePrompt { input, error }) = self.modals.top_mut() else {
            return None;
        };
        let typed = input.trim();
        if typed.is_empty() {
            *error = Some("Enter the path of an image file".to_string());
            return None;
        }
        Some(Action::SelectPath(expand_home(typed)))
    }

    fn handle_main_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::ForceQuit));
        }

        let action = match key.code {
            KeyCode::Char('q') => Some(Action::OpenQuitDialog),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('o') => Some(Action::OpenFilePrompt),
            KeyCode::Char('m') => Some(Action::CycleMode),
            KeyCode::Char(c @ '1'..='3') => ProcessingMode::from_shortcut(c).map(Action::SetMode),
            KeyCode::Enter | KeyCode::Char('x') => Some(Action::Extract),
            KeyCode::Char('s') => Some(Action::CheckServer),
            KeyCode::Char('e') => Some(Action::ExportJson),
            KeyCode::Char('c') => Some(Action::ExportCsv),
            _ => return self.result_view.handle_key_event(key),
        };
        Ok(action)
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Alert { .. } => self.alert_dialog.handle_key_event(key),
            Modal::FilePrompt { .. } => self.file_prompt.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area)?,
            Modal::Help => self.help_dialog.draw(frame, area)?,
            Modal::Alert { kind, message, .. } => {
                self.alert_dialog.draw_alert(frame, area, *kind, message)?
            }
            Modal::FilePrompt { input, error } => {
                self.file_prompt
                    .draw_prompt(frame, area, input, error.as_deref())?
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.modals.top().cloned() {
            Some(modal) => self.handle_modal_key_event(&modal, key),
            None => self.handle_main_key_event(key),
        }
    }

    fn handle_paste_event(&mut self, text: String) -> Result<Option<Action>> {
        match self.modals.top() {
            Some(Modal::FilePrompt { .. }) => self.file_prompt.handle_paste_event(text),
            Some(Modal::QuitConfirm) => Ok(None),
            _ => Ok(Some(Action::SelectDropped(text))),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.on_tick(),
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Result view
            // ─────────────────────────────────────────────────────────────────
            Action::ScrollUp
            | Action::ScrollDown
            | Action::PageUp
            | Action::PageDown
            | Action::ToggleView => {
                self.result_view.update(action)?;
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => self.modals.push(Modal::QuitConfirm),
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::OpenFilePrompt => self.modals.push(Modal::FilePrompt {
                input: String::new(),
                error: None,
            }),
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => return Ok(self.confirm_prompt()),
            Action::PromptInput(c) => {
                if let Some(Modal::FilePrompt { input, error }) = self.modals.top_mut() {
                    input.push(c);
                    *error = None;
                }
            }
            Action::PromptBackspace => {
                if let Some(Modal::FilePrompt { input, error }) = self.modals.top_mut() {
                    input.pop();
                    *error = None;
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Intake
            // ─────────────────────────────────────────────────────────────────
            Action::SelectPath(path) => {
                let outcome = self.session.select_path(&path).cloned();
                self.finish_selection(outcome);
            }
            Action::SelectDropped(text) => {
                let outcome = self.session.select_dropped(&text).cloned();
                self.finish_selection(outcome);
            }

            // ─────────────────────────────────────────────────────────────────
            // Extraction
            // ─────────────────────────────────────────────────────────────────
            Action::SetMode(mode) => self.session.set_mode(mode),
            Action::CycleMode => {
                let next = self.session.mode().next();
                self.session.set_mode(next);
            }
            Action::Extract => self.extract(),
            Action::CheckServer => {
                if !self.health.is_running() {
                    self.server_status = self.health.start();
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Export
            // ─────────────────────────────────────────────────────────────────
            Action::ExportJson => self.export(false),
            Action::ExportCsv => self.export(true),
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let layout = calculate_main_layout(area);

        let ctx = StatusContext {
            server_url: &self.config.server_url,
            server_status: &self.server_status,
            message: self.status_message.as_ref(),
            has_result: self.session.result().is_some(),
            view_mode: self.result_view.view_mode,
        };
        render_title_bar(frame, layout.title, &ctx);
        render_status_bar(frame, layout.status, &ctx);
        render_help_bar(frame, layout.help, &ctx);

        self.intake_panel
            .draw_panel(frame, layout.intake, &self.session, self.tick)?;
        self.result_view.draw(frame, layout.result)?;

        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}
