//! Result panel
//!
//! Shows the extraction state and, on success, the result either as a grid
//! or as the raw JSON the exporter writes. Both views are derived from the
//! same shared result; switching only changes which one is drawn.

use crate::action::Action;
use crate::component::Component;
use crate::components::table::TableComponent;
use crate::model::{ExtractionResult, ExtractionState, ViewMode};
use crate::services::export::to_json_string;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};
use std::sync::Arc;

const PAGE: usize = 10;

#[derive(Default)]
pub struct ResultView {
    pub view_mode: ViewMode,
    scroll: usize,
    state: ExtractionState,
    table: TableComponent,
    raw_lines: Vec<Line<'static>>,
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn result(&self) -> Option<&Arc<ExtractionResult>> {
        self.state.result()
    }

    #[cfg(test)]
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Follow the session's extraction state
    ///
    /// Rendered lines are rebuilt only when a different result arrives.
    pub fn sync(&mut self, state: &ExtractionState) {
        let same_result = match (self.state.result(), state.result()) {
            (Some(old), Some(new)) => Arc::ptr_eq(old, new),
            _ => false,
        };
        if same_result {
            return;
        }

        self.scroll = 0;
        match state.result() {
            Some(result) => {
                self.table.set_result(result);
                self.raw_lines = raw_lines(result);
            }
            None => {
                self.table.clear();
                self.raw_lines.clear();
            }
        }
        self.state = state.clone();
    }

    fn content_lines(&self) -> Vec<Line<'static>> {
        match &self.state {
            ExtractionState::Success(_) => match self.view_mode {
                ViewMode::Table => self.table.render_lines(),
                ViewMode::Raw => self.raw_lines.clone(),
            },
            ExtractionState::Loading { .. } => placeholder("Extracting data from the image...", Color::Yellow),
            ExtractionState::Error(err) => placeholder(&format!("Extraction failed: {}", err), Color::Red),
            ExtractionState::Idle => placeholder(
                "Select an image and press Enter to extract its data",
                Color::DarkGray,
            ),
        }
    }

    fn title(&self) -> String {
        match &self.state {
            ExtractionState::Success(result) => format!(
                " Extracted Data [{}] {} × {} ",
                self.view_mode.name(),
                result.row_count(),
                result.column_count()
            ),
            other => format!(" Extracted Data [{}] ", other.label()),
        }
    }
}

fn placeholder(message: &str, color: Color) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ]
}

fn raw_lines(result: &ExtractionResult) -> Vec<Line<'static>> {
    match to_json_string(result) {
        Ok(json) => json
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green))))
            .collect(),
        Err(e) => placeholder(&format!("Could not serialize result: {}", e), Color::Red),
    }
}

impl Component for ResultView {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Char('v') => Some(Action::ToggleView),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let max_scroll = self.content_lines().len().saturating_sub(1);
        match action {
            Action::ScrollDown => self.scroll = (self.scroll + 1).min(max_scroll),
            Action::ScrollUp => self.scroll = self.scroll.saturating_sub(1),
            Action::PageDown => self.scroll = (self.scroll + PAGE).min(max_scroll),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(PAGE),
            Action::ToggleView => {
                self.view_mode = self.view_mode.toggle();
                self.scroll = 0;
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let content = self.content_lines();
        let total = content.len();
        let visible_height = area.height.saturating_sub(2) as usize;
        let scroll = self.scroll.min(total.saturating_sub(visible_height));

        let border_color = match self.state {
            ExtractionState::Success(_) => Color::Green,
            ExtractionState::Error(_) => Color::Red,
            ExtractionState::Loading { .. } => Color::Yellow,
            ExtractionState::Idle => Color::DarkGray,
        };

        let mut paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(self.title())
                    .title_style(Style::default().fg(border_color).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(border_color)),
            )
            .scroll((scroll as u16, 0));
        if !matches!(self.state, ExtractionState::Success(_)) {
            paragraph = paragraph.wrap(Wrap { trim: true });
        }

        frame.render_widget(paragraph, area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(scroll);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}
