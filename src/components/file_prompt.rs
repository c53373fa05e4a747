//! Path prompt for choosing a source image
//!
//! The explicit "choose file" counterpart of drag-and-drop. Both end in the
//! same intake call.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

#[derive(Default)]
pub struct FilePromptDialog;

impl Component for FilePromptDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Backspace => Some(Action::PromptBackspace),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::CloseModal)
            }
            KeyCode::Char(c) => Some(Action::PromptInput(c)),
            _ => None,
        };
        Ok(action)
    }

    /// A file dropped while the prompt is open is selected directly
    fn handle_paste_event(&mut self, text: String) -> Result<Option<Action>> {
        Ok(Some(Action::SelectDropped(text)))
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the prompt contents, see draw_prompt
        Ok(())
    }
}

impl FilePromptDialog {
    pub fn draw_prompt(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        input: &str,
        error: Option<&str>,
    ) -> Result<()> {
        let width = 70u16.min(area.width.saturating_sub(4)).max(24);
        let popup_area = centered_popup(area, width, 9);
        frame.render_widget(Clear, popup_area);

        // Keep the end of a long path visible
        let field_width = width.saturating_sub(6) as usize;
        let shown = tail(input, field_width);

        let mut content = vec![
            Line::from(Span::styled(
                "Path to an image (png, jpg, gif, bmp, webp, tiff)",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(shown.to_string(), Style::default().fg(Color::White)),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
        ];

        match error {
            Some(err) => content.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            ))),
            None => content.push(Line::from("")),
        }

        content.push(Line::from(vec![
            Span::styled(
                " Enter ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("Select  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Cancel"),
        ]));

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Open Image ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        );

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

/// Longest suffix of `text` that fits in `width` cells
fn tail(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut start = 0;
    for (i, _) in text.char_indices() {
        if text[i..].width() < width {
            start = i;
            break;
        }
    }
    &text[start..]
}
