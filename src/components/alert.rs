//! Dismissible alert dialog

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::modal::AlertKind;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct AlertDialog;

fn kind_color(kind: AlertKind) -> Color {
    match kind {
        AlertKind::Validation | AlertKind::EmptyInput => Color::Yellow,
        AlertKind::Server | AlertKind::Transport | AlertKind::Export => Color::Red,
    }
}

impl Component for AlertDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('q') => {
                Some(Action::CloseModal)
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the alert contents, see draw_alert
        Ok(())
    }
}

impl AlertDialog {
    pub fn draw_alert(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        kind: AlertKind,
        message: &str,
    ) -> Result<()> {
        let width = 56u16.min(area.width.saturating_sub(4)).max(20);
        // Rough wrapped height: message lines plus padding and the hint line
        let inner = width.saturating_sub(4).max(1) as usize;
        let message_lines = message
            .lines()
            .map(|l| l.chars().count().div_ceil(inner).max(1))
            .sum::<usize>()
            .max(1) as u16;
        let popup_area = centered_popup(area, width, message_lines + 6);

        frame.render_widget(Clear, popup_area);

        let color = kind_color(kind);
        let mut content = vec![Line::from("")];
        content.extend(message.lines().map(|l| {
            Line::from(Span::styled(
                l.to_string(),
                Style::default().fg(Color::White),
            ))
        }));
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                " Esc/Enter ",
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Dismiss"),
        ]));

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", kind.title()))
                    .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
            )
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}
