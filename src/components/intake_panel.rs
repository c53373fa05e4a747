//! Intake panel: the selected image, processing mode and extract trigger

use crate::model::{ExtractionState, PreviewHandle, ProcessingMode, Thumbnail};
use crate::services::ExtractionSession;
use anyhow::Result;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Half-block rendering of a thumbnail: upper pixel as foreground, lower as
/// background
pub fn thumbnail_lines(thumbnail: &Thumbnail) -> Vec<Line<'static>> {
    thumbnail
        .rows
        .iter()
        .map(|row| {
            Line::from(
                row.iter()
                    .map(|&([ur, ug, ub], [lr, lg, lb])| {
                        Span::styled(
                            "▀",
                            Style::default()
                                .fg(Color::Rgb(ur, ug, ub))
                                .bg(Color::Rgb(lr, lg, lb)),
                        )
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

fn metadata_lines(preview: &PreviewHandle) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("File  ", label),
            Span::styled(preview.file_name.clone(), value.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Type  ", label),
            Span::styled(preview.mime.clone(), value),
        ]),
        Line::from(vec![
            Span::styled("Size  ", label),
            Span::styled(preview.size_label.clone(), value),
        ]),
    ];
    if let Some((w, h)) = preview.dimensions {
        lines.push(Line::from(vec![
            Span::styled("Dims  ", label),
            Span::styled(format!("{} × {} px", w, h), value),
        ]));
    }
    lines
}

fn mode_lines(selected: ProcessingMode) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = ProcessingMode::all()
        .into_iter()
        .map(|mode| {
            let active = mode == selected;
            let marker = if active { "●" } else { "○" };
            let style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!(" {} ", mode.shortcut()), Style::default().fg(Color::Yellow)),
                Span::styled(format!("{} {}", marker, mode.label()), style),
            ])
        })
        .collect();
    lines.push(Line::from(Span::styled(
        format!(" {}", selected.description()),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Label and style of the extract trigger for the current session
pub fn extract_button(session: &ExtractionSession, tick: usize) -> (String, Style) {
    match session.state() {
        ExtractionState::Loading { .. } => {
            let secs = session.elapsed().map(|d| d.as_secs()).unwrap_or(0);
            (
                format!("{} Processing... {}s", SPINNER[tick % SPINNER.len()], secs),
                Style::default().fg(Color::Yellow),
            )
        }
        _ if !session.can_submit() => (
            "Extract Data (select an image first)".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        _ => (
            "⏎ Extract Data".to_string(),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    }
}

#[derive(Default)]
pub struct IntakePanel;

impl IntakePanel {
    pub fn draw_panel(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        session: &ExtractionSession,
        tick: usize,
    ) -> Result<()> {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(6),
                Constraint::Length(6),
                Constraint::Length(3),
            ])
            .split(area);

        self.draw_source(frame, chunks[0], session.preview())?;

        let modes = Paragraph::new(mode_lines(session.mode()))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Processing Mode ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(modes, chunks[1]);

        let (label, style) = extract_button(session, tick);
        let button = Paragraph::new(Line::from(Span::styled(label, style)))
            .alignment(ratatui::layout::Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        frame.render_widget(button, chunks[2]);

        Ok(())
    }

    fn draw_source(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        preview: Option<&PreviewHandle>,
    ) -> Result<()> {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Source Image ")
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(preview) = preview else {
            let hint = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Drop an image onto the terminal",
                    Style::default().fg(Color::Gray),
                )),
                Line::from(Span::styled(
                    "or press o to enter a path",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let paragraph = Paragraph::new(hint)
                .alignment(ratatui::layout::Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(paragraph, area);
            return Ok(());
        };

        let mut lines = metadata_lines(preview);
        lines.push(Line::from(""));
        match preview.thumbnail() {
            Some(thumbnail) => lines.extend(thumbnail_lines(thumbnail)),
            None if preview.is_decoding() => lines.push(Line::from(Span::styled(
                "Rendering preview...",
                Style::default().fg(Color::DarkGray),
            ))),
            None => lines.push(Line::from(Span::styled(
                "(preview unavailable for this format)",
                Style::default().fg(Color::DarkGray),
            ))),
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::preview::png_bytes;
    use crate::model::FileCandidate;
    use crate::services::orchestrator::testing::FakeService;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_thumbnail_lines_use_half_blocks() {
        let thumbnail = Thumbnail {
            columns: 2,
            rows: vec![vec![([255, 0, 0], [0, 0, 255]); 2]],
        };
        let lines = thumbnail_lines(&thumbnail);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Rgb(255, 0, 0)));
        assert_eq!(lines[0].spans[0].style.bg, Some(Color::Rgb(0, 0, 255)));
    }

    #[test]
    fn test_extract_button_follows_session() {
        let mut session = ExtractionSession::new(
            Arc::new(FakeService::new(vec![])),
            Duration::from_secs(5),
            ProcessingMode::Auto,
        );
        let (label, _) = extract_button(&session, 0);
        assert!(label.contains("select an image first"));

        session
            .select_file(FileCandidate::new("cake.png", "image/png", png_bytes(2, 2)))
            .unwrap();
        let (label, _) = extract_button(&session, 0);
        assert_eq!(label, "⏎ Extract Data");
    }

    #[test]
    fn test_mode_lines_mark_selection() {
        let lines = mode_lines(ProcessingMode::Table);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text[1].contains("●"));
        assert!(text[0].contains("○"));
        assert_eq!(text[3], " Gridded price lists and menus");
    }
}
