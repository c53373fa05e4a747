//! Title, status and help bars

use crate::model::{ServerStatus, StatusMessage, ViewMode};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the bars need from the App
pub struct StatusContext<'a> {
    pub server_url: &'a str,
    pub server_status: &'a ServerStatus,
    pub message: Option<&'a StatusMessage>,
    pub has_result: bool,
    pub view_mode: ViewMode,
}

fn key(label: &str, color: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

pub fn render_title_bar(frame: &mut Frame, area: Rect, ctx: &StatusContext) {
    let (status_color, detail) = match ctx.server_status {
        ServerStatus::Online(banner) => (Color::Green, banner.as_str()),
        ServerStatus::Offline(reason) => (Color::Red, reason.as_str()),
        ServerStatus::Checking => (Color::Yellow, ""),
        ServerStatus::Unknown => (Color::DarkGray, ""),
    };

    let mut spans = vec![
        Span::styled(
            " 🥐 Bakery OCR ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(ctx.server_url.to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("● {}", ctx.server_status.label()),
            Style::default().fg(status_color),
        ),
    ];
    if !detail.is_empty() {
        spans.push(Span::styled(
            format!(" ({})", detail),
            Style::default().fg(Color::DarkGray),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &StatusContext) {
    let line = match ctx.message {
        Some(message) => {
            let color = if message.is_error {
                Color::Red
            } else {
                Color::Yellow
            };
            Line::from(Span::styled(
                format!(" {}", message.display()),
                Style::default().fg(color),
            ))
        }
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn help_spans(ctx: &StatusContext) -> Vec<Span<'static>> {
    let mut spans = vec![
        key("q", Color::Yellow),
        Span::raw("Quit "),
        key("o", Color::Cyan),
        Span::raw("Open "),
        key("1-3", Color::Cyan),
        Span::raw("Mode "),
        key("Enter", Color::Green),
        Span::raw("Extract "),
    ];

    if ctx.has_result {
        let other = ctx.view_mode.toggle().name();
        spans.extend([
            key("v", Color::Magenta),
            Span::raw(format!("{} ", other)),
            key("e", Color::Cyan),
            Span::raw("JSON "),
            key("c", Color::Cyan),
            Span::raw("CSV "),
        ]);
    }

    spans.extend([key("s", Color::Cyan), Span::raw("Server "), key("?", Color::White), Span::raw("Help")]);
    spans
}

pub fn render_help_bar(frame: &mut Frame, area: Rect, ctx: &StatusContext) {
    let paragraph = Paragraph::new(Line::from(help_spans(ctx)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
