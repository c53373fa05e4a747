//! Table component for extraction results
//!
//! Renders a result whose columns are only known at runtime: one column per
//! header entry, one line per row, in the order received.

use crate::model::result::cell_text;
use crate::model::ExtractionResult;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use std::sync::LazyLock;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column may grow, in terminal cells
pub const MAX_COLUMN_WIDTH: usize = 40;

/// ANSI escape sequences, stripped from cell text before display
static ANSI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[a-zA-Z]").unwrap());

/// Remaining control characters, replaced with a space
static CONTROL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x00-\x1f\x7f]").unwrap());

/// Make service-supplied text safe to draw in one terminal line
pub fn sanitize_cell(text: &str) -> String {
    let stripped = ANSI_REGEX.replace_all(text, "");
    CONTROL_REGEX.replace_all(&stripped, " ").into_owned()
}

/// Cell values of `result`, `rows × header` in received order
///
/// Missing keys yield "".
pub fn grid(result: &ExtractionResult) -> Vec<Vec<String>> {
    result
        .data
        .iter()
        .map(|row| {
            result
                .header
                .iter()
                .map(|column| cell_text(row, column).into_owned())
                .collect()
        })
        .collect()
}

/// Truncate `text` to `width` cells with an ellipsis, then pad to `width`
fn fit(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Table lines for a result
#[derive(Debug, Default)]
pub struct TableComponent {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableComponent {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_result(&mut self, result: &ExtractionResult) {
        self.headers = result.header.iter().map(|h| sanitize_cell(h)).collect();
        self.rows = grid(result)
            .into_iter()
            .map(|row| row.iter().map(|cell| sanitize_cell(cell)).collect())
            .collect();
    }

    pub fn clear(&mut self) {
        self.headers.clear();
        self.rows.clear();
    }

    pub fn render_lines(&self) -> Vec<Line<'static>> {
        Self::build_table_lines(&self.headers, &self.rows)
    }

    /// Column widths in cells: the widest of header and cells, capped
    pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.width());
            }
        }
        widths
            .into_iter()
            .map(|w| w.clamp(1, MAX_COLUMN_WIDTH))
            .collect()
    }

    pub fn build_table_lines(headers: &[String], rows: &[Vec<String>]) -> Vec<Line<'static>> {
        if headers.is_empty() {
            return vec![Line::from(Span::styled(
                "The service returned no columns",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let widths = Self::column_widths(headers, rows);
        let mut lines = Vec::with_capacity(rows.len() + 4);

        let header_spans: Vec<Span> = headers
            .iter()
            .zip(&widths)
            .enumerate()
            .flat_map(|(i, (header, &width))| {
                let mut spans = vec![Span::styled(
                    fit(header, width),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )];
                if i + 1 < widths.len() {
                    spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                }
                spans
            })
            .collect();
        lines.push(Line::from(header_spans));

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )));

        if rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "No rows extracted",
                Style::default().fg(Color::DarkGray),
            )));
            return lines;
        }

        for (index, row) in rows.iter().enumerate() {
            let style = if index % 2 == 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            let row_spans: Vec<Span> = widths
                .iter()
                .enumerate()
                .flat_map(|(i, &width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    let mut spans = vec![Span::styled(fit(cell, width), style)];
                    if i + 1 < widths.len() {
                        spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
                    }
                    spans
                })
                .collect();
            lines.push(Line::from(row_spans));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{} rows × {} columns", rows.len(), headers.len()),
            Style::default().fg(Color::Yellow),
        )));

        lines
    }
}
