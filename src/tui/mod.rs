//! Rendering: one file per surface, dispatched on the current mode.

mod details;
mod footer;
mod help;
mod manage;
mod table;

use crate::app::App;
use crate::modes::Mode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;

pub const HEADER_HEIGHT: u16 = 2;
pub const FOOTER_HEIGHT: u16 = 2;
/// Column name row plus separator row at the top of the table.
pub const TABLE_HEADER_HEIGHT: u16 = 2;

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    match app.state.current_mode() {
        Mode::Browse => table::render_table(f, chunks[1], app),
        Mode::Details => details::render_details(f, chunks[1], app),
        Mode::Help => help::render_help(f, chunks[1]),
        Mode::ColumnManagement => manage::render_manage(f, chunks[1], app),
    }

    footer::render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = format!("tailgrid - {}", app.source_name());
    let lines = vec![
        Line::styled(title, Style::default().fg(Color::Cyan)),
        Line::styled(
            "─".repeat(area.width as usize),
            Style::default().fg(Color::Cyan),
        ),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Truncate to `width` display cells and pad with spaces. Newlines are
/// made visible so one entry stays on one row.
pub(crate) fn fit_cell(text: &str, width: usize) -> String {
    let text = text.replace('\n', "\\n");
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    while used < width {
        out.push(' ');
        used += 1;
    }
    out
}
