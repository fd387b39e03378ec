//! The entries table: column headers plus the visible window of
//! filtered entries.

use super::fit_cell;
use crate::app::App;
use crate::state::AppState;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let width = area.width as usize;

    let mut lines = Vec::with_capacity(area.height as usize);
    lines.push(header_line(state, width));
    lines.push(Line::styled(
        "─".repeat(width),
        Style::default().fg(Color::Cyan),
    ));

    let visible = (area.height as usize).saturating_sub(2);
    let scroll = app.nav.scroll_row();
    let end = (scroll + visible).min(state.filtered().len());

    for row in scroll..end {
        lines.push(entry_line(state, row, width));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn start_column(state: &AppState) -> usize {
    state
        .columns()
        .index_of(state.current_column())
        .unwrap_or(0)
}

fn header_line(state: &AppState, width: usize) -> Line<'static> {
    let mut spans = Vec::new();
    let mut used = 0;

    for column in state.columns().iter().skip(start_column(state)) {
        if used + column.width > width {
            break;
        }
        let mut text = fit_cell(&column.name, column.width);
        let mut style = Style::default().fg(Color::Cyan);
        if column.name == state.sort_column() {
            let arrow = if state.sort_reverse() { " ↓" } else { " ↑" };
            if text.chars().count() >= 2 {
                text.pop();
                text.pop();
                text.push_str(arrow);
            }
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(text, style));
        spans.push(Span::raw(" "));
        used += column.width + 1;
    }

    Line::from(spans)
}

fn entry_line(state: &AppState, row: usize, width: usize) -> Line<'static> {
    let Some(entry) = state.filtered_entry(row) else {
        return Line::from("");
    };

    let style = if row == state.current_row() {
        Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::REVERSED)
    } else {
        entry
            .level()
            .and_then(level_style)
            .unwrap_or_default()
    };

    let mut spans = Vec::new();
    let mut used = 0;
    for column in state.columns().iter().skip(start_column(state)) {
        if used + column.width > width {
            break;
        }
        let text = fit_cell(&entry.value_text(&column.name), column.width);
        spans.push(Span::styled(text, style));
        spans.push(Span::styled(" ".to_string(), style));
        used += column.width + 1;
    }

    Line::from(spans)
}

/// Level-based row coloring.
fn level_style(level: &str) -> Option<Style> {
    let color = match level.to_uppercase().as_str() {
        "ERROR" | "FATAL" => Color::Red,
        "WARN" | "WARNING" => Color::Yellow,
        "INFO" => Color::Green,
        "DEBUG" | "TRACE" => Color::Blue,
        _ => return None,
    };
    Some(Style::default().fg(color))
}
