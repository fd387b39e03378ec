//! Status line and the shared text-input prompt.

use crate::app::App;
use crate::modes::Mode;
use crate::state::InputKind;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;

    let mut lines = vec![Line::styled(
        status_line(app),
        Style::default().fg(Color::Green),
    )];

    if state.input_mode().is_some() {
        let prompt = prompt_text(app);
        let input = format!("{}{}", prompt, state.input_buffer());
        lines.push(Line::raw(input));
        // Cursor sits after the prompt, at the edit position.
        let x = area.x + (prompt.chars().count() + state.input_cursor()) as u16;
        f.set_cursor_position((x, area.y + 1));
    }

    f.render_widget(Paragraph::new(lines), area);
}

fn prompt_text(app: &App) -> String {
    match app.state.input_mode() {
        Some(InputKind::Search) => "Search: ".to_string(),
        Some(InputKind::Filter) => match app.state.input_column() {
            Some(column) => format!("Filter {}: ", column),
            None => "Filter: ".to_string(),
        },
        Some(InputKind::Goto) => "Go to line: ".to_string(),
        None => String::new(),
    }
}

fn status_line(app: &App) -> String {
    let state = &app.state;
    let mut parts = Vec::new();

    if state.current_mode() == Mode::Details {
        parts.push("DETAILS".to_string());
    }
    if state.follow_mode() {
        parts.push("FOLLOW".to_string());
    }
    if state.filtered().is_empty() {
        parts.push("No entries".to_string());
    } else {
        parts.push(format!(
            "Row {}/{}",
            state.current_row() + 1,
            state.filtered().len()
        ));
    }
    if !state.sort_column().is_empty() {
        let direction = if state.sort_reverse() { "DESC" } else { "ASC" };
        parts.push(format!("Sort: {} {}", state.sort_column(), direction));
    }
    if state.filters_count() > 0 {
        parts.push(format!("Filters: {}", state.filters_count()));
    }
    parts.push("Press 'h' for help".to_string());

    parts.join(" | ")
}
