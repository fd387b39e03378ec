//! Details pane: every field of the selected entry, one per row, with
//! the selected field's value wrapped across lines.

use crate::app::App;
use crate::modes::DetailsMode;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

const MAX_KEY_WIDTH: usize = 20;

pub(super) fn render_details(f: &mut Frame, area: Rect, app: &mut App) {
    let state = &app.state;
    let Some(entry) = state.filtered_entry(state.current_row()) else {
        return;
    };
    let line_number = entry.line_number();
    let fields = DetailsMode::fields(entry);

    let height = area.height as usize;
    let width = area.width as usize;
    // Title + separator above, instruction line below.
    let available = height.saturating_sub(3).max(1);
    app.details.clamp_view(fields.len(), available);

    let current = app.details.current_field();
    let scroll = app.details.scroll_offset();

    let mut lines = Vec::with_capacity(height);
    let title = format!("Details - Line {}", line_number);
    lines.push(Line::styled(title.clone(), Style::default().fg(Color::Cyan)));
    lines.push(Line::styled(
        "─".repeat(title.len().min(width)),
        Style::default().fg(Color::Cyan),
    ));

    let key_width = fields
        .iter()
        .map(|(key, _)| key.width())
        .max()
        .unwrap_or(0)
        .min(MAX_KEY_WIDTH);
    let value_width = width.saturating_sub(key_width + 4).max(1);

    let mut rows_used = 0;
    for (index, (key, value)) in fields.iter().enumerate().skip(scroll) {
        if rows_used >= available {
            break;
        }
        let selected = index == current;
        let prefix = if selected { "► " } else { "  " };
        let key_text = super::fit_cell(&format!("{}{}:", prefix, key), key_width + 3);
        let key_style = if selected {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let value_style = if selected {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default()
        };

        if selected {
            let wrapped = wrap_value(value, value_width, available - rows_used);
            let mut first = true;
            for chunk in wrapped {
                let lead = if first {
                    Span::styled(key_text.clone(), key_style)
                } else {
                    Span::raw(" ".repeat(key_width + 3))
                };
                lines.push(Line::from(vec![lead, Span::styled(chunk, value_style)]));
                first = false;
                rows_used += 1;
            }
        } else {
            let value = value.replace('\n', "\\n").replace('\r', "\\r");
            lines.push(Line::from(vec![
                Span::styled(key_text, key_style),
                Span::styled(super::fit_cell(&value, value_width), value_style),
            ]));
            rows_used += 1;
        }
    }

    let counter = if fields.is_empty() {
        "No fields".to_string()
    } else {
        format!("Field {}/{}", current + 1, fields.len())
    };
    let instructions = format!(
        "Press 'd' to return, ↑/↓ fields, ←/→ entries | {}",
        counter
    );
    while lines.len() < height.saturating_sub(1) {
        lines.push(Line::raw(""));
    }
    lines.push(Line::styled(instructions, Style::default().fg(Color::Green)));

    f.render_widget(Paragraph::new(lines), area);
}

/// Word-wrap a value into at most `max_lines` lines of `width` cells;
/// an over-long tail is replaced by `[...]`.
fn wrap_value(value: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in value.split('\n') {
        if raw_line.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut used = 0;
        for word in raw_line.split(' ') {
            let word_width = word.width();
            if used > 0 && used + 1 + word_width > width {
                lines.push(std::mem::take(&mut current));
                used = 0;
            }
            if word_width > width {
                // Hard-break words wider than the pane.
                for ch in word.chars() {
                    let w = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
                    if used + w > width {
                        lines.push(std::mem::take(&mut current));
                        used = 0;
                    }
                    current.push(ch);
                    used += w;
                }
            } else {
                if used > 0 {
                    current.push(' ');
                    used += 1;
                }
                current.push_str(word);
                used += word_width;
            }
        }
        lines.push(current);
    }

    let max_lines = max_lines.max(1);
    if lines.len() > max_lines {
        lines.truncate(max_lines.saturating_sub(1));
        lines.push("[...]".to_string());
    }
    lines
}
