//! Column management screen: available/selected panes plus buttons.

use crate::app::App;
use crate::modes::PaneFocus;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub(super) fn render_manage(f: &mut Frame, area: Rect, app: &App) {
    let manage = &app.manage;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = vec![
        Line::styled(
            center("Column Management", area.width as usize),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Line::styled(
            center(
                "←→: Move pane/column | ↑↓: Navigate/Reorder | Enter: Arm/Move | Tab: Focus | Esc: Cancel",
                area.width as usize,
            ),
            Style::default().fg(Color::Green),
        ),
    ];
    f.render_widget(Paragraph::new(header), chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    render_pane(
        f,
        panes[0],
        "Available Columns",
        &manage.available,
        manage.available_cursor,
        manage.focus == PaneFocus::Available,
        manage.armed.as_deref(),
    );
    render_pane(
        f,
        panes[1],
        "Selected Columns",
        &manage.selected,
        manage.selected_cursor,
        manage.focus == PaneFocus::Selected,
        manage.armed.as_deref(),
    );

    render_buttons(f, chunks[2], app);
}

fn render_pane(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    cursor: usize,
    focused: bool,
    armed: Option<&str>,
) {
    let border_style = if focused {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    };

    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = cursor.saturating_sub(inner_height.saturating_sub(1));

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .skip(scroll)
        .take(inner_height)
        .map(|(index, name)| {
            let style = if Some(name.as_str()) == armed {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED)
            } else if index == cursor && focused {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default()
            };
            Line::styled(name.clone(), style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title.to_string());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_buttons(f: &mut Frame, area: Rect, app: &App) {
    let manage = &app.manage;
    let mut spans = Vec::new();
    let total: usize = manage.button_labels().iter().map(|l| l.len() + 6).sum();
    let pad = (area.width as usize).saturating_sub(total) / 2;
    spans.push(Span::raw(" ".repeat(pad)));

    for (index, label) in manage.button_labels().iter().enumerate() {
        let selected = manage.focus == PaneFocus::Buttons && manage.button_cursor == index;
        let style = if selected {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!("[{:^8}]", label), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
