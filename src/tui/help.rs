//! Static key-binding reference screen.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_help(f: &mut Frame, area: Rect) {
    let mut lines = vec![Line::styled(
        "TAILGRID - HELP",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    let body = [
        "",
        "Navigation:",
        "  ↑/↓       - Move up/down",
        "  PgUp/PgDn - Page up/down",
        "  Home/End  - Go to top/bottom",
        "  g         - Go to specific line",
        "",
        "Column Operations:",
        "  ←/→       - Scroll columns left/right",
        "  s         - Sort by current column",
        "  S         - Reverse sort by current column",
        "  </>       - Move column left/right",
        "  w/W       - Decrease/increase column width",
        "  m         - Column management screen",
        "",
        "Filtering & Search:",
        "  /         - Search all fields",
        "  f         - Filter by current column",
        "  c         - Clear all filters",
        "",
        "View Options:",
        "  d         - Toggle details view for current entry",
        "",
        "Details Mode:",
        "  ↑/↓       - Navigate between fields",
        "  ←/→       - Navigate between entries",
        "",
        "File Operations:",
        "  F         - Toggle follow mode",
        "  r         - Refresh/reload",
        "  R         - Reset view (clear filters, sort, rewind)",
        "",
        "Other:",
        "  h/?       - Toggle this help",
        "  q/Esc     - Quit",
        "",
        "Press any key to continue...",
    ];
    lines.extend(body.iter().map(|text| Line::raw(*text)));

    let top_pad = (area.height as usize).saturating_sub(lines.len()) / 2;
    let left_pad = " ".repeat(area.width as usize / 4);
    let mut padded: Vec<Line> = (0..top_pad).map(|_| Line::raw("")).collect();
    for line in lines {
        let mut spans = vec![ratatui::text::Span::raw(left_pad.clone())];
        spans.extend(line.spans);
        padded.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(padded), area);
}
