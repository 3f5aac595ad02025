use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

/// Read-only JSON of the document.
pub fn render_mirror(frame: &mut Frame<'_>, area: Rect, json: &str) {
    let mirror = Paragraph::new(json.to_string())
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("JSON").borders(Borders::ALL));
    frame.render_widget(mirror, area);
}
