use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::editor::EditorRow;

use super::components::{render_footer, render_header, render_mirror, render_popup, render_rows};

/// Everything a frame shows. Built fresh for every draw.
pub struct UiContext<'a> {
    pub title: &'a str,
    /// Session parameters as a query string, possibly empty.
    pub query: &'a str,
    pub rows: &'a [EditorRow],
    pub focus: usize,
    /// Indented JSON of the document; `None` hides the panel.
    pub mirror: Option<&'a str>,
    pub status_message: &'a str,
    pub dirty: bool,
    pub error_count: usize,
    pub help: Option<&'a str>,
    pub global_errors: &'a [String],
    pub popup: Option<PopupRender<'a>>,
}

pub struct PopupRender<'a> {
    pub title: &'a str,
    pub options: &'a [String],
    pub selected: usize,
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(4),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], ctx.title, ctx.query);
    match ctx.mirror {
        Some(mirror) => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            render_rows(frame, body[0], ctx.rows, ctx.focus);
            render_mirror(frame, body[1], mirror);
        }
        None => render_rows(frame, chunks[1], ctx.rows, ctx.focus),
    }
    render_footer(frame, chunks[2], &ctx);

    if let Some(popup) = ctx.popup {
        render_popup(frame, popup);
    }
}
