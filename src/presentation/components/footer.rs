use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use super::super::view::UiContext;

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let actions = ctx.help.unwrap_or(" ");
    let actions_widget = Paragraph::new(format!("Actions: {actions}"))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions_widget, rows[0]);

    let status_widget = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status_text(ctx)),
        Span::raw(" "),
        badge(ctx.error_count),
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(status_widget, rows[1]);
}

fn status_text(ctx: &UiContext<'_>) -> String {
    let mut status = ctx.status_message.to_string();
    if ctx.dirty {
        status.push_str(" • unsaved changes");
    }
    if let Some(row) = ctx.rows.get(ctx.focus) {
        status.push_str(" • focus: ");
        status.push_str(&row.accessor.to_string());
    }
    if let Some(extra) = ctx.global_errors.first() {
        status.push_str(" • ");
        status.push_str(extra);
        if ctx.global_errors.len() > 1 {
            status.push_str(&format!(" (+{} more)", ctx.global_errors.len() - 1));
        }
    }
    if status.trim().is_empty() {
        status = "Ready".to_string();
    }
    status
}

fn badge(error_count: usize) -> Span<'static> {
    if error_count > 0 {
        Span::styled(
            format!("[! {error_count}]"),
            Style::default().fg(Color::Red).bg(Color::Black),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context<'a>(global_errors: &'a [String]) -> UiContext<'a> {
        UiContext {
            title: "",
            query: "",
            rows: &[],
            focus: 0,
            mirror: None,
            status_message: "3 issue(s) remaining",
            dirty: false,
            error_count: 3,
            help: None,
            global_errors,
            popup: None,
        }
    }

    #[test]
    fn status_summarizes_extra_errors() {
        let errors = vec!["/a: bad".to_string(), "/b: bad".to_string()];
        assert_eq!(
            status_text(&context(&errors)),
            "3 issue(s) remaining • /a: bad (+1 more)"
        );
    }

    #[test]
    fn badge_turns_red_with_errors() {
        assert_eq!(badge(2).content, "[! 2]");
        assert_eq!(badge(2).style.fg, Some(Color::Red));
        assert_eq!(badge(0).content, "[ok]");
    }
}
