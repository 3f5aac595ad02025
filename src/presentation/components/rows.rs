use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

use crate::editor::{EditorRow, RowWidget, widgets::color};

const INDENT: &str = "  ";

pub fn render_rows(frame: &mut Frame<'_>, area: Rect, rows: &[EditorRow], focus: usize) {
    if rows.is_empty() {
        let placeholder =
            Paragraph::new("Nothing to edit").block(Block::default().borders(Borders::ALL));
        frame.render_widget(placeholder, area);
        return;
    }

    let content_width = area.width.saturating_sub(4).max(8) as usize;
    let items: Vec<ListItem<'static>> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| ListItem::new(row_lines(row, index == focus, content_width)))
        .collect();
    let mut state = ListState::default();
    state.select(Some(focus.min(rows.len() - 1)));

    let list = List::new(items)
        .block(Block::default().title("Document").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("» ");
    frame.render_stateful_widget(list, area, &mut state);
}

/// The lines of one row: the row itself, then its error wrapped to `width`.
pub(crate) fn row_lines(row: &EditorRow, selected: bool, width: usize) -> Vec<Line<'static>> {
    let indent = INDENT.repeat(row.depth);
    let mut spans = vec![Span::raw(indent.clone())];
    if let Some(label) = &row.label {
        spans.push(Span::styled(label.clone(), label_style(selected)));
    }
    spans.extend(value_spans(row, selected));
    let mut lines = vec![Line::from(spans)];

    if let Some(error) = &row.error {
        let error_indent = format!("{indent}{INDENT}");
        let available = width.saturating_sub(UnicodeWidthStr::width(error_indent.as_str())).max(4);
        for segment in wrap(error, available) {
            lines.push(Line::from(vec![
                Span::raw(error_indent.clone()),
                Span::styled(segment.into_owned(), Style::default().fg(Color::Red)),
            ]));
        }
    }
    lines
}

fn label_style(selected: bool) -> Style {
    let color = if selected { Color::Yellow } else { Color::Cyan };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn value_spans(row: &EditorRow, selected: bool) -> Vec<Span<'static>> {
    let separator = if row.label.is_some() { ": " } else { "" };
    let muted = Style::default().fg(Color::DarkGray);
    match &row.widget {
        RowWidget::Heading => vec![Span::styled(format!(" ({})", row.display), muted)],
        RowWidget::Element { .. } => Vec::new(),
        RowWidget::Choice { .. } => vec![
            Span::raw(separator.to_string()),
            Span::styled(
                format!("◂ {} ▸", row.display),
                Style::default().fg(Color::Magenta),
            ),
        ],
        RowWidget::Append(_) => vec![Span::styled(
            format!("+ {}", row.display),
            Style::default().fg(Color::Green),
        )],
        RowWidget::Unset => vec![
            Span::raw(separator.to_string()),
            Span::styled(row.display.clone(), muted.add_modifier(Modifier::ITALIC)),
        ],
        RowWidget::Missing => vec![
            Span::raw(separator.to_string()),
            Span::styled(row.display.clone(), Style::default().fg(Color::Red)),
        ],
        RowWidget::Color => {
            let mut spans = text_spans(separator, &row.display, selected);
            if let Some((r, g, b)) = color::parse_hex(&row.display) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled("■■", Style::default().fg(Color::Rgb(r, g, b))));
            }
            if let Some(name) = color::name_of(&row.display) {
                spans.push(Span::styled(format!(" {name}"), muted));
            }
            spans
        }
        RowWidget::Text(_) | RowWidget::Temporal(_) | RowWidget::Guid => {
            text_spans(separator, &row.display, selected)
        }
    }
}

fn text_spans(separator: &str, text: &str, selected: bool) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(separator.to_string()), Span::raw(text.to_string())];
    if selected {
        spans.push(Span::styled(
            "▏",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    spans
}
