use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::form::{FormField, TaskForm, TextInput};
use crate::util::unicode::{byte_offset_to_display_col, next_grapheme_boundary, truncate_to_width};

use super::helpers::centered_rect_fixed;

/// Label column: " Priority  "
const LABEL_WIDTH: usize = 11;
const DUE_PLACEHOLDER: &str = "YYYY-MM-DD HH:MM";

/// Render the add / edit form
pub fn render_form_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };

    let popup_w: u16 = 64.min(area.width.saturating_sub(2));
    let value_w = (popup_w as usize).saturating_sub(2 + LABEL_WIDTH + 1);
    let bg = app.theme.background;
    let label_style = Style::default().fg(app.theme.dim).bg(bg);
    let focus_label_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let value_style = Style::default().fg(app.theme.text_bright).bg(bg);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<(usize, usize)> = None;

    for field in FormField::ALL {
        let focused = form.focus == field;
        let mut spans = vec![Span::styled(
            format!(" {:<width$}", field.label(), width = LABEL_WIDTH - 1),
            if focused { focus_label_style } else { label_style },
        )];
        match field {
            FormField::Priority => {
                let text = if focused {
                    format!("\u{2039} {} \u{203A}", form.priority)
                } else {
                    format!("  {}", form.priority)
                };
                spans.push(Span::styled(
                    text,
                    Style::default()
                        .fg(app.theme.priority_color(form.priority))
                        .bg(bg),
                ));
            }
            _ => {
                let input = field_input(form, field);
                if field == FormField::Due && input.text.is_empty() && !focused {
                    spans.push(Span::styled(DUE_PLACEHOLDER, label_style));
                } else {
                    let (shown, col) = field_window(input, value_w);
                    if focused {
                        cursor = Some((lines.len(), LABEL_WIDTH + col));
                    }
                    spans.push(Span::styled(shown, value_style));
                }
            }
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    match &form.error {
        Some(error) => lines.push(Line::from(Span::styled(
            format!(" {}", error),
            Style::default().fg(app.theme.red).bg(bg),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(Span::styled(
        " Tab next \u{00B7} Enter save \u{00B7} Esc cancel",
        label_style,
    )));

    let popup_h = (lines.len() as u16 + 2).min(area.height);
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", form.heading()),
            focus_label_style,
        ))
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);

    if let Some((row, col)) = cursor {
        let x = overlay_area.x + 1 + col as u16;
        let y = overlay_area.y + 1 + row as u16;
        if x < overlay_area.right() && y < overlay_area.bottom() {
            frame.set_cursor_position(Position::new(x, y));
        }
    }
}

fn field_input(form: &TaskForm, field: FormField) -> &TextInput {
    match field {
        FormField::Due => &form.due,
        FormField::Notes => &form.notes,
        _ => &form.title,
    }
}

/// Visible part of a field and the cursor column within it. Text scrolls
/// left so the cursor stays inside `width` cells.
fn field_window(input: &TextInput, width: usize) -> (String, usize) {
    let col = input.cursor_col();
    if col < width {
        return (truncate_to_width(&input.text, width), col);
    }
    let mut start = 0;
    while byte_offset_to_display_col(&input.text[start..], input.cursor - start) >= width {
        match next_grapheme_boundary(&input.text, start) {
            Some(next) if next <= input.cursor => start = next,
            _ => break,
        }
    }
    let rest = &input.text[start..];
    (
        truncate_to_width(rest, width),
        byte_offset_to_display_col(rest, input.cursor - start),
    )
}
