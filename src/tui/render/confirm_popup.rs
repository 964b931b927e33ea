use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::helpers::centered_rect_fixed;

/// Render the delete confirmation popup
pub fn render_confirm_popup(frame: &mut Frame, app: &App, area: Rect) {
    let title = app
        .confirm_delete
        .as_deref()
        .and_then(|id| app.session.store().get(id))
        .map(|t| t.title.as_str())
        .unwrap_or("");

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let inner_w = popup_w.saturating_sub(4) as usize;
    let bg = app.theme.background;
    let highlight = app.theme.highlight;

    let lines = vec![
        Line::from(Span::styled(
            " Delete task?",
            Style::default()
                .fg(highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                " \u{201c}{}\u{201d}",
                truncate_to_width(title, inner_w.saturating_sub(2))
            ),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" y", Style::default().fg(highlight).bg(bg)),
            Span::styled(" delete   ", Style::default().fg(app.theme.text).bg(bg)),
            Span::styled("n/Esc", Style::default().fg(highlight).bg(bg)),
            Span::styled(" cancel", Style::default().fg(app.theme.text).bg(bg)),
        ]),
    ];

    let popup_h = (lines.len() as u16 + 2).min(area.height);
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(highlight).bg(bg))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, overlay_area);
}
